//! Common, IO-related code.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};

use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

fn is_gz<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz"))
}

/// Transparently open a file with gzip decoder.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if is_gz(&path) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        let file = File::open(path)?;
        let bufreader = BufReader::new(file);
        let decoder = MultiGzDecoder::new(bufreader);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Transparently open a file with gzip encoder.
pub fn open_write_maybe_gz<P>(path: P) -> Result<Box<dyn Write>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if is_gz(&path) {
        tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
        let file = File::create(path)?;
        let bufwriter = BufWriter::new(file);
        let encoder = GzEncoder::new(bufwriter, Compression::default());
        Ok(Box::new(encoder))
    } else {
        tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// Read the whole (maybe gzip compressed) file into a string.
pub fn read_to_string_maybe_gz<P>(path: P) -> Result<String, anyhow::Error>
where
    P: AsRef<Path>,
{
    let mut reader = open_read_maybe_gz(&path)
        .map_err(|e| anyhow::anyhow!("could not open {:?}: {}", path.as_ref(), e))?;
    let mut result = String::new();
    reader
        .read_to_string(&mut result)
        .map_err(|e| anyhow::anyhow!("could not read {:?}: {}", path.as_ref(), e))?;
    Ok(result)
}

/// Read the whole (maybe gzip compressed) file, replacing invalid UTF-8.
pub fn read_to_string_lossy_maybe_gz<P>(path: P) -> Result<String, anyhow::Error>
where
    P: AsRef<Path>,
{
    let mut reader = open_read_maybe_gz(&path)
        .map_err(|e| anyhow::anyhow!("could not open {:?}: {}", path.as_ref(), e))?;
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| anyhow::anyhow!("could not read {:?}: {}", path.as_ref(), e))?;
    match String::from_utf8(buf) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::warn!("{:?} is not valid UTF-8: {}", path.as_ref(), e.utf8_error());
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Write `value` as pretty-printed JSON to the (maybe gzip compressed) file.
pub fn write_json_maybe_gz<P, T>(path: P, value: &T) -> Result<(), anyhow::Error>
where
    P: AsRef<Path>,
    T: serde::Serialize + ?Sized,
{
    let mut writer = open_write_maybe_gz(&path)
        .map_err(|e| anyhow::anyhow!("could not open {:?} for writing: {}", path.as_ref(), e))?;
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| anyhow::anyhow!("could not write JSON to {:?}: {}", path.as_ref(), e))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
