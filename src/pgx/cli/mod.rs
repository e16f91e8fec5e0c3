//! Command line interface for the `pgx *` sub commands.

use thousands::Separable;

use crate::common::io::read_to_string_lossy_maybe_gz;
use crate::kb::KnowledgeBase;
use crate::pgx::ingest::{parse_vcf, ParseResult};

pub mod assess;
pub mod parse;

/// Read the (maybe gzip compressed) VCF file at `path`.
///
/// Failing to open or read the file is an error; invalid UTF-8 is replaced
/// and other problems with its content are reported in the returned
/// `ParseResult`.
pub fn load_vcf(path: &str, kb: &KnowledgeBase) -> Result<ParseResult, anyhow::Error> {
    tracing::info!("Reading variant calls from {}...", path);
    let before_parsing = std::time::Instant::now();
    let text = read_to_string_lossy_maybe_gz(path)?;
    let parse_result = parse_vcf(&text, kb);
    tracing::info!(
        "... done reading {} tracked variant calls from {} rows in {:?}",
        parse_result.variants.len().separate_with_commas(),
        parse_result.metadata.rows_seen.separate_with_commas(),
        before_parsing.elapsed()
    );
    if let Some(error) = &parse_result.error {
        tracing::warn!("VCF parsing failed: {}", error);
    }
    Ok(parse_result)
}
