//! Implementation of the `pgx parse` sub command.

use crate::common::io::write_json_maybe_gz;

/// Command line arguments for `pgx parse` sub command.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "Extract tracked variant calls from a VCF file", long_about = None)]
pub struct Args {
    /// Path to the input VCF file (may be gzip compressed).
    #[arg(long)]
    pub path_input: String,
    /// Path to knowledge base JSON file; the built-in one is used if omitted.
    #[arg(long)]
    pub path_kb: Option<String>,
    /// Path to the output JSON file; `.gz` suffix enables compression.
    #[arg(long)]
    pub path_output: String,
}

/// Main entry point for the `pgx parse` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let kb = crate::kb::load(args.path_kb.as_deref())?;
    let parse_result = super::load_vcf(&args.path_input, &kb)?;
    write_json_maybe_gz(&args.path_output, &parse_result)?;

    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::common::io::read_to_string_maybe_gz;
    use crate::pgx::ingest::ParseResult;

    #[rstest::rstest]
    #[case("tests/data/mixed.vcf", true, 5)]
    #[case("tests/data/no_header.vcf", true, 0)]
    #[case("tests/data/two_headers.vcf", false, 0)]
    #[case("tests/data/latin1.vcf", true, 1)]
    fn smoke_test_run(
        #[case] path: &str,
        #[case] is_success: bool,
        #[case] variant_count: usize,
    ) -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let args = super::Args {
            path_input: path.into(),
            path_kb: None,
            path_output: tmp_dir
                .join("out.json")
                .to_str()
                .expect("invalid path")
                .into(),
        };

        super::run(&Default::default(), &args)?;

        let result: ParseResult = serde_json::from_str(&read_to_string_maybe_gz(&args.path_output)?)?;
        assert_eq!(result.is_success, is_success);
        assert_eq!(result.variants.len(), variant_count);
        assert_eq!(result.error.is_some(), !is_success);

        Ok(())
    }
}
