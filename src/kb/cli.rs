//! Command line interface for the `kb *` sub commands.

use crate::common::io::write_json_maybe_gz;

/// Implementation of `kb check`.
pub mod check {
    /// Command line arguments for `kb check` sub command.
    #[derive(Debug, clap::Parser)]
    #[command(author, version, about = "Validate a knowledge base file", long_about = None)]
    pub struct Args {
        /// Path to knowledge base JSON file (may be gzip compressed).
        #[arg(long)]
        pub path_kb: String,
    }

    /// Main entry point for the `kb check` sub command.
    pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
        tracing::info!("args_common = {:?}", &args_common);
        tracing::info!("args = {:?}", &args);

        let kb = crate::kb::load(Some(args.path_kb.as_str()))?;
        tracing::info!(
            "knowledge base is valid: {} variant definitions, {} drugs",
            kb.variant_definitions().len(),
            kb.supported_drugs().count()
        );

        Ok(())
    }
}

/// Implementation of `kb dump`.
pub mod dump {
    /// Command line arguments for `kb dump` sub command.
    #[derive(Debug, clap::Parser)]
    #[command(author, version, about = "Write the effective knowledge base as JSON", long_about = None)]
    pub struct Args {
        /// Path to knowledge base JSON file; the built-in one is used if omitted.
        #[arg(long)]
        pub path_kb: Option<String>,
        /// Path to the output JSON file; `.gz` suffix enables compression.
        #[arg(long)]
        pub path_output: String,
    }

    /// Main entry point for the `kb dump` sub command.
    pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
        tracing::info!("args_common = {:?}", &args_common);
        tracing::info!("args = {:?}", &args);

        let kb = crate::kb::load(args.path_kb.as_deref())?;
        super::write_json_maybe_gz(&args.path_output, &kb)?;

        Ok(())
    }
}

/// Implementation of `kb drugs`.
pub mod drugs {
    use std::io::Write;

    /// Command line arguments for `kb drugs` sub command.
    #[derive(Debug, clap::Parser)]
    #[command(author, version, about = "List supported drugs and their genes", long_about = None)]
    pub struct Args {
        /// Path to knowledge base JSON file; the built-in one is used if omitted.
        #[arg(long)]
        pub path_kb: Option<String>,
    }

    /// Write one tab-separated `drug<TAB>genes` line per supported drug.
    pub fn write_drugs<W: Write>(
        kb: &crate::kb::KnowledgeBase,
        writer: &mut W,
    ) -> Result<(), anyhow::Error> {
        for drug in kb.supported_drugs() {
            let genes = kb
                .drug_rules(drug)
                .map(|genes| genes.keys().map(String::as_str).collect::<Vec<_>>())
                .unwrap_or_default();
            writeln!(writer, "{}\t{}", drug, genes.join(","))?;
        }
        Ok(())
    }

    /// Main entry point for the `kb drugs` sub command.
    pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
        tracing::info!("args_common = {:?}", &args_common);
        tracing::info!("args = {:?}", &args);

        let kb = crate::kb::load(args.path_kb.as_deref())?;
        let stdout = std::io::stdout();
        let mut writer = stdout.lock();
        write_drugs(&kb, &mut writer)?;
        writer.flush()?;

        Ok(())
    }
}
