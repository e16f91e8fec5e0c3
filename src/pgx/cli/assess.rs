//! Implementation of the `pgx assess` sub command.

use rayon::prelude::*;

use crate::common::{self, io::write_json_maybe_gz};
use crate::pgx::output::{generate_patient_id, AnalysisResult};
use crate::pgx::risk::assess_drug;

/// Command line arguments for `pgx assess` sub command.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "Assess drug risks for a VCF file", long_about = None)]
pub struct Args {
    /// Path to the input VCF file (may be gzip compressed).
    #[arg(long)]
    pub path_input: String,
    /// Comma-separated list of drug names.
    #[arg(long)]
    pub drugs: String,
    /// Path to knowledge base JSON file; the built-in one is used if omitted.
    #[arg(long)]
    pub path_kb: Option<String>,
    /// Path to the output JSON file; `.gz` suffix enables compression.
    #[arg(long)]
    pub path_output: String,
    /// Patient identifier to report; generated if omitted.
    #[arg(long)]
    pub patient_id: Option<String>,
}

/// Main entry point for the `pgx assess` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = std::time::Instant::now();
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let drugs = common::split_list(&args.drugs);
    if drugs.is_empty() {
        anyhow::bail!("no drug names given in {:?}", &args.drugs);
    }

    let kb = crate::kb::load(args.path_kb.as_deref())?;
    let parse_result = super::load_vcf(&args.path_input, &kb)?;

    let patient_id = args.patient_id.clone().unwrap_or_else(generate_patient_id);
    let timestamp = chrono::Utc::now();

    tracing::info!("Assessing {} drugs...", drugs.len());
    let before_assessing = std::time::Instant::now();
    let records = drugs
        .par_iter()
        .map(|drug| {
            assess_drug(&kb, drug, &parse_result.variants).and_then(|assessments| {
                AnalysisResult::build(
                    &kb,
                    &patient_id,
                    drug,
                    timestamp,
                    &assessments,
                    &parse_result,
                )
            })
        })
        .collect::<Vec<_>>();

    let mut results = Vec::new();
    for (drug, record) in drugs.iter().zip(records) {
        match record {
            Some(record) => {
                tracing::info!(
                    "{}: {} {} ({}) -> {} [{}]",
                    drug,
                    &record.pharmacogenomic_profile.primary_gene,
                    &record.pharmacogenomic_profile.diplotype,
                    record.pharmacogenomic_profile.phenotype.description(),
                    &record.risk_assessment.risk_label,
                    record.risk_assessment.severity
                );
                results.push(record);
            }
            None => tracing::warn!("skipping unsupported drug {:?}", drug),
        }
    }
    tracing::info!(
        "... done assessing {} supported drugs in {:?}",
        results.len(),
        before_assessing.elapsed()
    );

    write_json_maybe_gz(&args.path_output, &results)?;

    tracing::info!(
        "All of `pgx assess` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}
