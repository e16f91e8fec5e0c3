//! Common functionality.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Genotype string used when no call is available.
pub const NO_CALL: &str = "./.";

/// Strip a leading `/` or `|` from a genotype string.
///
/// Some callers write haploid calls with a leading separator.
pub fn strip_gt_leading_slash(gt: &str) -> &str {
    gt.strip_prefix('/')
        .or_else(|| gt.strip_prefix('|'))
        .unwrap_or(gt)
}

/// Split a genotype into its allele tokens, accepting both `/` and `|`.
pub fn genotype_alleles(gt: &str) -> impl Iterator<Item = &str> {
    strip_gt_leading_slash(gt).split(['/', '|'])
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
