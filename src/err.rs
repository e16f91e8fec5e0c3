//! Error types of the pharmacogenomic engine.

/// Structural faults while reading variant call records.
///
/// These never escape the reader; they are converted into a failed
/// `ParseResult` carrying the message.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("second header line found at line {line}")]
    DuplicateHeader { line: usize },
}

/// Problems with the knowledge base detected on construction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KbError {
    #[error("no variant definitions given")]
    NoVariantDefinitions,
    #[error("invalid rsID {rsid:?}")]
    InvalidRsid { rsid: String },
    #[error("rsID {rsid} is defined more than once")]
    DuplicateRsid { rsid: String },
    #[error("invalid star allele {star_allele:?} for {rsid}")]
    InvalidStarAllele { rsid: String, star_allele: String },
    #[error("star allele {star_allele} of {gene} is defined with conflicting effects")]
    ConflictingEffect { gene: String, star_allele: String },
    #[error("drug {drug} is defined more than once")]
    DuplicateDrug { drug: String },
    #[error("drug {drug} has no gene rules")]
    NoGeneRules { drug: String },
    #[error("rules for drug {drug} and gene {gene} lack the Unknown fallback")]
    MissingFallback { drug: String, gene: String },
}
