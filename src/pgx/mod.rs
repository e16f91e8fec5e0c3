//! The pharmacogenomic pipeline.
//!
//! Variant calls flow through the resolver, the diplotype assembler, and the
//! phenotype classifier; the result is combined with the drug rules in
//! [`risk`].  All stages are pure functions over the immutable knowledge base.

pub mod cli;
pub mod ingest;
pub mod output;
pub mod phenotype;
pub mod risk;
pub mod star_allele;

use crate::kb::schema::Phenotype;
use crate::kb::KnowledgeBase;
use ingest::VariantCall;
use star_allele::Diplotype;

/// Diplotype and phenotype of one gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneProfile {
    pub gene: String,
    pub diplotype: Diplotype,
    pub phenotype: Phenotype,
    /// Star allele contributions that did not fit into the diplotype.
    pub dropped_contributions: usize,
}

/// Compute the profile of `gene` from all variant calls of the sample.
pub fn profile_gene(kb: &KnowledgeBase, gene: &str, variants: &[VariantCall]) -> GeneProfile {
    let contributions = star_allele::resolve_all(kb, gene, variants);
    let assembly = star_allele::assemble(gene, &contributions);
    let phenotype = phenotype::classify(kb, gene, &assembly.diplotype);
    tracing::debug!(
        "{}: {} contributions, diplotype {}, phenotype {}",
        gene,
        contributions.len(),
        &assembly.diplotype,
        phenotype
    );

    GeneProfile {
        gene: gene.to_string(),
        diplotype: assembly.diplotype,
        phenotype,
        dropped_contributions: assembly.dropped,
    }
}
