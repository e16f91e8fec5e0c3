//! Classification of diplotypes into metabolizer phenotypes.

use crate::kb::schema::{FunctionalEffect, Phenotype};
use crate::kb::KnowledgeBase;
use crate::pgx::star_allele::Diplotype;

/// Functional effect of one allele label of `gene`.
pub fn allele_effect(kb: &KnowledgeBase, gene: &str, star_allele: &str) -> FunctionalEffect {
    kb.star_allele_effect(gene, star_allele)
}

/// Classify the unordered pair of functional effects.
///
/// The arms mirror the priority table; pairs not listed there (including all
/// pairs involving `Unknown`) fall through to normal metabolizer.
pub fn classify_effects(a: FunctionalEffect, b: FunctionalEffect) -> Phenotype {
    use crate::kb::schema::FunctionalEffect::*;

    match (a, b) {
        (IncreasedFunction, IncreasedFunction) => Phenotype::Urm,
        (NormalFunction, IncreasedFunction) | (IncreasedFunction, NormalFunction) => Phenotype::Rm,
        (IncreasedFunction, NoFunction) | (NoFunction, IncreasedFunction) => Phenotype::Im,
        (IncreasedFunction, DecreasedFunction) | (DecreasedFunction, IncreasedFunction) => {
            Phenotype::Nm
        }
        (NoFunction, NoFunction) => Phenotype::Pm,
        (NoFunction, DecreasedFunction) | (DecreasedFunction, NoFunction) => Phenotype::Im,
        (DecreasedFunction, DecreasedFunction) => Phenotype::Im,
        (NoFunction, NormalFunction) | (NormalFunction, NoFunction) => Phenotype::Im,
        (NormalFunction, NormalFunction) => Phenotype::Nm,
        (NormalFunction, DecreasedFunction) | (DecreasedFunction, NormalFunction) => Phenotype::Nm,
        (Unknown, _) | (_, Unknown) => Phenotype::Nm,
    }
}

/// Classify the diplotype of `gene`.
pub fn classify(kb: &KnowledgeBase, gene: &str, diplotype: &Diplotype) -> Phenotype {
    let [first, second] = diplotype.alleles();
    classify_effects(
        allele_effect(kb, gene, first),
        allele_effect(kb, gene, second),
    )
}
