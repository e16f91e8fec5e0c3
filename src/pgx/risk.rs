//! Drug risk lookup.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::kb::schema::{Phenotype, RiskRule, Severity};
use crate::kb::KnowledgeBase;
use crate::pgx::ingest::VariantCall;
use crate::pgx::star_allele::Diplotype;
use crate::pgx::{profile_gene, GeneProfile};

/// Confidence attached to all rule-based assessments.
pub const CONFIDENCE_SCORE: f32 = 0.95;

/// Risk assessment of one drug for one gene.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct RiskAssessment {
    pub gene: String,
    pub phenotype: Phenotype,
    pub diplotype: Diplotype,
    pub risk_label: String,
    pub severity: Severity,
    pub recommendation: String,
    pub confidence: f32,
    /// Star allele contributions ignored when assembling the diplotype.
    pub dropped_contributions: usize,
}

impl RiskAssessment {
    /// Combine a gene profile with the matching rule.
    pub fn new(profile: GeneProfile, rule: &RiskRule) -> Self {
        Self {
            gene: profile.gene,
            phenotype: profile.phenotype,
            diplotype: profile.diplotype,
            risk_label: rule.risk_label.clone(),
            severity: rule.severity,
            recommendation: rule.recommendation.clone(),
            confidence: CONFIDENCE_SCORE,
            dropped_contributions: profile.dropped_contributions,
        }
    }
}

/// Look up the rule for `drug`, `gene`, and `phenotype`.
///
/// Returns `None` if the drug or the gene is not covered.  A missing
/// phenotype entry yields the gene's `Unknown` rule.
pub fn lookup_rule<'a>(
    kb: &'a KnowledgeBase,
    drug: &str,
    gene: &str,
    phenotype: Phenotype,
) -> Option<&'a RiskRule> {
    kb.drug_rules(drug)
        .and_then(|genes| genes.get(gene))
        .map(|rules| rules.rule_for(phenotype))
}

/// Assess `drug` for all genes in its rule table.
///
/// Returns `None` if the drug is not supported.  The first entry is the
/// primary gene.
pub fn assess_drug(
    kb: &KnowledgeBase,
    drug: &str,
    variants: &[VariantCall],
) -> Option<IndexMap<String, RiskAssessment>> {
    let Some(genes) = kb.drug_rules(drug) else {
        tracing::debug!("drug {:?} is not supported", drug);
        return None;
    };

    Some(
        genes
            .iter()
            .map(|(gene, rules)| {
                let profile = profile_gene(kb, gene, variants);
                let rule = rules.rule_for(profile.phenotype);
                (gene.clone(), RiskAssessment::new(profile, rule))
            })
            .collect(),
    )
}
