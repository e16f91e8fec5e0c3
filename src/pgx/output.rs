//! Per-drug analysis records written by `pgx assess`.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::kb::schema::{FunctionalEffect, Phenotype, Severity};
use crate::kb::KnowledgeBase;
use crate::pgx::ingest::ParseResult;
use crate::pgx::risk::RiskAssessment;
use crate::pgx::star_allele::Diplotype;

/// Prefix of generated patient identifiers.
const PATIENT_ID_PREFIX: &str = "PATIENT_";
/// Number of random characters in generated patient identifiers.
const PATIENT_ID_LEN: usize = 5;

/// Generate a random patient identifier such as `PATIENT_3FA9C`.
pub fn generate_patient_id() -> String {
    let random = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}{}", PATIENT_ID_PREFIX, &random[..PATIENT_ID_LEN])
}

/// Risk of the primary gene.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, derive_new::new)]
pub struct RiskSummary {
    pub risk_label: String,
    pub confidence_score: f32,
    pub severity: Severity,
}

/// A tracked variant found in the sample.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct DetectedVariant {
    pub rsid: String,
    pub genotype: String,
    /// Functional effect of the star allele defined by the variant.
    pub impact: FunctionalEffect,
}

/// Diplotype, phenotype, and evidence of the primary gene.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, derive_new::new)]
pub struct PharmacogenomicProfile {
    pub primary_gene: String,
    pub diplotype: Diplotype,
    pub phenotype: Phenotype,
    pub detected_variants: Vec<DetectedVariant>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, derive_new::new)]
pub struct ClinicalRecommendation {
    pub summary: String,
}

/// Information on the input quality.
#[serde_with::skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, derive_new::new)]
pub struct QualityMetrics {
    pub vcf_parsing_success: bool,
    pub variant_count: usize,
    pub error_msg: Option<String>,
}

impl QualityMetrics {
    /// Summarize a parse result.
    pub fn from_parse_result(parse_result: &ParseResult) -> Self {
        Self::new(
            parse_result.is_success,
            parse_result.variants.len(),
            parse_result.error.clone(),
        )
    }
}

/// Analysis result of one drug.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, derive_new::new)]
pub struct AnalysisResult {
    pub patient_id: String,
    pub drug: String,
    pub timestamp: DateTime<Utc>,
    pub risk_assessment: RiskSummary,
    pub pharmacogenomic_profile: PharmacogenomicProfile,
    pub clinical_recommendation: ClinicalRecommendation,
    pub quality_metrics: QualityMetrics,
}

impl AnalysisResult {
    /// Build the record from the assessments of one drug.
    ///
    /// The first gene of `assessments` is reported as primary gene; `None` is
    /// returned for an empty map.
    pub fn build(
        kb: &KnowledgeBase,
        patient_id: &str,
        drug: &str,
        timestamp: DateTime<Utc>,
        assessments: &IndexMap<String, RiskAssessment>,
        parse_result: &ParseResult,
    ) -> Option<Self> {
        let (gene, assessment) = assessments.first()?;

        let detected_variants = parse_result
            .variants
            .iter()
            .filter(|call| &call.gene == gene)
            .map(|call| {
                let impact = kb
                    .definition_by_rsid(&call.rsid)
                    .map(|def| def.effect)
                    .unwrap_or_default();
                DetectedVariant::new(call.rsid.clone(), call.genotype.clone(), impact)
            })
            .collect();

        Some(Self::new(
            patient_id.to_string(),
            drug.trim().to_string(),
            timestamp,
            RiskSummary::new(
                assessment.risk_label.clone(),
                assessment.confidence,
                assessment.severity,
            ),
            PharmacogenomicProfile::new(
                gene.clone(),
                assessment.diplotype.clone(),
                assessment.phenotype,
                detected_variants,
            ),
            ClinicalRecommendation::new(assessment.recommendation.clone()),
            QualityMetrics::from_parse_result(parse_result),
        ))
    }
}
