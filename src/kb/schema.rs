//! Data structures for the knowledge base records.

use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// Functional effect of a star allele.
#[derive(
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Clone,
    Copy,
    Default,
    EnumString,
    strum::Display,
    strum::EnumIter,
)]
pub enum FunctionalEffect {
    /// No enzyme activity.
    #[serde(rename = "No Function")]
    #[strum(serialize = "No Function")]
    NoFunction,
    /// Reduced enzyme activity.
    #[serde(rename = "Decreased Function")]
    #[strum(serialize = "Decreased Function")]
    DecreasedFunction,
    /// Wildtype enzyme activity.
    #[serde(rename = "Normal Function")]
    #[strum(serialize = "Normal Function")]
    NormalFunction,
    /// Elevated enzyme activity.
    #[serde(rename = "Increased Function")]
    #[strum(serialize = "Increased Function")]
    IncreasedFunction,
    /// Effect not known.
    #[default]
    #[serde(rename = "Unknown")]
    #[strum(serialize = "Unknown")]
    Unknown,
}

/// Metabolizer phenotype.
#[derive(
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Clone,
    Copy,
    Default,
    EnumString,
    strum::Display,
    strum::EnumIter,
)]
pub enum Phenotype {
    /// Poor metabolizer.
    #[serde(rename = "PM")]
    #[strum(serialize = "PM")]
    Pm,
    /// Intermediate metabolizer.
    #[serde(rename = "IM")]
    #[strum(serialize = "IM")]
    Im,
    /// Normal metabolizer.
    #[serde(rename = "NM")]
    #[strum(serialize = "NM")]
    Nm,
    /// Rapid metabolizer.
    #[serde(rename = "RM")]
    #[strum(serialize = "RM")]
    Rm,
    /// Ultra-rapid metabolizer.
    #[serde(rename = "URM")]
    #[strum(serialize = "URM")]
    Urm,
    /// Not determinable; selects the fallback rule.
    #[default]
    #[serde(rename = "Unknown")]
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl Phenotype {
    /// Human-readable name.
    pub fn description(&self) -> &'static str {
        match self {
            Phenotype::Pm => "Poor Metabolizer",
            Phenotype::Im => "Intermediate Metabolizer",
            Phenotype::Nm => "Normal Metabolizer",
            Phenotype::Rm => "Rapid Metabolizer",
            Phenotype::Urm => "Ultra-rapid Metabolizer",
            Phenotype::Unknown => "Unknown",
        }
    }
}

/// Clinical severity of a risk rule.
#[derive(
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Clone,
    Copy,
    Default,
    EnumString,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// No action needed.
    #[default]
    None,
    /// Low.
    Low,
    /// Moderate.
    Moderate,
    /// High.
    High,
    /// Critical.
    Critical,
}

/// Definition of a star allele by a single defining variant.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct VariantDefinition {
    /// HGNC gene symbol, e.g., `"CYP2D6"`.
    pub gene: String,
    /// dbSNP identifier, e.g., `"rs3892097"`.
    pub rsid: String,
    /// The alternate allele defining the variant (e.g., `"A"` for G>A).
    pub variant_allele: String,
    /// The resulting star allele, e.g., `"*4"`.
    pub star_allele: String,
    /// Functional effect of the star allele.
    pub effect: FunctionalEffect,
}

/// Risk rule for one phenotype.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct RiskRule {
    /// Short risk label, e.g., `"Ineffective"`.
    #[serde(alias = "risk")]
    pub risk_label: String,
    /// Clinical severity.
    pub severity: Severity,
    /// Dosing recommendation.
    pub recommendation: String,
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("No Function", FunctionalEffect::NoFunction)]
    #[case("Decreased Function", FunctionalEffect::DecreasedFunction)]
    #[case("Normal Function", FunctionalEffect::NormalFunction)]
    #[case("Increased Function", FunctionalEffect::IncreasedFunction)]
    #[case("Unknown", FunctionalEffect::Unknown)]
    fn functional_effect_labels(
        #[case] label: &str,
        #[case] effect: FunctionalEffect,
    ) -> Result<(), anyhow::Error> {
        assert_eq!(FunctionalEffect::from_str(label)?, effect);
        assert_eq!(effect.to_string(), label);
        assert_eq!(serde_json::to_string(&effect)?, format!("{:?}", label));

        Ok(())
    }

    #[rstest]
    #[case("PM", Phenotype::Pm)]
    #[case("IM", Phenotype::Im)]
    #[case("NM", Phenotype::Nm)]
    #[case("RM", Phenotype::Rm)]
    #[case("URM", Phenotype::Urm)]
    #[case("Unknown", Phenotype::Unknown)]
    fn phenotype_labels(#[case] label: &str, #[case] phenotype: Phenotype) -> Result<(), anyhow::Error> {
        assert_eq!(Phenotype::from_str(label)?, phenotype);
        assert_eq!(phenotype.to_string(), label);

        Ok(())
    }

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::None < Severity::Low);
        assert!(Severity::High < Severity::Critical);
        assert_eq!(Severity::Moderate.to_string(), "moderate");
    }

    #[test]
    fn risk_rule_accepts_short_label_key() -> Result<(), anyhow::Error> {
        let rule: RiskRule = serde_json::from_str(
            r#"{"risk": "Toxic", "severity": "critical", "recommendation": "Avoid."}"#,
        )?;

        assert_eq!(rule.risk_label, "Toxic");
        assert_eq!(rule.severity, Severity::Critical);

        Ok(())
    }
}
