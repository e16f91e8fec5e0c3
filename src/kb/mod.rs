//! The immutable pharmacogenomic reference knowledge base.
//!
//! The knowledge base holds the star allele definitions and the nested
//! drug -> gene -> phenotype risk rule tables.  It is validated once on
//! construction and passed by reference into all pipeline stages.

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::common::io::read_to_string_maybe_gz;
use crate::err::KbError;

pub mod cli;
pub mod schema;

use schema::{FunctionalEffect, Phenotype, RiskRule, VariantDefinition};

/// The knowledge base that is compiled into the binary.
const BUILTIN_KB_JSON: &str = include_str!("../../data/knowledge_base.json");

lazy_static::lazy_static! {
    static ref RE_RSID: regex::Regex =
        regex::Regex::new(r"^rs\d+$").expect("invalid regex in source code");
    static ref RE_STAR_ALLELE: regex::Regex =
        regex::Regex::new(r"^\*\d+[A-Za-z0-9.]*$").expect("invalid regex in source code");
}

/// Label of the reference (wildtype) star allele.
pub const REFERENCE_STAR_ALLELE: &str = "*1";

/// Rules of one gene for one drug.
///
/// The `Unknown` fallback rule is kept apart from the explicit rules so that a
/// lookup always yields a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneRules {
    /// Rules for explicitly listed phenotypes other than `Unknown`.
    rules: IndexMap<Phenotype, RiskRule>,
    /// The mandatory fallback rule.
    fallback: RiskRule,
}

impl GeneRules {
    /// Construct from the raw phenotype table, requiring an `Unknown` entry.
    pub fn new(
        drug: &str,
        gene: &str,
        mut rules: IndexMap<Phenotype, RiskRule>,
    ) -> Result<Self, KbError> {
        let fallback =
            rules
                .shift_remove(&Phenotype::Unknown)
                .ok_or_else(|| KbError::MissingFallback {
                    drug: drug.to_string(),
                    gene: gene.to_string(),
                })?;
        Ok(Self { rules, fallback })
    }

    /// Return the rule for `phenotype`, or the fallback if there is none.
    pub fn rule_for(&self, phenotype: Phenotype) -> &RiskRule {
        self.explicit_rule(phenotype).unwrap_or(&self.fallback)
    }

    /// Return the explicit rule for `phenotype`, if any.
    pub fn explicit_rule(&self, phenotype: Phenotype) -> Option<&RiskRule> {
        self.rules.get(&phenotype)
    }

    /// The `Unknown` fallback rule.
    pub fn fallback(&self) -> &RiskRule {
        &self.fallback
    }

    fn to_raw(&self) -> IndexMap<Phenotype, RiskRule> {
        let mut result = self.rules.clone();
        result.insert(Phenotype::Unknown, self.fallback.clone());
        result
    }
}

/// Serialized form of the knowledge base, before validation.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawKnowledgeBase {
    /// Star allele definitions.
    pub variant_definitions: Vec<VariantDefinition>,
    /// Mapping drug -> gene -> phenotype -> rule.
    pub drug_rules: IndexMap<String, IndexMap<String, IndexMap<Phenotype, RiskRule>>>,
}

/// The validated knowledge base.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(try_from = "RawKnowledgeBase", into = "RawKnowledgeBase")]
pub struct KnowledgeBase {
    /// Star allele definitions in input order.
    variant_definitions: Vec<VariantDefinition>,
    /// Index from rsID into `variant_definitions`.
    by_rsid: HashMap<String, usize>,
    /// Index from (gene, star allele) to the first defining record.
    by_star_allele: HashMap<(String, String), usize>,
    /// Rules by upper-case drug name, then gene.
    drug_rules: IndexMap<String, IndexMap<String, GeneRules>>,
}

impl KnowledgeBase {
    /// Construct and validate.
    pub fn new(raw: RawKnowledgeBase) -> Result<Self, KbError> {
        let RawKnowledgeBase {
            variant_definitions,
            drug_rules: raw_drug_rules,
        } = raw;

        if variant_definitions.is_empty() {
            return Err(KbError::NoVariantDefinitions);
        }
        if let Some(rsid) = variant_definitions
            .iter()
            .map(|def| def.rsid.as_str())
            .duplicates()
            .next()
        {
            return Err(KbError::DuplicateRsid {
                rsid: rsid.to_string(),
            });
        }

        let mut by_rsid = HashMap::new();
        let mut by_star_allele: HashMap<(String, String), usize> = HashMap::new();
        for (idx, def) in variant_definitions.iter().enumerate() {
            if !RE_RSID.is_match(&def.rsid) {
                return Err(KbError::InvalidRsid {
                    rsid: def.rsid.clone(),
                });
            }
            if !RE_STAR_ALLELE.is_match(&def.star_allele) || def.star_allele == REFERENCE_STAR_ALLELE
            {
                return Err(KbError::InvalidStarAllele {
                    rsid: def.rsid.clone(),
                    star_allele: def.star_allele.clone(),
                });
            }
            by_rsid.insert(def.rsid.clone(), idx);

            let key = (def.gene.clone(), def.star_allele.clone());
            if let Some(&other) = by_star_allele.get(&key) {
                if variant_definitions[other].effect != def.effect {
                    return Err(KbError::ConflictingEffect {
                        gene: def.gene.clone(),
                        star_allele: def.star_allele.clone(),
                    });
                }
            } else {
                by_star_allele.insert(key, idx);
            }
        }

        let mut drug_rules = IndexMap::new();
        for (drug, gene_tables) in raw_drug_rules {
            let drug = normalize_drug_name(&drug);
            if gene_tables.is_empty() {
                return Err(KbError::NoGeneRules { drug });
            }
            let mut genes = IndexMap::new();
            for (gene, table) in gene_tables {
                let rules = GeneRules::new(&drug, &gene, table)?;
                genes.insert(gene, rules);
            }
            if drug_rules.insert(drug.clone(), genes).is_some() {
                return Err(KbError::DuplicateDrug { drug });
            }
        }

        Ok(Self {
            variant_definitions,
            by_rsid,
            by_star_allele,
            drug_rules,
        })
    }

    /// Load the knowledge base compiled into the binary.
    pub fn builtin() -> Result<Self, anyhow::Error> {
        serde_json::from_str(BUILTIN_KB_JSON)
            .map_err(|e| anyhow::anyhow!("problem loading built-in knowledge base: {}", e))
    }

    /// Load knowledge base from a JSON file (optionally gzip compressed).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let json = read_to_string_maybe_gz(path.as_ref())?;
        serde_json::from_str(&json).map_err(|e| {
            anyhow::anyhow!(
                "problem loading knowledge base from {:?}: {}",
                path.as_ref(),
                e
            )
        })
    }

    /// All star allele definitions.
    pub fn variant_definitions(&self) -> &[VariantDefinition] {
        &self.variant_definitions
    }

    /// Definition for the given rsID.
    pub fn definition_by_rsid(&self, rsid: &str) -> Option<&VariantDefinition> {
        self.by_rsid
            .get(rsid)
            .map(|&idx| &self.variant_definitions[idx])
    }

    /// Definition for the given rsID if it belongs to `gene`.
    pub fn definition(&self, gene: &str, rsid: &str) -> Option<&VariantDefinition> {
        self.definition_by_rsid(rsid).filter(|def| def.gene == gene)
    }

    /// Functional effect of a star allele of `gene`.
    ///
    /// The reference allele `*1` has normal function; labels without a
    /// definition have unknown function.
    pub fn star_allele_effect(&self, gene: &str, star_allele: &str) -> FunctionalEffect {
        if star_allele == REFERENCE_STAR_ALLELE {
            return FunctionalEffect::NormalFunction;
        }
        self.by_star_allele
            .get(&(gene.to_string(), star_allele.to_string()))
            .map(|&idx| self.variant_definitions[idx].effect)
            .unwrap_or_default()
    }

    /// Gene rule tables for `drug` (case-insensitive), `None` if unsupported.
    pub fn drug_rules(&self, drug: &str) -> Option<&IndexMap<String, GeneRules>> {
        self.drug_rules.get(&normalize_drug_name(drug))
    }

    /// Names of supported drugs, upper case, in definition order.
    pub fn supported_drugs(&self) -> impl Iterator<Item = &str> {
        self.drug_rules.keys().map(|s| s.as_str())
    }
}

impl TryFrom<RawKnowledgeBase> for KnowledgeBase {
    type Error = KbError;

    fn try_from(raw: RawKnowledgeBase) -> Result<Self, Self::Error> {
        KnowledgeBase::new(raw)
    }
}

impl From<KnowledgeBase> for RawKnowledgeBase {
    fn from(kb: KnowledgeBase) -> Self {
        RawKnowledgeBase {
            drug_rules: kb
                .drug_rules
                .iter()
                .map(|(drug, genes)| {
                    (
                        drug.clone(),
                        genes
                            .iter()
                            .map(|(gene, rules)| (gene.clone(), rules.to_raw()))
                            .collect(),
                    )
                })
                .collect(),
            variant_definitions: kb.variant_definitions,
        }
    }
}

/// Normalize a drug name for lookups.
pub fn normalize_drug_name(drug: &str) -> String {
    drug.trim().to_uppercase()
}

/// Load the knowledge base from `path` or fall back to the built-in one.
pub fn load(path: Option<&str>) -> Result<KnowledgeBase, anyhow::Error> {
    let before_loading = std::time::Instant::now();
    let kb = if let Some(path) = path {
        tracing::info!("Loading knowledge base from {}...", path);
        KnowledgeBase::from_path(path)?
    } else {
        tracing::info!("Loading built-in knowledge base...");
        KnowledgeBase::builtin()?
    };
    tracing::info!(
        "... done loading {} variant definitions and {} drugs in {:?}",
        kb.variant_definitions().len(),
        kb.supported_drugs().count(),
        before_loading.elapsed()
    );
    Ok(kb)
}
