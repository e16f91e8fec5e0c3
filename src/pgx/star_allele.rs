//! Resolution of variant calls to star alleles and diplotype assembly.

use std::fmt;
use std::str::FromStr;

use crate::common;
use crate::kb::{KnowledgeBase, REFERENCE_STAR_ALLELE};
use crate::pgx::ingest::VariantCall;

/// Allele token denoting the variant allele.
const VARIANT_ALLELE_TOKEN: &str = "1";

/// One observed copy of a star allele.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct Contribution {
    pub gene: String,
    pub star_allele: String,
    /// rsID of the call that produced the contribution.
    pub rsid: String,
}

/// Number of allele positions carrying the variant allele.
///
/// Alternate alleles other than the first are not distinguished from the
/// reference.
pub fn variant_allele_count(genotype: &str) -> usize {
    common::genotype_alleles(genotype)
        .filter(|allele| allele.trim() == VARIANT_ALLELE_TOKEN)
        .count()
}

/// Resolve a single call for `gene` into zero, one, or two contributions.
pub fn resolve(kb: &KnowledgeBase, gene: &str, call: &VariantCall) -> Vec<Contribution> {
    let Some(definition) = kb.definition(gene, &call.rsid) else {
        return Vec::new();
    };
    let count = variant_allele_count(&call.genotype);
    std::iter::repeat_with(|| {
        Contribution::new(
            definition.gene.clone(),
            definition.star_allele.clone(),
            definition.rsid.clone(),
        )
    })
    .take(count)
    .collect()
}

/// Resolve all calls for `gene`, in input order.
pub fn resolve_all(kb: &KnowledgeBase, gene: &str, calls: &[VariantCall]) -> Vec<Contribution> {
    calls
        .iter()
        .flat_map(|call| resolve(kb, gene, call))
        .collect()
}

/// An ordered pair of star allele labels.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    serde_with::SerializeDisplay,
    serde_with::DeserializeFromStr,
)]
pub struct Diplotype {
    alleles: [String; 2],
}

impl Default for Diplotype {
    fn default() -> Self {
        Self::reference()
    }
}

impl Diplotype {
    /// Construct from the two labels.
    pub fn new(first: &str, second: &str) -> Self {
        Self {
            alleles: [first.to_string(), second.to_string()],
        }
    }

    /// The wildtype diplotype `*1/*1`.
    pub fn reference() -> Self {
        Self::new(REFERENCE_STAR_ALLELE, REFERENCE_STAR_ALLELE)
    }

    /// The two labels.
    pub fn alleles(&self) -> &[String; 2] {
        &self.alleles
    }

    /// The same diplotype with the labels swapped.
    pub fn swapped(&self) -> Self {
        Self::new(&self.alleles[1], &self.alleles[0])
    }
}

impl fmt::Display for Diplotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.alleles[0], self.alleles[1])
    }
}

impl FromStr for Diplotype {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((first, second))
                if !first.is_empty() && !second.is_empty() && !second.contains('/') =>
            {
                Ok(Self::new(first, second))
            }
            _ => anyhow::bail!("invalid diplotype: {:?}", s),
        }
    }
}

/// Result of assembling contributions of one gene.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assembly {
    pub diplotype: Diplotype,
    /// Number of contributions beyond the first two that were not used.
    pub dropped: usize,
}

/// Assemble the diplotype of `gene` from its contributions.
///
/// One contribution fills the second slot, two or more fill both slots in
/// order of appearance.
pub fn assemble(gene: &str, contributions: &[Contribution]) -> Assembly {
    match contributions {
        [] => Assembly::default(),
        [single] => Assembly {
            diplotype: Diplotype::new(REFERENCE_STAR_ALLELE, &single.star_allele),
            dropped: 0,
        },
        [first, second, rest @ ..] => {
            if !rest.is_empty() {
                tracing::warn!(
                    "{} star allele contributions for {}, using {} and {}, dropping {}",
                    contributions.len(),
                    gene,
                    &first.star_allele,
                    &second.star_allele,
                    rest.len()
                );
            }
            Assembly {
                diplotype: Diplotype::new(&first.star_allele, &second.star_allele),
                dropped: rest.len(),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::kb::test::small_kb;

    fn call(rsid: &str, genotype: &str) -> VariantCall {
        VariantCall::new(
            "CYP2D6".into(),
            rsid.into(),
            "22".into(),
            Some(42_128_945),
            genotype.into(),
            None,
            ".".into(),
        )
    }

    #[rstest]
    #[case("0/0", 0)]
    #[case("0/1", 1)]
    #[case("1/0", 1)]
    #[case("1/1", 2)]
    #[case("1", 1)]
    #[case("1/.", 1)]
    #[case("1/2", 1)]
    #[case("2/2", 0)]
    #[case("./.", 0)]
    #[case("", 0)]
    fn variant_allele_count(#[case] genotype: &str, #[case] expected: usize) {
        assert_eq!(super::variant_allele_count(genotype), expected);
    }

    #[rstest]
    #[case("0/0", 0)]
    #[case("0/1", 1)]
    #[case("1/1", 2)]
    fn resolve_by_zygosity(#[case] genotype: &str, #[case] expected: usize) {
        let contributions = resolve(&small_kb(), "CYP2D6", &call("rs3892097", genotype));

        assert_eq!(contributions.len(), expected);
        assert!(contributions.iter().all(|c| c.star_allele == "*4"));
    }

    #[test]
    fn resolve_other_gene_yields_nothing() {
        assert!(resolve(&small_kb(), "CYP2C19", &call("rs3892097", "1/1")).is_empty());
    }

    #[test]
    fn resolve_all_keeps_order() {
        let calls = vec![call("rs1065852", "0/1"), call("rs3892097", "0/1")];

        assert_eq!(
            resolve_all(&small_kb(), "CYP2D6", &calls)
                .into_iter()
                .map(|c| c.star_allele)
                .collect::<Vec<_>>(),
            vec!["*10", "*4"]
        );
    }

    #[test]
    fn assemble_nothing() {
        let assembly = assemble("CYP2D6", &[]);

        assert_eq!(assembly.diplotype.to_string(), "*1/*1");
        assert_eq!(assembly.dropped, 0);
    }

    #[test]
    fn assemble_one() {
        let assembly = assemble(
            "CYP2D6",
            &[Contribution::new("CYP2D6".into(), "*4".into(), "rs3892097".into())],
        );

        assert_eq!(assembly.diplotype, Diplotype::new("*1", "*4"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn assemble_drops_surplus() {
        let contributions = ["*10", "*4", "*6"]
            .iter()
            .map(|star| Contribution::new("CYP2D6".into(), star.to_string(), "rs1".into()))
            .collect::<Vec<_>>();
        let assembly = assemble("CYP2D6", &contributions);

        assert_eq!(assembly.diplotype, Diplotype::new("*10", "*4"));
        assert_eq!(assembly.dropped, 1);
        assert!(logs_contain("dropping 1"));
    }

    #[rstest]
    #[case("*1/*4", Some(("*1", "*4")))]
    #[case("*2A/*2A", Some(("*2A", "*2A")))]
    #[case("*1", None)]
    #[case("*1/", None)]
    #[case("*1/*2/*3", None)]
    fn diplotype_from_str(#[case] s: &str, #[case] expected: Option<(&str, &str)>) {
        let actual = s.parse::<Diplotype>().ok();

        assert_eq!(actual, expected.map(|(a, b)| Diplotype::new(a, b)));
    }

    #[test]
    fn diplotype_serializes_as_string() -> Result<(), anyhow::Error> {
        let diplotype = Diplotype::new("*1", "*4");

        assert_eq!(serde_json::to_string(&diplotype)?, r#""*1/*4""#);
        assert_eq!(diplotype.swapped().to_string(), "*4/*1");

        Ok(())
    }
}
