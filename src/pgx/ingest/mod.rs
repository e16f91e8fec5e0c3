//! Reading of variant calls from VCF text.
//!
//! The reader is lenient: it never fails on short or unknown rows
//! and converts structural faults into a failed [`ParseResult`] rather than
//! propagating an error.

use serde::{Deserialize, Serialize};

use crate::common::{self, NO_CALL};
use crate::err::ParseError;
use crate::kb::KnowledgeBase;

pub mod header;

use header::{Columns, HEADER_PREFIX, META_PREFIX};

/// Rows with fewer tab-separated fields are skipped.
pub const MIN_FIELDS: usize = 5;

/// Key of the genotype subfield in the FORMAT column.
const GT_KEY: &str = "GT";

/// Missing value in VCF.
const MISSING: &str = ".";

/// One retained variant call.
#[serde_with::skip_serializing_none]
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, derive_new::new)]
pub struct VariantCall {
    /// Gene of the matching variant definition.
    pub gene: String,
    /// The known rsID of the row.
    pub rsid: String,
    /// Chromosome name as written in the file.
    pub chrom: String,
    /// 1-based position, `None` if not numeric.
    pub pos: Option<u64>,
    /// Genotype with `/` separators, `./.` if not available.
    pub genotype: String,
    /// Phred-scaled quality, `None` if missing.
    pub quality: Option<f32>,
    /// Value of the FILTER column.
    pub filter: String,
}

/// Information collected about the input.
#[serde_with::skip_serializing_none]
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct VcfMetadata {
    /// Value of the `##fileformat=` line, e.g., `VCFv4.2`.
    pub file_format: Option<String>,
    /// Whether a header line was found.
    pub header_found: bool,
    /// Name of the evaluated sample.
    pub sample: Option<String>,
    /// Number of data rows after the header.
    pub rows_seen: usize,
    /// Number of data rows skipped as malformed.
    pub rows_skipped: usize,
}

/// Result of reading variant calls.
#[serde_with::skip_serializing_none]
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct ParseResult {
    /// Retained calls in input order.
    pub variants: Vec<VariantCall>,
    /// Whether parsing succeeded.
    pub is_success: bool,
    /// Error message on failure.
    pub error: Option<String>,
    /// Metadata collected up to the end (or failure) of parsing.
    pub metadata: VcfMetadata,
}

/// Parse VCF text, retaining the rows with rsIDs known to `kb`.
pub fn parse_vcf(text: &str, kb: &KnowledgeBase) -> ParseResult {
    let mut metadata = VcfMetadata::default();
    match read_variants(text, kb, &mut metadata) {
        Ok(variants) => {
            tracing::debug!(
                "retained {} of {} data rows ({} skipped as malformed)",
                variants.len(),
                metadata.rows_seen,
                metadata.rows_skipped
            );
            ParseResult {
                variants,
                is_success: true,
                error: None,
                metadata,
            }
        }
        Err(e) => {
            tracing::warn!("problem parsing VCF: {}", &e);
            ParseResult {
                variants: Vec::new(),
                is_success: false,
                error: Some(e.to_string()),
                metadata,
            }
        }
    }
}

fn read_variants(
    text: &str,
    kb: &KnowledgeBase,
    metadata: &mut VcfMetadata,
) -> Result<Vec<VariantCall>, ParseError> {
    let mut columns: Option<Columns> = None;
    let mut result = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with(META_PREFIX) {
            if let Some(value) = header::file_format(line) {
                metadata.file_format = Some(value.to_string());
            }
            continue;
        } else if line.starts_with(HEADER_PREFIX) {
            if columns.is_some() {
                return Err(ParseError::DuplicateHeader { line: lineno });
            }
            let header = Columns::from_header_line(line);
            metadata.header_found = true;
            metadata.sample = header.sample_name.clone();
            columns = Some(header);
            continue;
        }

        let Some(columns) = columns.as_ref() else {
            tracing::trace!("ignoring line {} before header", lineno);
            continue;
        };

        metadata.rows_seen += 1;
        let fields = line.split('\t').collect::<Vec<_>>();
        if fields.len() < MIN_FIELDS {
            tracing::debug!(
                "skipping line {} with {} < {} fields",
                lineno,
                fields.len(),
                MIN_FIELDS
            );
            metadata.rows_skipped += 1;
            continue;
        }

        if let Some(call) = read_row(&fields, columns, kb, lineno) {
            result.push(call);
        }
    }

    if !metadata.header_found {
        tracing::warn!("no header line found, no variants were read");
    }

    Ok(result)
}

/// Convert one data row; `None` if its identifier is not tracked.
fn read_row(
    fields: &[&str],
    columns: &Columns,
    kb: &KnowledgeBase,
    lineno: usize,
) -> Option<VariantCall> {
    let Some(definition) = fields
        .get(columns.id)
        .into_iter()
        .flat_map(|ids| ids.split(';'))
        .find_map(|id| kb.definition_by_rsid(id.trim()))
    else {
        return None;
    };

    let pos = fields[1].trim().parse::<u64>().ok();
    if pos.is_none() {
        tracing::debug!("line {}: invalid position {:?}", lineno, fields[1]);
    }
    let quality = fields
        .get(columns.qual)
        .filter(|&&qual| qual != MISSING)
        .and_then(|qual| qual.parse::<f32>().ok());
    let filter = fields.get(columns.filter).unwrap_or(&MISSING).to_string();

    let genotype = extract_genotype(
        fields.get(columns.format).copied(),
        fields.get(columns.sample).copied(),
    );
    tracing::trace!(
        "line {}: {} ({}) genotype {}",
        lineno,
        &definition.rsid,
        &definition.gene,
        &genotype
    );

    Some(VariantCall::new(
        definition.gene.clone(),
        definition.rsid.clone(),
        fields[0].to_string(),
        pos,
        genotype,
        quality,
        filter,
    ))
}

/// Extract the normalized genotype from the FORMAT and sample fields.
fn extract_genotype(format: Option<&str>, sample: Option<&str>) -> String {
    let (Some(format), Some(sample)) = (format, sample) else {
        return NO_CALL.to_string();
    };
    let Some(gt_idx) = format.split(':').position(|key| key == GT_KEY) else {
        return NO_CALL.to_string();
    };
    match sample.split(':').nth(gt_idx).map(str::trim) {
        Some(gt) if !gt.is_empty() => normalize_genotype(gt),
        _ => NO_CALL.to_string(),
    }
}

/// Normalize a genotype to use `/` as the separator.
pub fn normalize_genotype(gt: &str) -> String {
    common::strip_gt_leading_slash(gt).replace('|', "/")
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{parse_vcf, VariantCall};
    use crate::kb::KnowledgeBase;

    const HEADER: &str = "##fileformat=VCFv4.2\n\
        #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tPATIENT\n";

    fn kb() -> KnowledgeBase {
        KnowledgeBase::builtin().expect("invalid built-in knowledge base")
    }

    #[test]
    fn homozygous_row() {
        let text = format!("{}10\t96341059\trs3892097\tG\tA\t.\t.\t.\tGT\t1/1\n", HEADER);
        let result = parse_vcf(&text, &kb());

        assert!(result.is_success);
        assert_eq!(result.error, None);
        assert_eq!(
            result.variants,
            vec![VariantCall::new(
                "CYP2D6".into(),
                "rs3892097".into(),
                "10".into(),
                Some(96341059),
                "1/1".into(),
                None,
                ".".into()
            )]
        );
        assert_eq!(result.metadata.file_format.as_deref(), Some("VCFv4.2"));
        assert_eq!(result.metadata.sample.as_deref(), Some("PATIENT"));
        assert!(result.metadata.header_found);
    }

    #[rstest]
    #[case("1|0", "1/0")]
    #[case("0|1", "0/1")]
    #[case("0/0", "0/0")]
    #[case("./.", "./.")]
    #[case("1", "1")]
    fn genotype_normalization(#[case] raw: &str, #[case] expected: &str) {
        let text = format!(
            "{}22\t42130692\trs1065852\tG\tA\t50\tPASS\t.\tGT:DP\t{}:30\n",
            HEADER, raw
        );
        let result = parse_vcf(&text, &kb());

        assert_eq!(result.variants.len(), 1);
        assert_eq!(result.variants[0].genotype, expected);
    }

    #[rstest]
    #[case("GT\t0/1", "0/1")]
    #[case("DP:GT\t12:1/1", "1/1")]
    #[case("DP\t12", "./.")]
    #[case("GT", "./.")]
    #[case("", "./.")]
    fn genotype_from_format(#[case] tail: &str, #[case] expected: &str) {
        let row = if tail.is_empty() {
            "10\t96341059\trs3892097\tG\tA\t.\t.\t.".to_string()
        } else {
            format!("10\t96341059\trs3892097\tG\tA\t.\t.\t.\t{}", tail)
        };
        let result = parse_vcf(&format!("{}{}\n", HEADER, row), &kb());

        assert_eq!(result.variants.len(), 1);
        assert_eq!(result.variants[0].genotype, expected);
    }

    #[test]
    fn short_rows_are_skipped() {
        let text = format!(
            "{}10\t96341059\trs3892097\n\
             10\t96341059\trs3892097\tG\tA\t.\t.\t.\tGT\t0/1\n",
            HEADER
        );
        let result = parse_vcf(&text, &kb());

        assert!(result.is_success);
        assert_eq!(result.variants.len(), 1);
        assert_eq!(result.metadata.rows_seen, 2);
        assert_eq!(result.metadata.rows_skipped, 1);
    }

    #[test]
    fn homozygous_reference_is_retained() {
        let text = format!("{}10\t96341059\trs3892097\tG\tA\t.\t.\t.\tGT\t0/0\n", HEADER);
        let result = parse_vcf(&text, &kb());

        assert_eq!(result.variants.len(), 1);
        assert_eq!(result.variants[0].genotype, "0/0");
    }

    #[test]
    fn unknown_rsids_are_dropped() {
        let text = format!(
            "{}1\t100\trs999999\tG\tA\t.\t.\t.\tGT\t1/1\n\
             1\t101\t.\tG\tA\t.\t.\t.\tGT\t1/1\n",
            HEADER
        );
        let result = parse_vcf(&text, &kb());

        assert!(result.is_success);
        assert!(result.variants.is_empty());
        assert_eq!(result.metadata.rows_seen, 2);
        assert_eq!(result.metadata.rows_skipped, 0);
    }

    #[test]
    fn multiple_ids_use_first_known() {
        let text = format!(
            "{}10\t94781859\tCOSV1;rs4244285;rs3892097\tG\tA\t99.5\tPASS\t.\tGT\t0/1\n",
            HEADER
        );
        let result = parse_vcf(&text, &kb());

        assert_eq!(result.variants.len(), 1);
        assert_eq!(result.variants[0].rsid, "rs4244285");
        assert_eq!(result.variants[0].gene, "CYP2C19");
        assert_eq!(result.variants[0].filter, "PASS");
        assert!(float_cmp::approx_eq!(
            f32,
            result.variants[0].quality.unwrap_or_default(),
            99.5,
            ulps = 2
        ));
    }

    #[test]
    fn missing_header_yields_zero_variants() {
        let text = "10\t96341059\trs3892097\tG\tA\t.\t.\t.\tGT\t1/1\n";
        let result = parse_vcf(text, &kb());

        assert!(result.is_success);
        assert!(result.variants.is_empty());
        assert!(!result.metadata.header_found);
        assert_eq!(result.metadata.rows_seen, 0);
    }

    #[test]
    fn rows_before_header_are_ignored() {
        let text = format!(
            "10\t96341059\trs3892097\tG\tA\t.\t.\t.\tGT\t1/1\n{}",
            HEADER
        );
        let result = parse_vcf(&text, &kb());

        assert!(result.is_success);
        assert!(result.variants.is_empty());
    }

    #[test]
    fn second_header_fails() {
        let text = format!(
            "{}10\t96341059\trs3892097\tG\tA\t.\t.\t.\tGT\t1/1\n\
             #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n",
            HEADER
        );
        let result = parse_vcf(&text, &kb());

        assert!(!result.is_success);
        assert!(result.variants.is_empty());
        assert_eq!(
            result.error.as_deref(),
            Some("second header line found at line 4")
        );
    }

    #[test]
    fn invalid_position_keeps_row() {
        let text = format!(
            "{}10\t96341059\trs3892097\tG\tA\t.\t.\t.\tGT\t1/1\n\
             22\tNA\trs1065852\tG\tA\t.\t.\t.\tGT\t0/1\n",
            HEADER
        );
        let result = parse_vcf(&text, &kb());

        assert!(result.is_success);
        assert_eq!(result.error, None);
        assert_eq!(
            result
                .variants
                .iter()
                .map(|v| (v.rsid.as_str(), v.pos, v.genotype.as_str()))
                .collect::<Vec<_>>(),
            vec![
                ("rs3892097", Some(96341059), "1/1"),
                ("rs1065852", None, "0/1"),
            ]
        );
        assert_eq!(result.metadata.rows_skipped, 0);
    }

    #[test]
    fn invalid_position_in_untracked_row_is_ignored() {
        let text = format!("{}10\tabc\trs1\tG\tA\t.\t.\t.\tGT\t1/1\n", HEADER);

        assert!(parse_vcf(&text, &kb()).is_success);
    }

    #[test]
    fn crlf_and_blank_lines() {
        let text = "##fileformat=VCFv4.2\r\n\
            #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS\r\n\
            \r\n\
            10\t96341059\trs3892097\tG\tA\t.\t.\t.\tGT\t0/1\r\n";
        let result = parse_vcf(text, &kb());

        assert_eq!(result.metadata.file_format.as_deref(), Some("VCFv4.2"));
        assert_eq!(result.metadata.rows_seen, 1);
        assert_eq!(result.variants[0].genotype, "0/1");
    }

    #[test]
    fn fixture_file() -> Result<(), anyhow::Error> {
        let text = crate::common::io::read_to_string_maybe_gz("tests/data/mixed.vcf")?;
        let result = parse_vcf(&text, &kb());

        assert!(result.is_success);
        assert_eq!(
            result
                .variants
                .iter()
                .map(|v| (v.rsid.as_str(), v.genotype.as_str()))
                .collect::<Vec<_>>(),
            vec![
                ("rs3892097", "0/1"),
                ("rs1065852", "1/0"),
                ("rs4244285", "1/1"),
                ("rs1799853", "0/0"),
                ("rs4149056", "./."),
            ]
        );
        assert_eq!(result.metadata.rows_seen, 7);
        assert_eq!(result.metadata.rows_skipped, 1);

        Ok(())
    }
}
