//! Interpretation of VCF meta and header lines.

/// Prefix of meta lines.
pub const META_PREFIX: &str = "##";
/// Prefix of the header line.
pub const HEADER_PREFIX: &str = "#";

/// Key of the meta line holding the format version.
const FILE_FORMAT_KEY: &str = "fileformat";

/// Standard VCF column positions.
mod pos {
    pub const ID: usize = 2;
    pub const QUAL: usize = 5;
    pub const FILTER: usize = 6;
    pub const FORMAT: usize = 8;
}

/// Indices of the columns that the reader evaluates.
///
/// `CHROM` and `POS` are always the first two columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub id: usize,
    pub qual: usize,
    pub filter: usize,
    pub format: usize,
    /// Index of the evaluated (first) sample column.
    pub sample: usize,
    /// Name of the evaluated sample, if declared in the header.
    pub sample_name: Option<String>,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            id: pos::ID,
            qual: pos::QUAL,
            filter: pos::FILTER,
            format: pos::FORMAT,
            sample: pos::FORMAT + 1,
            sample_name: None,
        }
    }
}

impl Columns {
    /// Resolve columns from the header line, falling back to standard positions.
    pub fn from_header_line(line: &str) -> Self {
        let names = line
            .trim_start_matches(HEADER_PREFIX)
            .split('\t')
            .collect::<Vec<_>>();
        let find = |name: &str, default: usize| {
            names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(name))
                .unwrap_or(default)
        };

        let format = find("FORMAT", pos::FORMAT);
        let sample = format + 1;
        Self {
            id: find("ID", pos::ID),
            qual: find("QUAL", pos::QUAL),
            filter: find("FILTER", pos::FILTER),
            format,
            sample,
            sample_name: names
                .get(sample)
                .filter(|name| !name.is_empty())
                .map(|name| name.to_string()),
        }
    }
}

/// Extract the format version from a `##fileformat=` meta line.
pub fn file_format(meta_line: &str) -> Option<&str> {
    let (key, value) = meta_line.strip_prefix(META_PREFIX)?.split_once('=')?;
    if key.trim() == FILE_FORMAT_KEY {
        Some(value.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::Columns;

    #[test]
    fn standard_header() {
        let columns = Columns::from_header_line(
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA12878",
        );

        assert_eq!(
            columns,
            Columns {
                sample_name: Some("NA12878".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn sites_only_header() {
        let columns = Columns::from_header_line("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO");

        assert_eq!(columns, Columns::default());
    }

    #[test]
    fn reordered_header() {
        let columns =
            Columns::from_header_line("#CHROM\tPOS\tREF\tALT\tID\tFILTER\tQUAL\tFORMAT\tS1\tS2");

        assert_eq!(columns.id, 4);
        assert_eq!(columns.filter, 5);
        assert_eq!(columns.qual, 6);
        assert_eq!(columns.format, 7);
        assert_eq!(columns.sample, 8);
        assert_eq!(columns.sample_name.as_deref(), Some("S1"));
    }

    #[rstest]
    #[case("##fileformat=VCFv4.2", Some("VCFv4.2"))]
    #[case("##fileformat=VCFv4.3\r", Some("VCFv4.3"))]
    #[case("##source=caller", None)]
    #[case("##fileformat", None)]
    #[case("#CHROM", None)]
    fn file_format(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(super::file_format(line), expected);
    }
}
