//! Minimal VCF line model: the columns needed to place variants per sample.
use std::collections::HashMap;

use crate::error::{Result, TabixError};

const FIXED_COLUMNS: usize = 8;

/// Sample names from the `#CHROM` header line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VcfHeader {
    pub meta: Vec<String>,
    pub samples: Vec<String>,
    sample_index: HashMap<String, usize>,
}

impl VcfHeader {
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let mut meta = Vec::new();
        let mut samples = None;

        for line in lines {
            let line = line.as_ref();
            if let Some(columns) = line.strip_prefix("#CHROM") {
                samples = Some(
                    columns
                        .split('\t')
                        .skip(FIXED_COLUMNS + 1)
                        .map(str::to_string)
                        .collect::<Vec<_>>(),
                );
            } else if line.starts_with("##") {
                meta.push(line.to_string());
            }
        }

        let samples = samples.ok_or_else(|| TabixError::InvalidRecord("missing #CHROM header line".to_string()))?;
        let sample_index = samples
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        Ok(VcfHeader {
            meta,
            samples,
            sample_index,
        })
    }

    pub fn sample_index(&self, name: &str) -> Option<usize> {
        self.sample_index.get(name).copied()
    }
}

/// Allele indices of one sample, `None` for a no-call (`.`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genotype {
    pub alleles: Vec<Option<usize>>,
    pub phased: bool,
}

impl Genotype {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.split(':').next()?;
        if value.is_empty() {
            return None;
        }
        let phased = value.contains('|');
        let alleles = value
            .split(['|', '/'])
            .map(|allele| match allele {
                "." => Ok(None),
                allele => allele.parse::<usize>().map(Some),
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .ok()?;
        Some(Genotype { alleles, phased })
    }

    pub fn is_no_call(&self) -> bool {
        self.alleles.iter().all(Option::is_none)
    }

    /// First allele that differs from the reference.
    pub fn first_alternative(&self) -> Option<usize> {
        self.alleles.iter().flatten().copied().find(|&a| a > 0)
    }
}

/// One VCF data line.
#[derive(Debug, Clone, PartialEq)]
pub struct VcfRecord {
    pub chrom: String,
    /// One-based position.
    pub pos: u32,
    pub id: String,
    pub reference: String,
    pub alternatives: Vec<String>,
    pub qual: Option<f32>,
    pub filter: String,
    pub info: String,
    pub format: Vec<String>,
    pub samples: Vec<String>,
}

impl VcfRecord {
    pub fn parse(line: &str) -> Result<Self> {
        let invalid = || TabixError::InvalidRecord(line.to_string());
        let mut columns = line.split('\t');
        let mut next = || columns.next().ok_or_else(invalid);

        let chrom = next()?.to_string();
        let pos = next()?.parse::<u32>().map_err(|_| invalid())?;
        let id = next()?.to_string();
        let reference = next()?.to_string();
        let alternatives = match next()? {
            "." => Vec::new(),
            alt => alt.split(',').map(str::to_string).collect(),
        };
        let qual = match next()? {
            "." => None,
            qual => Some(qual.parse::<f32>().map_err(|_| invalid())?),
        };
        let filter = next()?.to_string();
        let info = next()?.to_string();

        let format = columns
            .next()
            .map(|f| f.split(':').map(str::to_string).collect())
            .unwrap_or_default();
        let samples = columns.map(str::to_string).collect();

        Ok(VcfRecord {
            chrom,
            pos,
            id,
            reference,
            alternatives,
            qual,
            filter,
            info,
            format,
            samples,
        })
    }

    /// Value of an INFO key, `Some("")` for a flag.
    pub fn info_value(&self, key: &str) -> Option<&str> {
        self.info.split(';').find_map(|entry| match entry.split_once('=') {
            Some((k, v)) if k == key => Some(v),
            None if entry == key => Some(""),
            _ => None,
        })
    }

    pub fn is_filtered(&self) -> bool {
        !matches!(self.filter.as_str(), "PASS" | "." | "")
    }

    /// A FORMAT field of one sample column.
    pub fn sample_field(&self, sample: usize, key: &str) -> Option<&str> {
        let position = self.format.iter().position(|f| f == key)?;
        self.samples.get(sample)?.split(':').nth(position)
    }

    pub fn genotype(&self, sample: usize) -> Option<Genotype> {
        Genotype::parse(self.sample_field(sample, "GT")?)
    }

    /// Allele sequence by index, `0` being the reference.
    pub fn allele(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(&self.reference),
            i => self.alternatives.get(i - 1).map(String::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_header_samples() {
        let lines = vec![
            "##fileformat=VCFv4.2",
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA1\tNA2",
        ];
        let header = VcfHeader::from_lines(&lines).unwrap();
        assert_eq!(header.samples, vec!["NA1".to_string(), "NA2".to_string()]);
        assert_eq!(header.sample_index("NA2"), Some(1));
        assert_eq!(header.sample_index("NA3"), None);
        assert_eq!(header.meta.len(), 1);
    }

    #[rstest]
    fn test_header_without_column_line() {
        assert!(VcfHeader::from_lines(&["##fileformat=VCFv4.2"]).is_err());
    }

    #[rstest]
    #[case("0/1", Some(1), false)]
    #[case("1|0", Some(1), true)]
    #[case("0|2:35", Some(2), true)]
    #[case("0/0", None, false)]
    #[case("./.", None, false)]
    fn test_genotype(#[case] value: &str, #[case] alternative: Option<usize>, #[case] phased: bool) {
        let genotype = Genotype::parse(value).unwrap();
        assert_eq!(genotype.first_alternative(), alternative);
        assert_eq!(genotype.phased, phased);
    }

    #[rstest]
    fn test_genotype_no_call() {
        assert!(Genotype::parse("./.").unwrap().is_no_call());
        assert!(!Genotype::parse("0/.").unwrap().is_no_call());
        assert_eq!(Genotype::parse("x/1"), None);
    }

    #[rstest]
    fn test_parse_record() {
        let record =
            VcfRecord::parse("chr1\t100\trs1\tA\tAT,G\t50\tPASS\tDP=10;SOMATIC\tGT:DP\t0/1:4\t2|2:7").unwrap();
        assert_eq!(record.pos, 100);
        assert_eq!(record.allele(0), Some("A"));
        assert_eq!(record.allele(2), Some("G"));
        assert_eq!(record.allele(3), None);
        assert_eq!(record.qual, Some(50.0));
        assert_eq!(record.info_value("DP"), Some("10"));
        assert_eq!(record.info_value("SOMATIC"), Some(""));
        assert_eq!(record.info_value("END"), None);
        assert_eq!(record.sample_field(1, "DP"), Some("7"));
        assert_eq!(record.genotype(0).unwrap().first_alternative(), Some(1));
        assert!(!record.is_filtered());
    }

    #[rstest]
    fn test_parse_sites_only_record() {
        let record = VcfRecord::parse("chr2\t5\t.\tC\t.\t.\tLowQual\t.").unwrap();
        assert!(record.alternatives.is_empty());
        assert!(record.samples.is_empty());
        assert!(record.is_filtered());
        assert_eq!(record.genotype(0), None);
    }

    #[rstest]
    fn test_parse_truncated_record() {
        assert!(matches!(
            VcfRecord::parse("chr1\t100\trs1"),
            Err(TabixError::InvalidRecord(_))
        ));
    }
}
