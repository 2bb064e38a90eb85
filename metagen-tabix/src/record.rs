//! Extraction of the genomic interval a data line covers, following the
//! column layout declared by the index.
use crate::error::{Result, TabixError};
use crate::index::{Preset, TabixIndex};

/// Sequence id and half-open, zero-based `[begin, end)` of a data line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordInterval {
    pub tid: i32,
    pub begin: u32,
    pub end: u32,
}

impl RecordInterval {
    pub fn overlaps(&self, begin: u32, end: u32) -> bool {
        self.end > begin && self.begin < end
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, line: &str) -> Result<T> {
    field
        .trim()
        .parse::<T>()
        .map_err(|_| TabixError::InvalidRecord(line.to_string()))
}

/// Number of reference bases a CIGAR string consumes, at least one.
fn cigar_reference_length(cigar: &str, line: &str) -> Result<u32> {
    let mut length = 0u32;
    let mut number_start = 0;
    for (i, op) in cigar.char_indices() {
        if op.is_ascii_digit() {
            continue;
        }
        if matches!(op, 'M' | 'D' | 'N' | '=' | 'X') {
            length += parse_field::<u32>(&cigar[number_start..i], line)?;
        }
        number_start = i + op.len_utf8();
    }
    Ok(length.max(1))
}

/// Value of the `END=` key of a VCF INFO column.
fn info_end(info: &str) -> Option<&str> {
    info.split(';').find_map(|entry| entry.strip_prefix("END="))
}

impl TabixIndex {
    ///
    /// Decode the interval covered by a tab separated data line.
    ///
    /// The begin column is one-based unless the index is flagged zero-based.
    /// The end comes from the end column (generic), the CIGAR (SAM), or the
    /// REF length and an optional `END=` INFO key (VCF). A line without a
    /// usable end covers a single base.
    ///
    pub fn record_interval(&self, line: &str) -> Result<RecordInterval> {
        let preset = self.preset();
        let mut interval = RecordInterval {
            tid: -1,
            begin: 0,
            end: 0,
        };

        for (i, field) in line.split('\t').enumerate() {
            let column = i as i32 + 1;
            if column == self.sequence_column {
                interval.tid = self.tid(field);
            } else if column == self.begin_column {
                let position: i64 = parse_field(field, line)?;
                let (begin, end) = if self.is_zero_based() {
                    (position, position + 1)
                } else {
                    (position - 1, position)
                };
                interval.begin = begin.clamp(0, u32::MAX as i64) as u32;
                interval.end = end.clamp(1, u32::MAX as i64) as u32;
            } else {
                match preset {
                    Preset::Generic if column == self.end_column => {
                        interval.end = parse_field(field, line)?;
                    }
                    Preset::Sam if column == 6 => {
                        interval.end = interval.begin + cigar_reference_length(field, line)?;
                    }
                    Preset::Vcf if column == 4 && !field.is_empty() => {
                        interval.end = interval.begin + field.len() as u32;
                    }
                    Preset::Vcf if column == 8 => {
                        if let Some(end) = info_end(field) {
                            interval.end = parse_field(end, line)?;
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(interval)
    }
}
