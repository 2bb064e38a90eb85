use serde::{Deserialize, Serialize};

use metagen_core::search::{Positioned, SearchKey, search_slice};

use crate::errors::ListBuildError;
use crate::view::ListViewBuilder;

/// A single nucleotide polymorphism with its two most observed bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snp {
    pub position: u32,
    pub first_base: u8,
    pub first_base_count: u32,
    pub second_base: u8,
    pub second_base_count: u32,
}

impl Snp {
    pub fn new(position: u32, first: (u8, u32), second: (u8, u32)) -> Self {
        Snp {
            position,
            first_base: first.0,
            first_base_count: first.1,
            second_base: second.0,
            second_base_count: second.1,
        }
    }

    /// Share of the reads supporting the second base.
    pub fn minor_frequency(&self) -> f32 {
        let total = self.first_base_count + self.second_base_count;
        match total {
            0 => 0.0,
            total => self.second_base_count as f32 / total as f32,
        }
    }
}

impl Positioned for Snp {
    fn start(&self) -> u32 {
        self.position
    }

    fn stop(&self) -> u32 {
        self.position + 1
    }
}

/// SNPs of one chromosome sorted by position, at most one per position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnpList {
    snps: Vec<Snp>,
}

impl SnpList {
    /// Sort `snps` and keep the first SNP seen at each position.
    pub fn from_unsorted(mut snps: Vec<Snp>) -> Self {
        snps.sort_by_key(|snp| snp.position);
        snps.dedup_by_key(|snp| snp.position);
        SnpList { snps }
    }

    pub fn len(&self) -> usize {
        self.snps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Snp> {
        self.snps.get(index)
    }

    pub fn as_slice(&self) -> &[Snp] {
        &self.snps
    }

    pub fn at(&self, position: u32) -> Option<&Snp> {
        let index = search_slice(&self.snps, position, SearchKey::Start)?;
        self.snps.get(index).filter(|snp| snp.position == position)
    }

    /// SNPs in `[start, stop)`.
    pub fn in_window(&self, start: u32, stop: u32) -> &[Snp] {
        if start >= stop {
            return &[];
        }
        let Some(first) = search_slice(&self.snps, start, SearchKey::Start) else {
            return &[];
        };
        let Some(last) = search_slice(&self.snps, stop - 1, SearchKey::Start) else {
            return &[];
        };

        // the searches collapse on the last SNP when the bound is past it
        let first = if self.snps[first].position < start { first + 1 } else { first };
        let end = if self.snps[last].position < stop { last + 1 } else { last };
        match first < end {
            true => &self.snps[first..end],
            false => &[],
        }
    }

    /// First SNP strictly after `position`.
    pub fn next_after(&self, position: u32) -> Option<&Snp> {
        let index = search_slice(&self.snps, position.checked_add(1)?, SearchKey::Start)?;
        self.snps.get(index).filter(|snp| snp.position > position)
    }

    /// Last SNP strictly before `position`.
    pub fn previous_before(&self, position: u32) -> Option<&Snp> {
        let index = search_slice(&self.snps, position, SearchKey::Start)?;
        let index = match self.snps[index].position < position {
            true => index,
            false => index.checked_sub(1)?,
        };
        self.snps.get(index)
    }
}

/// Builder of a [`SnpList`] from SNPs in increasing position order.
#[derive(Debug)]
pub struct SnpListBuilder {
    snps: Option<Vec<Snp>>,
}

impl Default for SnpListBuilder {
    fn default() -> Self {
        SnpListBuilder { snps: Some(Vec::new()) }
    }
}

impl ListViewBuilder for SnpListBuilder {
    type Element = Snp;
    type View = SnpList;

    fn add_element_to_build(&mut self, snp: Snp) -> Result<(), ListBuildError> {
        let snps = self.snps.as_mut().ok_or(ListBuildError::AlreadyBuilt)?;
        if let Some(previous) = snps.last() {
            if snp.position <= previous.position {
                return Err(ListBuildError::UnsortedInput {
                    previous: previous.position,
                    start: snp.position,
                });
            }
        }
        snps.push(snp);
        Ok(())
    }

    fn get_list_view(&mut self) -> Result<SnpList, ListBuildError> {
        let mut snps = self.snps.take().ok_or(ListBuildError::AlreadyBuilt)?;
        snps.shrink_to_fit();
        Ok(SnpList { snps })
    }
}
