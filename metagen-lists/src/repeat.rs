use fxhash::FxHashMap as HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::errors::ListBuildError;
use crate::view::{IntervalView, ListViewBuilder};

/// One repeat of a chromosome, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatRecord {
    pub start: u32,
    pub stop: u32,
    pub family: String,
}

impl RepeatRecord {
    pub fn new(start: u32, stop: u32, family: impl Into<String>) -> Self {
        RepeatRecord {
            start,
            stop,
            family: family.into(),
        }
    }
}

/// The repeats of one family on one chromosome, sorted by start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatFamily {
    name: String,
    starts: Vec<u32>,
    stops: Vec<u32>,
}

impl RepeatFamily {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start of the first repeat; families are never empty.
    pub fn first_start(&self) -> u32 {
        self.starts.first().copied().unwrap_or(0)
    }
}

impl IntervalView for RepeatFamily {
    fn len(&self) -> usize {
        self.starts.len()
    }

    fn start_at(&self, index: usize) -> u32 {
        self.starts[index]
    }

    fn stop_at(&self, index: usize) -> u32 {
        self.stops[index]
    }

    fn score_at(&self, _index: usize) -> f32 {
        1.0
    }
}

/// Repeat families of one chromosome, sorted by the start of their first repeat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepeatFamilyList {
    families: Vec<RepeatFamily>,
}

impl RepeatFamilyList {
    ///
    /// Build from parallel columns of one chromosome.
    ///
    pub fn from_columns(starts: &[u32], stops: &[u32], families: &[String]) -> Result<Self, ListBuildError> {
        for found in [stops.len(), families.len()] {
            if found != starts.len() {
                return Err(ListBuildError::LengthMismatch {
                    expected: starts.len(),
                    found,
                });
            }
        }

        let mut builder = RepeatFamilyListBuilder::default();
        for ((&start, &stop), family) in starts.iter().zip(stops).zip(families) {
            builder.add_element_to_build(RepeatRecord::new(start, stop, family.as_str()))?;
        }
        builder.get_list_view()
    }

    pub fn families(&self) -> &[RepeatFamily] {
        &self.families
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn family(&self, name: &str) -> Option<&RepeatFamily> {
        self.families.iter().find(|f| f.name == name)
    }

    ///
    /// Families with at least one repeat overlapping `[start, stop)`, paired
    /// with the index range of those repeats.
    ///
    pub fn families_in_window(&self, start: u32, stop: u32) -> Vec<(&RepeatFamily, Range<usize>)> {
        // families whose first repeat starts at or after the window can't overlap it
        let candidates = self.families.partition_point(|f| f.first_start() < stop);
        self.families[..candidates]
            .iter()
            .map(|family| (family, family.intervals_in_window(start, stop)))
            .filter(|(_, range)| !range.is_empty())
            .collect()
    }
}

///
/// Builder of a [`RepeatFamilyList`] from repeats in file order.
///
/// Repeats of one family need not be contiguous nor sorted; they are grouped
/// by name during the scan and each family is stable sorted when the list is
/// built.
///
#[derive(Debug)]
pub struct RepeatFamilyListBuilder {
    families: Option<HashMap<String, Vec<(u32, u32)>>>,
}

impl Default for RepeatFamilyListBuilder {
    fn default() -> Self {
        RepeatFamilyListBuilder {
            families: Some(HashMap::default()),
        }
    }
}

impl ListViewBuilder for RepeatFamilyListBuilder {
    type Element = RepeatRecord;
    type View = RepeatFamilyList;

    fn add_element_to_build(&mut self, repeat: RepeatRecord) -> Result<(), ListBuildError> {
        let families = self.families.as_mut().ok_or(ListBuildError::AlreadyBuilt)?;
        if repeat.start >= repeat.stop {
            return Err(ListBuildError::InvalidInterval {
                start: repeat.start,
                stop: repeat.stop,
            });
        }
        families
            .entry(repeat.family)
            .or_default()
            .push((repeat.start, repeat.stop));
        Ok(())
    }

    fn get_list_view(&mut self) -> Result<RepeatFamilyList, ListBuildError> {
        let families = self.families.take().ok_or(ListBuildError::AlreadyBuilt)?;

        let mut families: Vec<RepeatFamily> = families
            .into_iter()
            .map(|(name, mut repeats)| {
                repeats.sort_by_key(|&(start, _)| start);
                let (starts, stops) = repeats.into_iter().unzip();
                RepeatFamily { name, starts, stops }
            })
            .collect();
        families.sort_by(|a, b| a.first_start().cmp(&b.first_start()).then_with(|| a.name.cmp(&b.name)));

        Ok(RepeatFamilyList { families })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn repeats() -> RepeatFamilyList {
        let starts = [500, 10, 300, 40, 100, 30];
        let stops = [520, 20, 350, 60, 110, 35];
        let families = ["Alu", "L1", "Alu", "(CA)n", "L1", "L1"].map(String::from);
        RepeatFamilyList::from_columns(&starts, &stops, &families).unwrap()
    }

    #[rstest]
    fn test_families_sorted_by_first_repeat(repeats: RepeatFamilyList) {
        let names: Vec<&str> = repeats.families().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["L1", "(CA)n", "Alu"]);
    }

    #[rstest]
    fn test_repeats_sorted_within_family(repeats: RepeatFamilyList) {
        let l1 = repeats.family("L1").unwrap();
        let starts: Vec<u32> = l1.iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![10, 30, 100]);
        assert!(l1.iter().all(|r| r.score == 1.0));
        assert_eq!(l1.index_at(32), Some(1));
    }

    #[rstest]
    fn test_families_in_window(repeats: RepeatFamilyList) {
        let hits: Vec<(&str, Range<usize>)> = repeats
            .families_in_window(50, 320)
            .into_iter()
            .map(|(family, range)| (family.name(), range))
            .collect();
        assert_eq!(hits, vec![("L1", 2..3), ("(CA)n", 0..1), ("Alu", 0..1)]);
        assert!(repeats.families_in_window(600, 700).is_empty());
    }

    #[rstest]
    fn test_column_length_mismatch() {
        let result = RepeatFamilyList::from_columns(&[1, 2], &[3], &["A".to_string(), "B".to_string()]);
        assert_eq!(result, Err(ListBuildError::LengthMismatch { expected: 2, found: 1 }));
    }

    #[rstest]
    fn test_builder_is_single_use() {
        let mut builder = RepeatFamilyListBuilder::default();
        builder.get_list_view().unwrap();
        assert_eq!(
            builder.add_element_to_build(RepeatRecord::new(1, 2, "Alu")),
            Err(ListBuildError::AlreadyBuilt)
        );
    }
}
