//! Variants placed in the meta-genome and the per-allele lists holding them.
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use metagen_lists::{IntervalView, ListBuildError, ListViewBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantType {
    Insertion,
    Deletion,
    Snp,
    NoCall,
    /// Synthetic marker standing for several overlapping variants.
    Mix,
}

impl Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariantType::Insertion => "insertion",
            VariantType::Deletion => "deletion",
            VariantType::Snp => "SNP",
            VariantType::NoCall => "no call",
            VariantType::Mix => "mix",
        };
        write!(f, "{name}")
    }
}

///
/// Display byte of a variant. Negative values hide the variant.
///
/// `ShowFiltered` shows the variants that passed the VCF filters and hides
/// the others.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i8)]
pub enum DisplayPolicy {
    Hide = -1,
    #[default]
    Show = 0,
    ShowFiltered = 1,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub variant_type: VariantType,
    /// Zero-based position of the first affected reference base.
    pub reference_position: u32,
    /// Position of the variant in the genome carrying it.
    pub native_start: u32,
    pub meta_start: u32,
    pub meta_stop: u32,
    pub reference: String,
    pub alternative: String,
    /// Inserted or deleted bases, 1 for a SNP.
    pub length: u32,
    pub score: Option<f32>,
    /// `true` when the record failed a VCF filter.
    pub filtered: bool,
    pub display: DisplayPolicy,
}

impl Variant {
    /// Mix markers are always visible.
    pub fn is_visible(&self) -> bool {
        self.variant_type == VariantType::Mix || (self.display as i8) >= 0
    }

    pub fn contains(&self, meta: u32) -> bool {
        self.meta_start <= meta && meta < self.meta_stop
    }

    fn apply_policy(&mut self, policy: DisplayPolicy) {
        self.display = match policy {
            DisplayPolicy::ShowFiltered if self.filtered => DisplayPolicy::Hide,
            policy => policy,
        };
    }

    /// A mix marker spanning `self` and `other`.
    fn merged(&self, other: &Variant) -> Variant {
        Variant {
            variant_type: VariantType::Mix,
            reference_position: self.reference_position.min(other.reference_position),
            native_start: self.native_start.min(other.native_start),
            meta_start: self.meta_start.min(other.meta_start),
            meta_stop: self.meta_stop.max(other.meta_stop),
            reference: String::new(),
            alternative: String::new(),
            length: 0,
            score: None,
            filtered: false,
            display: DisplayPolicy::Show,
        }
    }
}

///
/// Variants of one allele of one genome on one chromosome, sorted by meta
/// start and non-overlapping.
///
/// Only the display bytes change after construction.
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantDisplayList {
    variants: Vec<Variant>,
}

impl VariantDisplayList {
    pub fn variant(&self, index: usize) -> Option<&Variant> {
        self.variants.get(index)
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Apply `policy` to every variant of `variant_type`; mix markers are left alone.
    pub fn set_display_policy(&mut self, variant_type: VariantType, policy: DisplayPolicy) {
        if variant_type == VariantType::Mix {
            return;
        }
        self.variants
            .iter_mut()
            .filter(|variant| variant.variant_type == variant_type)
            .for_each(|variant| variant.apply_policy(policy));
    }

    pub fn set_display(&mut self, index: usize, policy: DisplayPolicy) {
        if let Some(variant) = self.variants.get_mut(index) {
            variant.apply_policy(policy);
        }
    }

    pub fn visible_count(&self) -> usize {
        self.variants.iter().filter(|v| v.is_visible()).count()
    }
}

impl IntervalView for VariantDisplayList {
    fn len(&self) -> usize {
        self.variants.len()
    }

    fn start_at(&self, index: usize) -> u32 {
        self.variants[index].meta_start
    }

    fn stop_at(&self, index: usize) -> u32 {
        self.variants[index].meta_stop
    }

    fn score_at(&self, index: usize) -> f32 {
        self.variants[index].score.unwrap_or(0.0)
    }
}

///
/// Builder of a [`VariantDisplayList`].
///
/// Variants may come in any order. Overlapping variants are collapsed into
/// one [`VariantType::Mix`] marker covering all of them.
///
#[derive(Debug)]
pub struct VariantDisplayListBuilder {
    variants: Option<Vec<Variant>>,
}

impl Default for VariantDisplayListBuilder {
    fn default() -> Self {
        VariantDisplayListBuilder {
            variants: Some(Vec::new()),
        }
    }
}

impl ListViewBuilder for VariantDisplayListBuilder {
    type Element = Variant;
    type View = VariantDisplayList;

    fn add_element_to_build(&mut self, variant: Variant) -> Result<(), ListBuildError> {
        let variants = self.variants.as_mut().ok_or(ListBuildError::AlreadyBuilt)?;
        if variant.meta_start >= variant.meta_stop {
            return Err(ListBuildError::InvalidInterval {
                start: variant.meta_start,
                stop: variant.meta_stop,
            });
        }
        variants.push(variant);
        Ok(())
    }

    fn get_list_view(&mut self) -> Result<VariantDisplayList, ListBuildError> {
        let mut input = self.variants.take().ok_or(ListBuildError::AlreadyBuilt)?;
        input.sort_by_key(|variant| variant.meta_start);

        let mut variants: Vec<Variant> = Vec::with_capacity(input.len());
        for variant in input {
            match variants.last_mut() {
                Some(last) if variant.meta_start < last.meta_stop => *last = last.merged(&variant),
                _ => variants.push(variant),
            }
        }
        Ok(VariantDisplayList { variants })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    pub(crate) fn variant(variant_type: VariantType, meta_start: u32, meta_stop: u32) -> Variant {
        Variant {
            variant_type,
            reference_position: meta_start,
            native_start: meta_start,
            meta_start,
            meta_stop,
            reference: "A".to_string(),
            alternative: "T".to_string(),
            length: meta_stop - meta_start,
            score: Some(30.0),
            filtered: false,
            display: DisplayPolicy::Show,
        }
    }

    pub(crate) fn build(variants: Vec<Variant>) -> VariantDisplayList {
        let mut builder = VariantDisplayListBuilder::default();
        for variant in variants {
            builder.add_element_to_build(variant).unwrap();
        }
        builder.get_list_view().unwrap()
    }

    #[rstest]
    fn test_sorted_and_searchable() {
        let list = build(vec![
            variant(VariantType::Snp, 50, 51),
            variant(VariantType::Insertion, 10, 14),
            variant(VariantType::Deletion, 30, 33),
        ]);
        let starts: Vec<u32> = list.variants().iter().map(|v| v.meta_start).collect();
        assert_eq!(starts, vec![10, 30, 50]);
        assert_eq!(list.index_at(32), Some(1));
        assert_eq!(list.index_at(33), None);
        assert_eq!(list.intervals_in_window(12, 51), 0..3);
    }

    #[rstest]
    fn test_overlaps_collapse_into_mix() {
        let list = build(vec![
            variant(VariantType::Deletion, 10, 20),
            variant(VariantType::Snp, 15, 16),
            variant(VariantType::Snp, 19, 20),
            variant(VariantType::Snp, 20, 21),
        ]);
        assert_eq!(list.len(), 2);
        let mix = list.variant(0).unwrap();
        assert_eq!(mix.variant_type, VariantType::Mix);
        assert_eq!((mix.meta_start, mix.meta_stop), (10, 20));
        assert_eq!(list.variant(1).unwrap().variant_type, VariantType::Snp);
    }

    #[rstest]
    fn test_display_policies() {
        let mut filtered = variant(VariantType::Snp, 5, 6);
        filtered.filtered = true;
        let mut list = build(vec![
            filtered,
            variant(VariantType::Snp, 8, 9),
            variant(VariantType::Deletion, 10, 20),
            variant(VariantType::Insertion, 15, 16),
        ]);
        assert_eq!(list.visible_count(), 3);

        list.set_display_policy(VariantType::Snp, DisplayPolicy::ShowFiltered);
        assert_eq!(list.variant(0).unwrap().display, DisplayPolicy::Hide);
        assert_eq!(list.variant(1).unwrap().display, DisplayPolicy::ShowFiltered);

        list.set_display_policy(VariantType::Mix, DisplayPolicy::Hide);
        list.set_display(2, DisplayPolicy::Hide);
        // mix markers cannot be hidden
        assert_eq!(list.visible_count(), 2);
        assert!(list.variant(2).unwrap().is_visible());
    }

    #[rstest]
    fn test_builder_is_single_use() {
        let mut builder = VariantDisplayListBuilder::default();
        builder.add_element_to_build(variant(VariantType::Snp, 1, 2)).unwrap();
        builder.get_list_view().unwrap();
        assert_eq!(
            builder.add_element_to_build(variant(VariantType::Snp, 3, 4)),
            Err(ListBuildError::AlreadyBuilt)
        );
        assert!(matches!(builder.get_list_view(), Err(ListBuildError::AlreadyBuilt)));
    }

    #[rstest]
    fn test_empty_variant_is_rejected() {
        let mut builder = VariantDisplayListBuilder::default();
        assert_eq!(
            builder.add_element_to_build(variant(VariantType::Insertion, 7, 7)),
            Err(ListBuildError::InvalidInterval { start: 7, stop: 7 })
        );
    }
}
