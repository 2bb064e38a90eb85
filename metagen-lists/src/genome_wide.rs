//! Genome-wide lists: one list per chromosome, indexed like the project
//! chromosome registry, built chromosome-parallel.
use std::ops::Index;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use metagen_core::snapshot::{Snapshot, SnapshotKind};

use crate::errors::ListBuildError;
use crate::gene::GeneList;
use crate::repeat::RepeatFamilyList;
use crate::scored::ScoredIntervalList;
use crate::snp::SnpList;
use crate::view::ListViewBuilder;

/// Per-chromosome lists; position `i` holds chromosome `i` of the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeWideList<T> {
    lists: Vec<T>,
}

impl<T> GenomeWideList<T> {
    pub fn new(lists: Vec<T>) -> Self {
        GenomeWideList { lists }
    }

    pub fn get(&self, chromosome: usize) -> Option<&T> {
        self.lists.get(chromosome)
    }

    /// Number of chromosomes.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.lists.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.lists.iter_mut()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.lists
    }
}

impl<T> Index<usize> for GenomeWideList<T> {
    type Output = T;

    fn index(&self, chromosome: usize) -> &T {
        &self.lists[chromosome]
    }
}

impl Snapshot for GenomeWideList<ScoredIntervalList> {
    const KIND: SnapshotKind = SnapshotKind::IntervalList;
}

impl Snapshot for GenomeWideList<RepeatFamilyList> {
    const KIND: SnapshotKind = SnapshotKind::RepeatFamilyList;
}

impl Snapshot for GenomeWideList<SnpList> {
    const KIND: SnapshotKind = SnapshotKind::SnpList;
}

impl Snapshot for GenomeWideList<GeneList> {
    const KIND: SnapshotKind = SnapshotKind::GeneList;
}

fn build_one<B, F>(chromosome: usize, elements: Vec<B::Element>, make_builder: &F) -> Result<B::View, ListBuildError>
where
    B: ListViewBuilder,
    F: Fn() -> B,
{
    let mut builder = make_builder();
    let count = elements.len();
    for element in elements {
        builder.add_element_to_build(element)?;
    }
    let view = builder.get_list_view()?;
    log::debug!("built list of chromosome {chromosome} from {count} elements");
    Ok(view)
}

///
/// Build one list per chromosome on a pool of `threads` workers.
///
/// `rows[i]` holds the elements of chromosome `i`, in the order expected by
/// the builder. A fresh builder is made per chromosome. The call is all or
/// nothing: the first failing chromosome fails the whole build and no partial
/// list is returned.
///
/// # Arguments
/// - rows: per-chromosome input elements
/// - make_builder: creates an empty builder
/// - threads: worker count, 0 lets the pool pick one per core
///
pub fn build_genome_wide<B, F>(
    rows: Vec<Vec<B::Element>>,
    make_builder: F,
    threads: usize,
) -> Result<GenomeWideList<B::View>, ListBuildError>
where
    B: ListViewBuilder,
    B::Element: Send,
    B::View: Send,
    F: Fn() -> B + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ListBuildError::ThreadPool(e.to_string()))?;

    let lists = pool.install(|| {
        rows.into_par_iter()
            .enumerate()
            .map(|(chromosome, elements)| {
                build_one(chromosome, elements, &make_builder).inspect_err(|e| {
                    log::warn!("failed to build list of chromosome {chromosome}: {e}");
                })
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    Ok(GenomeWideList::new(lists))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use metagen_core::models::{ListLayout, ScorePrecision, ScoredInterval};
    use metagen_core::snapshot::{read_snapshot, write_snapshot};

    use crate::scored::ScoredListBuilder;
    use crate::view::IntervalView;

    fn rows(chromosomes: u32) -> Vec<Vec<ScoredInterval>> {
        (0..chromosomes)
            .map(|c| {
                (0..100)
                    .map(|i| ScoredInterval::new(i * 20, i * 20 + 10, (c + 1) as f32))
                    .collect()
            })
            .collect()
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    #[case(0)]
    fn test_lists_keep_chromosome_order(#[case] threads: usize) {
        let lists = build_genome_wide(
            rows(8),
            || ScoredListBuilder::new(ListLayout::Sparse, ScorePrecision::Full),
            threads,
        )
        .unwrap();

        assert_eq!(lists.len(), 8);
        for (c, list) in lists.iter().enumerate() {
            assert_eq!(list.len(), 100);
            assert_eq!(list.score_at(0), (c + 1) as f32);
        }
    }

    #[rstest]
    fn test_one_failure_fails_everything() {
        let mut input = rows(6);
        input[3].swap(10, 20);

        let result = build_genome_wide(
            input,
            || ScoredListBuilder::new(ListLayout::Dense, ScorePrecision::Full),
            3,
        );
        assert!(matches!(result, Err(ListBuildError::UnsortedInput { .. })));
    }

    #[rstest]
    fn test_snapshot_round_trip() {
        let lists = build_genome_wide(
            rows(2),
            || ScoredListBuilder::new(ListLayout::Dense, ScorePrecision::Half),
            2,
        )
        .unwrap();

        let mut buffer = Vec::new();
        write_snapshot(&lists, &mut buffer).unwrap();
        let loaded: GenomeWideList<ScoredIntervalList> = read_snapshot(buffer.as_slice()).unwrap();
        assert_eq!(loaded, lists);
        assert_eq!(loaded[1].precision(), ScorePrecision::Half);
    }
}
