use std::ops::Range;

use serde::{Deserialize, Serialize};

use metagen_core::models::{ListLayout, ScorePrecision, ScoredInterval};
use metagen_core::search::SearchKey;

use crate::dense::{DenseIntervalList, DenseListBuilder};
use crate::errors::ListBuildError;
use crate::sparse::{SparseIntervalList, SparseListBuilder};
use crate::view::{IntervalView, ListViewBuilder};

///
/// A scored interval list in the layout picked at construction.
///
/// Searches dispatch on the layout once and then run the monomorphized search
/// of the concrete list; only single element accessors branch per call.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoredIntervalList {
    Dense(DenseIntervalList),
    Sparse(SparseIntervalList),
}

impl ScoredIntervalList {
    pub fn layout(&self) -> ListLayout {
        match self {
            ScoredIntervalList::Dense(_) => ListLayout::Dense,
            ScoredIntervalList::Sparse(_) => ListLayout::Sparse,
        }
    }

    pub fn precision(&self) -> ScorePrecision {
        match self {
            ScoredIntervalList::Dense(list) => list.precision(),
            ScoredIntervalList::Sparse(list) => list.precision(),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $list:ident => $body:expr) => {
        match $self {
            ScoredIntervalList::Dense($list) => $body,
            ScoredIntervalList::Sparse($list) => $body,
        }
    };
}

impl IntervalView for ScoredIntervalList {
    fn len(&self) -> usize {
        dispatch!(self, list => list.len())
    }

    fn start_at(&self, index: usize) -> u32 {
        dispatch!(self, list => list.start_at(index))
    }

    fn stop_at(&self, index: usize) -> u32 {
        dispatch!(self, list => list.stop_at(index))
    }

    fn score_at(&self, index: usize) -> f32 {
        dispatch!(self, list => list.score_at(index))
    }

    fn get(&self, index: usize) -> Option<ScoredInterval> {
        dispatch!(self, list => list.get(index))
    }

    fn search(&self, position: u32, key: SearchKey) -> Option<usize> {
        dispatch!(self, list => list.search(position, key))
    }

    fn index_at(&self, position: u32) -> Option<usize> {
        dispatch!(self, list => list.index_at(position))
    }

    fn intervals_in_window(&self, start: u32, stop: u32) -> Range<usize> {
        dispatch!(self, list => list.intervals_in_window(start, stop))
    }
}

/// Builder of a [`ScoredIntervalList`] in a given layout.
#[derive(Debug)]
pub enum ScoredListBuilder {
    Dense(DenseListBuilder),
    Sparse(SparseListBuilder),
}

impl ScoredListBuilder {
    pub fn new(layout: ListLayout, precision: ScorePrecision) -> Self {
        match layout {
            ListLayout::Dense => ScoredListBuilder::Dense(DenseListBuilder::new(precision)),
            ListLayout::Sparse => ScoredListBuilder::Sparse(SparseListBuilder::new(precision)),
        }
    }
}

impl ListViewBuilder for ScoredListBuilder {
    type Element = ScoredInterval;
    type View = ScoredIntervalList;

    fn add_element_to_build(&mut self, interval: ScoredInterval) -> Result<(), ListBuildError> {
        match self {
            ScoredListBuilder::Dense(builder) => builder.add_element_to_build(interval),
            ScoredListBuilder::Sparse(builder) => builder.add_element_to_build(interval),
        }
    }

    fn get_list_view(&mut self) -> Result<ScoredIntervalList, ListBuildError> {
        Ok(match self {
            ScoredListBuilder::Dense(builder) => ScoredIntervalList::Dense(builder.get_list_view()?),
            ScoredListBuilder::Sparse(builder) => ScoredIntervalList::Sparse(builder.get_list_view()?),
        })
    }
}
