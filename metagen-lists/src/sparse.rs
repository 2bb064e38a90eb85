use serde::{Deserialize, Serialize};

use metagen_core::models::{ScorePrecision, ScoreStore, ScoredInterval};

use crate::errors::ListBuildError;
use crate::view::{IntervalView, ListViewBuilder, check_interval};

/// Isolated intervals stored as independent start, stop and score columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseIntervalList {
    starts: Vec<u32>,
    stops: Vec<u32>,
    scores: ScoreStore,
}

impl SparseIntervalList {
    pub fn starts(&self) -> &[u32] {
        &self.starts
    }

    pub fn stops(&self) -> &[u32] {
        &self.stops
    }

    pub fn scores(&self) -> &ScoreStore {
        &self.scores
    }

    pub fn precision(&self) -> ScorePrecision {
        self.scores.precision()
    }
}

impl IntervalView for SparseIntervalList {
    #[inline]
    fn len(&self) -> usize {
        self.starts.len()
    }

    #[inline]
    fn start_at(&self, index: usize) -> u32 {
        self.starts[index]
    }

    #[inline]
    fn stop_at(&self, index: usize) -> u32 {
        self.stops[index]
    }

    #[inline]
    fn score_at(&self, index: usize) -> f32 {
        self.scores.get(index)
    }
}

/// Builder of a [`SparseIntervalList`], storing its input verbatim.
#[derive(Debug)]
pub struct SparseListBuilder {
    state: Option<SparseIntervalList>,
}

impl SparseListBuilder {
    pub fn new(precision: ScorePrecision) -> Self {
        SparseListBuilder {
            state: Some(SparseIntervalList {
                starts: Vec::new(),
                stops: Vec::new(),
                scores: ScoreStore::new(precision),
            }),
        }
    }
}

impl ListViewBuilder for SparseListBuilder {
    type Element = ScoredInterval;
    type View = SparseIntervalList;

    fn add_element_to_build(&mut self, interval: ScoredInterval) -> Result<(), ListBuildError> {
        let list = self.state.as_mut().ok_or(ListBuildError::AlreadyBuilt)?;
        check_interval(&interval, list.starts.last().copied())?;
        if let Some(&previous_stop) = list.stops.last() {
            if interval.start < previous_stop {
                return Err(ListBuildError::OverlappingInput {
                    previous_stop,
                    start: interval.start,
                });
            }
        }

        list.starts.push(interval.start);
        list.stops.push(interval.stop);
        list.scores.push(interval.score);
        Ok(())
    }

    fn get_list_view(&mut self) -> Result<SparseIntervalList, ListBuildError> {
        let mut list = self.state.take().ok_or(ListBuildError::AlreadyBuilt)?;
        list.starts.shrink_to_fit();
        list.stops.shrink_to_fit();
        list.scores.shrink_to_fit();
        Ok(list)
    }
}
