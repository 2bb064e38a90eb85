use serde::{Deserialize, Serialize};

use metagen_core::models::{ScorePrecision, ScoreStore, ScoredInterval};

use crate::errors::ListBuildError;
use crate::view::{IntervalView, ListViewBuilder, check_interval};

///
/// Contiguous tiling of `[0, last stop)`.
///
/// Only the stop of each interval is stored; its start is the previous stop
/// (0 for the first one). Gaps in the input are stored as zero-score
/// intervals, which keeps the layout at two columns.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseIntervalList {
    stops: Vec<u32>,
    scores: ScoreStore,
}

impl DenseIntervalList {
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

impl IntervalView for DenseIntervalList {
    #[inline]
    fn len(&self) -> usize {
        self.stops.len()
    }

    #[inline]
    fn start_at(&self, index: usize) -> u32 {
        match index {
            0 => 0,
            i => self.stops[i - 1],
        }
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

#[derive(Debug)]
struct DenseState {
    stops: Vec<u32>,
    scores: ScoreStore,
    previous_start: Option<u32>,
}

/// Builder of a [`DenseIntervalList`].
///
/// Zero-score inputs are not stored as such: they become part of the filler
/// synthesized before the next non-zero interval.
#[derive(Debug)]
pub struct DenseListBuilder {
    state: Option<DenseState>,
}

impl DenseListBuilder {
    pub fn new(precision: ScorePrecision) -> Self {
        DenseListBuilder {
            state: Some(DenseState {
                stops: Vec::new(),
                scores: ScoreStore::new(precision),
                previous_start: None,
            }),
        }
    }
}

impl ListViewBuilder for DenseListBuilder {
    type Element = ScoredInterval;
    type View = DenseIntervalList;

    fn add_element_to_build(&mut self, interval: ScoredInterval) -> Result<(), ListBuildError> {
        let state = self.state.as_mut().ok_or(ListBuildError::AlreadyBuilt)?;
        check_interval(&interval, state.previous_start)?;
        state.previous_start = Some(interval.start);

        if interval.score == 0.0 {
            return Ok(());
        }

        let previous_stop = state.stops.last().copied().unwrap_or(0);
        if interval.start < previous_stop {
            return Err(ListBuildError::OverlappingInput {
                previous_stop,
                start: interval.start,
            });
        }
        if interval.start > previous_stop {
            state.stops.push(interval.start);
            state.scores.push(0.0);
        }
        state.stops.push(interval.stop);
        state.scores.push(interval.score);
        Ok(())
    }

    fn get_list_view(&mut self) -> Result<DenseIntervalList, ListBuildError> {
        let mut state = self.state.take().ok_or(ListBuildError::AlreadyBuilt)?;
        state.stops.shrink_to_fit();
        state.scores.shrink_to_fit();
        Ok(DenseIntervalList {
            stops: state.stops,
            scores: state.scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn build(intervals: &[(u32, u32, f32)], precision: ScorePrecision) -> DenseIntervalList {
        let mut builder = DenseListBuilder::new(precision);
        for &(start, stop, score) in intervals {
            builder
                .add_element_to_build(ScoredInterval::new(start, stop, score))
                .unwrap();
        }
        builder.get_list_view().unwrap()
    }

    #[rstest]
    #[case(ScorePrecision::Full)]
    #[case(ScorePrecision::Half)]
    fn test_gap_filler_is_synthesized(#[case] precision: ScorePrecision) {
        let list = build(&[(0, 10, 5.0), (10, 20, 0.0), (25, 30, 2.0)], precision);
        assert_eq!(list.stops(), &[10, 25, 30]);
        assert_eq!(list.scores().to_vec(), vec![5.0, 0.0, 2.0]);
        assert_eq!(list.precision(), precision);
    }

    #[rstest]
    fn test_leading_gap() {
        let list = build(&[(100, 150, 1.0)], ScorePrecision::Full);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0), Some(ScoredInterval::new(0, 100, 0.0)));
        assert_eq!(list.get(1), Some(ScoredInterval::new(100, 150, 1.0)));
        assert_eq!(list.get(2), None);
    }

    #[rstest]
    fn test_tiles_without_gaps() {
        let list = build(
            &[(5, 8, 1.0), (8, 9, 2.0), (20, 30, 0.0), (40, 41, 3.0), (50, 60, 4.0)],
            ScorePrecision::Full,
        );
        let intervals: Vec<ScoredInterval> = list.iter().collect();
        assert_eq!(intervals[0].start, 0);
        for pair in intervals.windows(2) {
            assert_eq!(pair[0].stop, pair[1].start);
            assert!(pair[0].start < pair[0].stop);
        }
        assert_eq!(intervals.last().unwrap().stop, 60);
    }

    #[rstest]
    fn test_position_lookup() {
        let list = build(&[(0, 10, 5.0), (25, 30, 2.0)], ScorePrecision::Full);
        assert_eq!(list.index_at(9), Some(0));
        assert_eq!(list.index_at(10), Some(1));
        assert_eq!(list.score_at_position(12), Some(0.0));
        assert_eq!(list.score_at_position(29), Some(2.0));
        assert_eq!(list.score_at_position(30), None);
        assert_eq!(list.intervals_in_window(8, 26), 0..3);
    }

    #[rstest]
    fn test_builder_is_single_use() {
        let mut builder = DenseListBuilder::new(ScorePrecision::Full);
        builder.add_element_to_build(ScoredInterval::new(0, 1, 1.0)).unwrap();
        builder.get_list_view().unwrap();

        assert_eq!(
            builder.add_element_to_build(ScoredInterval::new(1, 2, 1.0)),
            Err(ListBuildError::AlreadyBuilt)
        );
        assert_eq!(builder.get_list_view(), Err(ListBuildError::AlreadyBuilt));
    }

    #[rstest]
    #[case((10, 20, 1.0), (5, 8, 1.0), ListBuildError::UnsortedInput { previous: 10, start: 5 })]
    #[case((10, 20, 1.0), (15, 25, 1.0), ListBuildError::OverlappingInput { previous_stop: 20, start: 15 })]
    #[case((10, 20, 1.0), (30, 30, 1.0), ListBuildError::InvalidInterval { start: 30, stop: 30 })]
    fn test_invalid_input(
        #[case] first: (u32, u32, f32),
        #[case] second: (u32, u32, f32),
        #[case] expected: ListBuildError,
    ) {
        let mut builder = DenseListBuilder::new(ScorePrecision::Full);
        builder
            .add_element_to_build(ScoredInterval::new(first.0, first.1, first.2))
            .unwrap();
        let result = builder.add_element_to_build(ScoredInterval::new(second.0, second.1, second.2));
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    fn test_empty_list() {
        let list = build(&[], ScorePrecision::Full);
        assert!(list.is_empty());
        assert_eq!(list.search(10, metagen_core::SearchKey::Start), None);
        assert_eq!(list.intervals_in_window(0, 100), 0..0);
    }
}
