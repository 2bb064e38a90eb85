use std::ops::Range;

use metagen_core::models::ScoredInterval;
use metagen_core::search::{SearchKey, insertion_point, overlapping_range};

use crate::errors::ListBuildError;

///
/// Read-only, position sorted view over non-overlapping scored intervals.
///
/// Implementors only provide random access to the columns; searches are
/// shared. Generic code over `V: IntervalView` is monomorphized, so the
/// column accessors are inlined into the search loops.
///
pub trait IntervalView {
    fn len(&self) -> usize;

    fn start_at(&self, index: usize) -> u32;

    fn stop_at(&self, index: usize) -> u32;

    fn score_at(&self, index: usize) -> f32;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<ScoredInterval> {
        (index < self.len())
            .then(|| ScoredInterval::new(self.start_at(index), self.stop_at(index), self.score_at(index)))
    }

    /// Insertion point of `position`, see [`insertion_point`].
    fn search(&self, position: u32, key: SearchKey) -> Option<usize> {
        insertion_point(self.len(), position, key, |i| (self.start_at(i), self.stop_at(i)))
    }

    /// Index of the interval containing `position`, if any.
    fn index_at(&self, position: u32) -> Option<usize> {
        self.search(position, SearchKey::Containment)
            .filter(|&i| self.start_at(i) <= position && position < self.stop_at(i))
    }

    fn score_at_position(&self, position: u32) -> Option<f32> {
        self.index_at(position).map(|i| self.score_at(i))
    }

    /// Index range of the intervals overlapping `[start, stop)`.
    fn intervals_in_window(&self, start: u32, stop: u32) -> Range<usize> {
        overlapping_range(self.len(), start, stop, |i| (self.start_at(i), self.stop_at(i)))
    }

    fn iter(&self) -> IntervalIter<'_, Self>
    where
        Self: Sized,
    {
        IntervalIter {
            view: self,
            range: 0..self.len(),
        }
    }

    fn window_iter(&self, start: u32, stop: u32) -> IntervalIter<'_, Self>
    where
        Self: Sized,
    {
        IntervalIter {
            view: self,
            range: self.intervals_in_window(start, stop),
        }
    }
}

/// Iterator over a range of a view. Each consumer owns its own cursor.
pub struct IntervalIter<'a, V> {
    view: &'a V,
    range: Range<usize>,
}

impl<V: IntervalView> Iterator for IntervalIter<'_, V> {
    type Item = ScoredInterval;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.range.next()?;
        self.view.get(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<V: IntervalView> DoubleEndedIterator for IntervalIter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = self.range.next_back()?;
        self.view.get(index)
    }
}

impl<V: IntervalView> ExactSizeIterator for IntervalIter<'_, V> {}

///
/// Single-use builder of an immutable list.
///
/// Elements are added in order, then [`ListViewBuilder::get_list_view`]
/// freezes the list. Any call after that fails with
/// [`ListBuildError::AlreadyBuilt`].
///
pub trait ListViewBuilder {
    type Element;
    type View;

    fn add_element_to_build(&mut self, element: Self::Element) -> Result<(), ListBuildError>;

    fn get_list_view(&mut self) -> Result<Self::View, ListBuildError>;
}

/// Ordering checks shared by the interval builders.
pub(crate) fn check_interval(interval: &ScoredInterval, previous_start: Option<u32>) -> Result<(), ListBuildError> {
    if interval.start >= interval.stop {
        return Err(ListBuildError::InvalidInterval {
            start: interval.start,
            stop: interval.stop,
        });
    }
    match previous_start {
        Some(previous) if interval.start < previous => Err(ListBuildError::UnsortedInput {
            previous,
            start: interval.start,
        }),
        _ => Ok(()),
    }
}
