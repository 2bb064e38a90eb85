//! Dichotomic "insertion point" search shared by every positional list.
//!
//! The search returns the index of an exact match or, when there is none,
//! the index of the first element after the target. The search bracket is
//! `[0, len - 1]` and the result is whatever index the bracket collapses on,
//! so a target after the last element yields the last index. Callers rely on
//! that: window lookups subtract one from a stop search to get an inclusive
//! upper bound and check the element they land on.
use std::cmp::Ordering;
use std::ops::Range;

/// Anything with a half-open `[start, stop)` extent.
pub trait Positioned {
    fn start(&self) -> u32;
    fn stop(&self) -> u32;
}

/// Which key of an element the target is compared to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    /// Exact match on the start position.
    Start,
    /// Exact match on the (exclusive) stop position.
    Stop,
    /// Match when `start <= target < stop`.
    Containment,
}

impl SearchKey {
    /// Where the target lies relative to the element.
    #[inline]
    fn locate(self, target: u32, start: u32, stop: u32) -> Ordering {
        match self {
            SearchKey::Start => target.cmp(&start),
            SearchKey::Stop => target.cmp(&stop),
            SearchKey::Containment => {
                if target < start {
                    Ordering::Less
                } else if target >= stop {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            }
        }
    }
}

///
/// Insertion point search over `len` sorted elements.
///
/// # Arguments
/// - len: number of elements
/// - target: the searched position
/// - key: what the target is compared to
/// - bounds: returns the `(start, stop)` of the element at an index
///
/// # Returns
/// - `None` when `len == 0`, the insertion point otherwise
///
#[inline]
pub fn insertion_point<F>(len: usize, target: u32, key: SearchKey, bounds: F) -> Option<usize>
where
    F: Fn(usize) -> (u32, u32),
{
    if len == 0 {
        return None;
    }

    let mut low = 0;
    let mut high = len - 1;
    while low != high {
        let middle = low + (high - low) / 2;
        let (start, stop) = bounds(middle);
        match key.locate(target, start, stop) {
            Ordering::Equal => return Some(middle),
            Ordering::Greater => low = middle + 1,
            Ordering::Less => high = middle,
        }
    }

    Some(low)
}

/// [`insertion_point`] over a slice of [`Positioned`] elements.
pub fn search_slice<T: Positioned>(items: &[T], target: u32, key: SearchKey) -> Option<usize> {
    insertion_point(items.len(), target, key, |i| (items[i].start(), items[i].stop()))
}

///
/// Index range of the elements overlapping `[start, stop)`.
///
/// Elements must be sorted and non-overlapping. Built on two insertion
/// point searches: containment of `start` and containment of `stop - 1`.
///
pub fn overlapping_range<F>(len: usize, start: u32, stop: u32, bounds: F) -> Range<usize>
where
    F: Fn(usize) -> (u32, u32),
{
    if start >= stop {
        return 0..0;
    }

    let Some(first) = insertion_point(len, start, SearchKey::Containment, &bounds) else {
        return 0..0;
    };
    let Some(last) = insertion_point(len, stop - 1, SearchKey::Containment, &bounds) else {
        return 0..0;
    };

    // both searches may land on the last element when the window is past it
    let first = if bounds(first).1 <= start { first + 1 } else { first };
    let end = if bounds(last).0 >= stop { last } else { last + 1 };

    if first >= end { first..first } else { first..end }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::models::ScoredInterval;

    #[fixture]
    fn windows() -> Vec<ScoredInterval> {
        vec![
            ScoredInterval::new(10, 20, 1.0),
            ScoredInterval::new(30, 40, 2.0),
            ScoredInterval::new(40, 45, 3.0),
            ScoredInterval::new(60, 70, 4.0),
        ]
    }

    #[rstest]
    #[case(10, Some(0))]
    #[case(30, Some(1))]
    #[case(60, Some(3))]
    // no exact match: first start greater than the target
    #[case(0, Some(0))]
    #[case(25, Some(1))]
    #[case(41, Some(3))]
    // past the last element: the bracket collapses on the last index
    #[case(100, Some(3))]
    fn test_start_search(windows: Vec<ScoredInterval>, #[case] target: u32, #[case] expected: Option<usize>) {
        assert_eq!(search_slice(&windows, target, SearchKey::Start), expected);
    }

    #[rstest]
    #[case(20, Some(0))]
    #[case(45, Some(2))]
    #[case(21, Some(1))]
    #[case(44, Some(2))]
    fn test_stop_search(windows: Vec<ScoredInterval>, #[case] target: u32, #[case] expected: Option<usize>) {
        assert_eq!(search_slice(&windows, target, SearchKey::Stop), expected);
    }

    #[rstest]
    #[case(10, Some(0))]
    #[case(19, Some(0))]
    #[case(20, Some(1))]
    #[case(39, Some(1))]
    #[case(40, Some(2))]
    #[case(50, Some(3))]
    #[case(5, Some(0))]
    #[case(69, Some(3))]
    #[case(70, Some(3))]
    fn test_containment_search(
        windows: Vec<ScoredInterval>,
        #[case] target: u32,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(search_slice(&windows, target, SearchKey::Containment), expected);
    }

    #[rstest]
    fn test_empty_list_has_no_insertion_point() {
        let empty: Vec<ScoredInterval> = vec![];
        assert_eq!(search_slice(&empty, 10, SearchKey::Start), None);
        assert_eq!(search_slice(&empty, 10, SearchKey::Containment), None);
    }

    #[rstest]
    fn test_single_element_always_returned() {
        let single = vec![ScoredInterval::new(10, 20, 1.0)];
        for target in [0, 10, 15, 20, 1000] {
            assert_eq!(search_slice(&single, target, SearchKey::Containment), Some(0));
        }
    }

    #[rstest]
    #[case(0, 5, 0..0)]
    #[case(0, 11, 0..1)]
    #[case(15, 35, 0..2)]
    #[case(20, 30, 1..1)]
    #[case(39, 61, 1..4)]
    #[case(45, 60, 3..3)]
    #[case(70, 80, 4..4)]
    #[case(0, 100, 0..4)]
    #[case(35, 35, 0..0)]
    fn test_overlapping_range(
        windows: Vec<ScoredInterval>,
        #[case] start: u32,
        #[case] stop: u32,
        #[case] expected: Range<usize>,
    ) {
        let range = overlapping_range(windows.len(), start, stop, |i| (windows[i].start, windows[i].stop));
        assert_eq!(range, expected);
        for (i, w) in windows.iter().enumerate() {
            assert_eq!(range.contains(&i), w.overlap(start, stop), "element {i}");
        }
    }
}
