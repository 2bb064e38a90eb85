use serde::{Deserialize, Serialize};

use crate::search::Positioned;

/// Represent a scored window from [start, stop)
/// Inclusive start, exclusive of stop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredInterval {
    pub start: u32,
    pub stop: u32,
    pub score: f32,
}

impl ScoredInterval {
    pub fn new(start: u32, stop: u32, score: f32) -> Self {
        ScoredInterval { start, stop, score }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.stop.saturating_sub(self.start)
    }

    #[inline]
    pub fn contains(&self, position: u32) -> bool {
        self.start <= position && position < self.stop
    }

    /// Check if the interval overlaps [start, stop)
    #[inline]
    pub fn overlap(&self, start: u32, stop: u32) -> bool {
        self.start < stop && self.stop > start
    }
}

impl Positioned for ScoredInterval {
    #[inline]
    fn start(&self) -> u32 {
        self.start
    }

    #[inline]
    fn stop(&self) -> u32 {
        self.stop
    }
}
