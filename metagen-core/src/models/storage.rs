use serde::{Deserialize, Serialize};

use crate::float16::{f16_to_f32, f32_to_f16};

/// Storage precision of the scores of an interval list.
///
/// This is a memory/precision trade-off chosen by the caller: `Half` stores
/// every score as an IEEE 754 binary16 value (2 bytes), `Full` as an `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorePrecision {
    Half,
    #[default]
    Full,
}

/// Physical layout of an interval list.
///
/// * `Dense` - contiguous stop positions, gaps are stored as zero-score windows
/// * `Sparse` - independent start/stop arrays, gaps are not stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListLayout {
    #[default]
    Dense,
    Sparse,
}

/// Score column of an interval list, encoded per [`ScorePrecision`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoreStore {
    Half(Vec<u16>),
    Full(Vec<f32>),
}

impl ScoreStore {
    pub fn new(precision: ScorePrecision) -> Self {
        Self::with_capacity(precision, 0)
    }

    pub fn with_capacity(precision: ScorePrecision, capacity: usize) -> Self {
        match precision {
            ScorePrecision::Half => ScoreStore::Half(Vec::with_capacity(capacity)),
            ScorePrecision::Full => ScoreStore::Full(Vec::with_capacity(capacity)),
        }
    }

    pub fn precision(&self) -> ScorePrecision {
        match self {
            ScoreStore::Half(_) => ScorePrecision::Half,
            ScoreStore::Full(_) => ScorePrecision::Full,
        }
    }

    #[inline]
    pub fn push(&mut self, score: f32) {
        match self {
            ScoreStore::Half(scores) => scores.push(f32_to_f16(score)),
            ScoreStore::Full(scores) => scores.push(score),
        }
    }

    /// Decoded score at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        match self {
            ScoreStore::Half(scores) => f16_to_f32(scores[index]),
            ScoreStore::Full(scores) => scores[index],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ScoreStore::Half(scores) => scores.len(),
            ScoreStore::Full(scores) => scores.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shrink_to_fit(&mut self) {
        match self {
            ScoreStore::Half(scores) => scores.shrink_to_fit(),
            ScoreStore::Full(scores) => scores.shrink_to_fit(),
        }
    }

    /// Decode every score into a new vector.
    pub fn to_vec(&self) -> Vec<f32> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(ScorePrecision::Half)]
    #[case(ScorePrecision::Full)]
    fn test_exact_scores_survive_either_precision(#[case] precision: ScorePrecision) {
        let mut store = ScoreStore::new(precision);
        for score in [5.0, 0.0, 2.0, -1.5, 0.25] {
            store.push(score);
        }
        assert_eq!(store.precision(), precision);
        assert_eq!(store.to_vec(), vec![5.0, 0.0, 2.0, -1.5, 0.25]);
    }

    #[rstest]
    fn test_half_precision_rounds() {
        let mut store = ScoreStore::new(ScorePrecision::Half);
        store.push(0.1);
        let decoded = store.get(0);
        assert!((decoded - 0.1).abs() < 1e-4);
        assert_ne!(decoded, 0.1);
    }
}
