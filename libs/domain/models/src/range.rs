use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// An inclusive range of consecutive block heights, the atomic unit of work
/// assignment and acknowledgement.
///
/// Serializes to and parses from the string form `"from-to"` used as the
/// list payload in the coordination store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRange {
    from: u64,
    to: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("range is inverted: from {from} > to {to}")]
    Inverted { from: u64, to: u64 },
    #[error("malformed range string: {0:?}")]
    Malformed(String),
}

impl BlockRange {
    /// Builds a range, rejecting `from > to`.
    pub fn new(from: u64, to: u64) -> Result<Self, RangeError> {
        if from > to {
            return Err(RangeError::Inverted { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> u64 {
        self.from
    }

    pub fn to(&self) -> u64 {
        self.to
    }

    pub fn len(&self) -> u64 {
        self.to - self.from + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Heights covered by this range, inclusive on both ends.
    pub fn heights(&self) -> impl Iterator<Item = u64> {
        self.from..=self.to
    }

    /// Splits `[start, target]` into consecutive ranges of at most
    /// `batch_size` heights each. Returns an empty vec when `start > target`.
    pub fn batches(start: u64, target: u64, batch_size: u64) -> Vec<Self> {
        assert!(batch_size > 0, "batch_size must be positive");
        if start > target {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut from = start;
        while from <= target {
            let to = (from + batch_size - 1).min(target);
            out.push(Self { from, to });
            from = to + 1;
        }
        out
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl FromStr for BlockRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from_str, to_str) = s
            .split_once('-')
            .ok_or_else(|| RangeError::Malformed(s.to_string()))?;
        let from: u64 = from_str
            .parse()
            .map_err(|_| RangeError::Malformed(s.to_string()))?;
        let to: u64 = to_str
            .parse()
            .map_err(|_| RangeError::Malformed(s.to_string()))?;
        Self::new(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_from_dash_to() {
        let r = BlockRange::new(100, 109).unwrap();
        assert_eq!(r.to_string(), "100-109");
    }

    #[test]
    fn round_trips_through_string() {
        let r = BlockRange::new(5, 5).unwrap();
        let parsed: BlockRange = r.to_string().parse().unwrap();
        assert_eq!(r, parsed);
    }

    #[test]
    fn rejects_inverted_range() {
        assert_eq!(
            BlockRange::new(10, 5),
            Err(RangeError::Inverted { from: 10, to: 5 })
        );
    }

    #[test]
    fn batches_split_on_boundaries() {
        let batches = BlockRange::batches(100, 109, 5);
        assert_eq!(
            batches,
            vec![
                BlockRange::new(100, 104).unwrap(),
                BlockRange::new(105, 109).unwrap(),
            ]
        );
    }

    #[test]
    fn batches_cover_a_partial_final_chunk() {
        let batches = BlockRange::batches(0, 7, 5);
        assert_eq!(
            batches,
            vec![
                BlockRange::new(0, 4).unwrap(),
                BlockRange::new(5, 7).unwrap(),
            ]
        );
    }

    #[test]
    fn single_block_range_is_valid() {
        let r = BlockRange::new(42, 42).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r.heights().collect::<Vec<_>>(), vec![42]);
    }

    #[test]
    fn empty_window_produces_no_batches() {
        assert!(BlockRange::batches(10, 5, 20).is_empty());
    }
}
