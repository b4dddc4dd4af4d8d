//! Half-open IPv4 address intervals.
//!
//! # Invariants
//!
//! An `Interval` always satisfies `lo < hi`. The range is half-open, so `lo`
//! is the first address inside the interval and `hi` the first address past
//! it. Because `hi` is a `u32`, the very last IPv4 address (255.255.255.255)
//! cannot be covered; records reaching it are rejected as an overflow.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A non-empty `[lo, hi)` range of IPv4 addresses in host integer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "(u32, u32)", try_from = "(u32, u32)")]
pub struct Interval {
    // Field order matters: the derived `Ord` sorts by `lo`, then `hi`.
    lo: u32,
    hi: u32,
}

impl Interval {
    /// Creates an interval from its inclusive lower and exclusive upper bound.
    ///
    /// ## Errors
    /// - `lo >= hi` (`InvalidRange`)
    pub fn new(lo: u32, hi: u32) -> Result<Self, Error> {
        if lo >= hi {
            return Err(Error::InvalidRange { lo, hi: hi as u64 });
        }
        Ok(Self { lo, hi })
    }

    /// Creates the interval `[start, start + size)`.
    ///
    /// ## Errors
    /// - A zero `size` (`InvalidRange`)
    /// - `start + size` does not fit in `u32` (`Overflow`)
    pub fn from_size(start: u32, size: u32) -> Result<Self, Error> {
        let hi = start.checked_add(size).ok_or(Error::Overflow {
            start,
            len: size as u64,
        })?;
        Self::new(start, hi)
    }

    /// Creates the interval `[start, end_inclusive + 1)`.
    ///
    /// ## Errors
    /// - `end_inclusive < start` (`InvalidRange`)
    /// - `end_inclusive` is the last IPv4 address (`Overflow`)
    pub fn from_inclusive(start: u32, end_inclusive: u32) -> Result<Self, Error> {
        if end_inclusive < start {
            return Err(Error::InvalidRange {
                lo: start,
                hi: end_inclusive as u64 + 1,
            });
        }
        let hi = end_inclusive.checked_add(1).ok_or(Error::Overflow {
            start,
            len: (end_inclusive - start) as u64 + 1,
        })?;
        Self::new(start, hi)
    }

    /// The first address inside the interval.
    pub fn lo(&self) -> u32 {
        self.lo
    }

    /// The first address past the interval.
    pub fn hi(&self) -> u32 {
        self.hi
    }

    /// Number of addresses covered. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u32 {
        self.hi - self.lo
    }

    /// Returns `true` if `address` lies in `[lo, hi)`.
    pub fn contains(&self, address: u32) -> bool {
        self.lo <= address && address < self.hi
    }

    /// Returns `true` if the two intervals share at least one address or
    /// touch end to start, i.e. their union is a single interval.
    pub fn touches(&self, other: &Interval) -> bool {
        self.lo <= other.hi && other.lo <= self.hi
    }

    /// The smallest interval covering both `self` and `other`.
    pub fn hull(&self, other: &Interval) -> Interval {
        Interval {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }
}

impl TryFrom<(u32, u32)> for Interval {
    type Error = Error;

    fn try_from((lo, hi): (u32, u32)) -> Result<Self, Self::Error> {
        Self::new(lo, hi)
    }
}

impl From<Interval> for (u32, u32) {
    fn from(interval: Interval) -> Self {
        (interval.lo, interval.hi)
    }
}

/// Formats as `[lo, hi) (first - last)` with the covered addresses dotted.
impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) ({} - {})",
            self.lo,
            self.hi,
            Ipv4Addr::from(self.lo),
            Ipv4Addr::from(self.hi - 1)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use test_case::test_case;

    #[test_case(0, 1; "first address")]
    #[test_case(100, 200; "small range")]
    #[test_case(u32::MAX - 1, u32::MAX; "last representable address")]
    fn test_new_interval(lo: u32, hi: u32) {
        let interval = Interval::new(lo, hi).expect("valid interval");

        assert_eq!(interval.lo(), lo);
        assert_eq!(interval.hi(), hi);
        assert_eq!(interval.len(), hi - lo);
    }

    #[test_case(5, 5; "empty")]
    #[test_case(6, 5; "inverted")]
    fn test_new_interval_rejects_empty(lo: u32, hi: u32) {
        assert_matches!(
            Interval::new(lo, hi),
            Err(Error::InvalidRange { lo: l, hi: h }) if l == lo && h == hi as u64
        );
    }

    #[test]
    fn test_from_size() {
        let interval = Interval::from_size(16777472, 256).unwrap();
        assert_eq!((interval.lo(), interval.hi()), (16777472, 16777728));
    }

    #[test]
    fn test_from_size_zero_is_invalid() {
        assert_matches!(
            Interval::from_size(100, 0),
            Err(Error::InvalidRange { lo: 100, hi: 100 })
        );
    }

    #[test_case(u32::MAX, 1; "single address past the end")]
    #[test_case(0xFFFF_FF00, 256; "block ending exactly at the top")]
    #[test_case(1, u32::MAX; "huge size")]
    fn test_from_size_overflow(start: u32, size: u32) {
        assert_matches!(
            Interval::from_size(start, size),
            Err(Error::Overflow { start: s, len }) if s == start && len == size as u64
        );
    }

    #[test]
    fn test_from_inclusive() {
        let interval = Interval::from_inclusive(100, 199).unwrap();
        assert_eq!((interval.lo(), interval.hi()), (100, 200));

        let single = Interval::from_inclusive(7, 7).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_from_inclusive_inverted() {
        assert_matches!(
            Interval::from_inclusive(200, 100),
            Err(Error::InvalidRange { lo: 200, hi: 101 })
        );
    }

    #[test]
    fn test_from_inclusive_last_address_overflows() {
        assert_matches!(
            Interval::from_inclusive(0xFFFF_FF00, u32::MAX),
            Err(Error::Overflow { start: 0xFFFF_FF00, len: 256 })
        );
    }

    #[test]
    fn test_contains_is_half_open() {
        let interval = Interval::new(100, 200).unwrap();

        assert!(!interval.contains(99));
        assert!(interval.contains(100));
        assert!(interval.contains(199));
        assert!(!interval.contains(200));
    }

    #[test_case((100, 200), (200, 300) => true; "adjacent")]
    #[test_case((100, 200), (150, 300) => true; "overlapping")]
    #[test_case((100, 200), (120, 130) => true; "nested")]
    #[test_case((100, 200), (201, 300) => false; "gap of one address")]
    #[test_case((300, 400), (100, 200) => false; "disjoint reversed")]
    fn test_touches(a: (u32, u32), b: (u32, u32)) -> bool {
        let a = Interval::try_from(a).unwrap();
        let b = Interval::try_from(b).unwrap();
        assert_eq!(a.touches(&b), b.touches(&a));
        a.touches(&b)
    }

    #[test]
    fn test_display() {
        let interval = Interval::new(16777216, 16777472).unwrap();
        assert_eq!(
            interval.to_string(),
            "[16777216, 16777472) (1.0.0.0 - 1.0.0.255)"
        );
    }

    #[test]
    fn test_serde_as_pair() {
        let interval = Interval::new(100, 200).unwrap();
        let json = serde_json::to_string(&interval).unwrap();
        assert_eq!(json, "[100,200]");

        let parsed: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, interval);

        assert!(serde_json::from_str::<Interval>("[200,100]").is_err());
    }
}
