//! Conversion of raw allocation records into sorted intervals.
//!
//! Records arrive in whatever order the upstream feed produced them, may
//! repeat, may overlap and may belong to other countries. The [`Normalizer`]
//! filters them by country, converts each one into an [`Interval`], sorts the
//! result and removes duplicates. With [`OverlapPolicy::Merge`] it also folds
//! overlapping and adjacent intervals together, which is what makes the output
//! safe to hand to [`crate::IntervalSet::build`] for untrusted feeds.

use tracing::debug;

use crate::{Error, Interval};

/// How far a record reaches from its start address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    /// The record covers `size` addresses, `[start, start + size)`.
    Size(u32),
    /// The record covers up to and including this address.
    EndInclusive(u32),
}

/// A raw range descriptor as read from an allocation feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRange {
    /// The first address of the range.
    pub start: u32,
    /// The extent of the range.
    pub extent: Extent,
    /// The country code the feed attributes this range to, if it says.
    pub country: Option<String>,
}

impl RawRange {
    /// An untagged `start size` record. Untagged records are trusted to
    /// belong to the target country.
    pub fn sized(start: u32, size: u32) -> Self {
        Self {
            start,
            extent: Extent::Size(size),
            country: None,
        }
    }

    /// A `start,end,country` record with an inclusive end address.
    pub fn tagged(start: u32, end_inclusive: u32, country: impl Into<String>) -> Self {
        Self {
            start,
            extent: Extent::EndInclusive(end_inclusive),
            country: Some(country.into()),
        }
    }

    /// Attaches a country tag to the record.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Converts the record into its half-open interval.
    pub fn to_interval(&self) -> Result<Interval, Error> {
        match self.extent {
            Extent::Size(size) => Interval::from_size(self.start, size),
            Extent::EndInclusive(end) => Interval::from_inclusive(self.start, end),
        }
    }
}

impl From<Interval> for RawRange {
    fn from(interval: Interval) -> Self {
        Self::sized(interval.lo(), interval.len())
    }
}

/// What the normalizer does with intervals that overlap or touch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Keep overlapping intervals as they are. The feed is trusted to be
    /// disjoint; exact duplicates are still removed.
    #[default]
    Preserve,
    /// Fold every interval starting at or before the end of the current one
    /// into it, so the output is always disjoint and maximally compact.
    Merge,
}

/// Turns raw records into the sorted interval list an
/// [`IntervalSet`](crate::IntervalSet) is built from.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    country: Option<String>,
    overlap: OverlapPolicy,
}

impl Normalizer {
    /// A normalizer with no country filter which preserves overlaps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only tagged records attributed to exactly `country`. Untagged
    /// records are always kept.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Sets how overlapping intervals are treated.
    pub fn with_overlap_policy(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    /// The target country, if any.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// The configured overlap policy.
    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.overlap
    }

    /// Returns `true` if the record survives the country filter.
    pub fn accepts(&self, record: &RawRange) -> bool {
        match (&self.country, &record.country) {
            (Some(target), Some(tag)) => tag == target,
            _ => true,
        }
    }

    /// Filters, converts, sorts and deduplicates the records, merging them
    /// when the policy says so.
    ///
    /// Records rejected by the country filter are dropped before conversion,
    /// so malformed ranges of other countries never fail the run.
    ///
    /// ## Errors
    /// - A zero-sized or inverted record (`InvalidRange`)
    /// - A record reaching past the 32-bit address space (`Overflow`)
    pub fn normalize<I>(&self, records: I) -> Result<Vec<Interval>, Error>
    where
        I: IntoIterator<Item = RawRange>,
    {
        let mut dropped = 0usize;
        let mut intervals = Vec::new();
        for record in records {
            if !self.accepts(&record) {
                dropped += 1;
                continue;
            }
            intervals.push(record.to_interval()?);
        }

        let accepted = intervals.len();
        intervals.sort_unstable();
        intervals.dedup();

        if self.overlap == OverlapPolicy::Merge {
            intervals = merge_sorted(intervals);
        }

        debug!(
            accepted,
            dropped,
            intervals = intervals.len(),
            overlap = ?self.overlap,
            "normalized address ranges"
        );

        Ok(intervals)
    }
}

/// Folds touching neighbours of a sorted list into single intervals.
fn merge_sorted(intervals: Vec<Interval>) -> Vec<Interval> {
    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for next in intervals {
        match merged.last_mut() {
            Some(current) if current.touches(&next) => *current = current.hull(&next),
            _ => merged.push(next),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use test_case::test_case;

    fn pairs(intervals: &[Interval]) -> Vec<(u32, u32)> {
        intervals.iter().map(|i| (i.lo(), i.hi())).collect()
    }

    #[test]
    fn test_csv_rows_filtered_by_country() {
        let records = vec![
            RawRange::tagged(100, 199, "CN"),
            RawRange::tagged(500, 599, "US"),
        ];

        let intervals = Normalizer::new().with_country("CN").normalize(records).unwrap();

        assert_eq!(pairs(&intervals), vec![(100, 200)]);
    }

    #[test]
    fn test_country_match_is_exact() {
        let records = vec![
            RawRange::tagged(1, 9, "cn"),
            RawRange::tagged(100, 199, "CN"),
        ];

        let intervals = Normalizer::new().with_country("CN").normalize(records).unwrap();

        assert_eq!(pairs(&intervals), vec![(100, 200)]);
    }

    #[test]
    fn test_sized_records_are_never_filtered() {
        let records = vec![RawRange::sized(300, 100), RawRange::sized(100, 100)];

        let intervals = Normalizer::new().with_country("CN").normalize(records).unwrap();

        assert_eq!(pairs(&intervals), vec![(100, 200), (300, 400)]);
    }

    #[test]
    fn test_tagged_sized_records_are_filtered() {
        let records = vec![
            RawRange::sized(100, 100).with_country("CN"),
            RawRange::sized(300, 100).with_country("JP"),
        ];

        let intervals = Normalizer::new().with_country("CN").normalize(records).unwrap();

        assert_eq!(pairs(&intervals), vec![(100, 200)]);
    }

    #[test]
    fn test_no_country_keeps_everything() {
        let records = vec![
            RawRange::tagged(100, 199, "CN"),
            RawRange::tagged(500, 599, "US"),
        ];

        let intervals = Normalizer::new().normalize(records).unwrap();

        assert_eq!(pairs(&intervals), vec![(100, 200), (500, 600)]);
    }

    #[test]
    fn test_dropped_records_are_not_validated() {
        // The last IPv4 block of another country would overflow if converted.
        let records = vec![
            RawRange::tagged(100, 199, "CN"),
            RawRange::tagged(0xFFFF_FF00, u32::MAX, "-"),
        ];

        let intervals = Normalizer::new().with_country("CN").normalize(records).unwrap();

        assert_eq!(pairs(&intervals), vec![(100, 200)]);
    }

    #[test]
    fn test_sorted_by_lo_then_hi() {
        let records = vec![
            RawRange::sized(500, 10),
            RawRange::sized(100, 50),
            RawRange::sized(100, 20),
        ];

        let intervals = Normalizer::new().normalize(records).unwrap();

        assert_eq!(pairs(&intervals), vec![(100, 120), (100, 150), (500, 510)]);
    }

    #[test]
    fn test_duplicates_removed_without_merging() {
        let records = vec![
            RawRange::sized(100, 100),
            RawRange::sized(100, 100),
            RawRange::tagged(100, 199, "CN"),
        ];

        let intervals = Normalizer::new().normalize(records).unwrap();

        assert_eq!(pairs(&intervals), vec![(100, 200)]);
    }

    #[test_case(&[(100, 200), (150, 250)] => vec![(100, 250)]; "overlapping")]
    #[test_case(&[(100, 200), (200, 300)] => vec![(100, 300)]; "adjacent")]
    #[test_case(&[(100, 400), (150, 250)] => vec![(100, 400)]; "nested")]
    #[test_case(&[(100, 200), (201, 300)] => vec![(100, 200), (201, 300)]; "gap kept")]
    #[test_case(&[(300, 400), (100, 200), (150, 350)] => vec![(100, 400)]; "chain out of order")]
    fn test_merge(input: &[(u32, u32)]) -> Vec<(u32, u32)> {
        let records = input
            .iter()
            .map(|&(lo, hi)| RawRange::sized(lo, hi - lo));

        let intervals = Normalizer::new()
            .with_overlap_policy(OverlapPolicy::Merge)
            .normalize(records)
            .unwrap();

        pairs(&intervals)
    }

    #[test]
    fn test_preserve_keeps_overlaps() {
        let records = vec![RawRange::sized(100, 100), RawRange::sized(150, 100)];

        let intervals = Normalizer::new().normalize(records).unwrap();

        assert_eq!(pairs(&intervals), vec![(100, 200), (150, 250)]);
    }

    #[test]
    fn test_zero_size_is_invalid() {
        let records = vec![RawRange::sized(100, 100), RawRange::sized(300, 0)];

        assert_matches!(
            Normalizer::new().normalize(records),
            Err(Error::InvalidRange { lo: 300, hi: 300 })
        );
    }

    #[test]
    fn test_inverted_row_is_invalid() {
        let records = vec![RawRange::tagged(599, 500, "CN")];

        assert_matches!(
            Normalizer::new().with_country("CN").normalize(records),
            Err(Error::InvalidRange { lo: 599, .. })
        );
    }

    #[test]
    fn test_overflow_is_fatal() {
        let records = vec![RawRange::sized(u32::MAX - 10, 100)];

        assert_matches!(
            Normalizer::new().normalize(records),
            Err(Error::Overflow { len: 100, .. })
        );
    }

    #[test]
    fn test_empty_input() {
        let intervals = Normalizer::new()
            .with_overlap_policy(OverlapPolicy::Merge)
            .normalize(Vec::new())
            .unwrap();
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_normalized_input_is_unchanged() {
        let normalized = vec![
            Interval::new(100, 200).unwrap(),
            Interval::new(300, 400).unwrap(),
            Interval::new(1000, 1001).unwrap(),
        ];

        for policy in [OverlapPolicy::Preserve, OverlapPolicy::Merge] {
            let again = Normalizer::new()
                .with_overlap_policy(policy)
                .normalize(normalized.iter().copied().map(RawRange::from))
                .unwrap();
            assert_eq!(again, normalized);
        }
    }
}
