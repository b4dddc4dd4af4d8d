//! Top-level error type for the iprange library

use std::net::IpAddr;

use crate::Interval;

/// Errors raised while building an interval table or validating a query.
///
/// The first three variants are construction-time failures and mean the
/// source data cannot be trusted as a whole. The last two are precondition
/// violations on the query surface; [`crate::IntervalSet::contains`] itself
/// never fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A produced interval was empty or inverted.
    #[error("invalid address range [{lo}, {hi}): the start must be below the end")]
    InvalidRange {
        /// The inclusive lower bound of the offending range.
        lo: u32,
        /// The exclusive upper bound of the offending range.
        hi: u64,
    },

    /// The exclusive end of a range does not fit in the 32-bit address space.
    #[error("address range starting at {start} with length {len} overflows the IPv4 address space")]
    Overflow {
        /// The first address of the range.
        start: u32,
        /// The number of addresses the record asked for.
        len: u64,
    },

    /// The intervals handed to the set were not sorted by their lower bound
    /// or two neighbours overlap.
    #[error("intervals are not sorted and disjoint at index {index}: {previous} followed by {next}")]
    UnsortedInput {
        /// Index of the second interval of the offending pair.
        index: usize,
        /// The interval preceding `next`.
        previous: Interval,
        /// The interval that broke the ordering.
        next: Interval,
    },

    /// The raw address handed to the query surface was not four bytes long.
    #[error("expected a 4-byte IPv4 address, got {0} bytes")]
    InvalidAddressLength(usize),

    /// Only IPv4 (and IPv4-mapped IPv6) addresses can be classified.
    #[error("unsupported address {0}: only IPv4 addresses can be classified")]
    UnsupportedAddress(IpAddr),
}
