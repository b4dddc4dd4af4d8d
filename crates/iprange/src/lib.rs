#![deny(missing_docs)]

//! # IPRange: Country Address Range Membership
//!
//! `iprange` turns raw, unordered country allocation records into a sorted,
//! disjoint table of half-open IPv4 intervals and answers "is this address
//! inside the table" with a single binary search.
//!
//! ## Usage Example
//!
//! ```
//! use iprange::{IntervalSet, Normalizer, OverlapPolicy, RawRange};
//!
//! let records = vec![
//!     RawRange::tagged(100, 199, "CN"),
//!     RawRange::tagged(500, 599, "US"),
//!     RawRange::tagged(200, 299, "CN"),
//! ];
//!
//! let intervals = Normalizer::new()
//!     .with_country("CN")
//!     .with_overlap_policy(OverlapPolicy::Merge)
//!     .normalize(records)
//!     .unwrap();
//!
//! let set = IntervalSet::build(intervals).unwrap();
//! assert!(set.contains(250));
//! assert!(!set.contains(550));
//! ```
//!
//! ## Architecture
//!
//! * **RawRange**: A single source record, either size based or end inclusive
//! * **Normalizer**: Filters, converts, sorts and (optionally) merges records
//! * **Interval**: A validated `[lo, hi)` range of addresses
//! * **IntervalSet**: The immutable, query-only table
//! * **SharedIntervalSet**: A swappable handle for refreshing a live table

mod error;
mod interval;
mod interval_set;
mod normalizer;
mod shared;


pub use error::Error;

pub use interval::Interval;

pub use interval_set::IntervalSet;

pub use normalizer::Extent;
pub use normalizer::Normalizer;
pub use normalizer::OverlapPolicy;
pub use normalizer::RawRange;

pub use shared::SharedIntervalSet;
