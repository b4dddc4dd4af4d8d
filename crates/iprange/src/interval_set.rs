//! The immutable, query-only interval table.
//!
//! # Invariants
//!
//! An `IntervalSet` maintains at all times:
//! - **Sorted**: intervals are in strictly ascending order of `lo`
//! - **Disjoint**: no interval's `hi` exceeds the next interval's `lo`
//!
//! Together these mean the first interval whose `hi` is above an address is
//! the only one that can contain it, so a query is one lower-bound search
//! plus one comparison.

use std::net::{IpAddr, Ipv4Addr};
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::{Error, Interval};

/// Sorted, disjoint IPv4 intervals answering membership queries in
/// `O(log n)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Interval>", try_from = "Vec<Interval>")]
pub struct IntervalSet(Vec<Interval>);

impl IntervalSet {
    /// Takes ownership of an already normalized interval list.
    ///
    /// ## Errors
    /// - A neighbour pair that is not strictly ascending by `lo`, or that
    ///   overlaps (`UnsortedInput`)
    pub fn build(intervals: Vec<Interval>) -> Result<Self, Error> {
        if let Some(index) = intervals
            .windows(2)
            .position(|pair| pair[0].lo() >= pair[1].lo() || pair[0].hi() > pair[1].lo())
        {
            return Err(Error::UnsortedInput {
                index: index + 1,
                previous: intervals[index],
                next: intervals[index + 1],
            });
        }

        Ok(Self(intervals))
    }

    /// Returns `true` if `address` falls inside any interval.
    ///
    /// Lower bound boundaries are inclusive and upper bounds exclusive, so
    /// `contains(lo)` holds while `contains(hi)` does not.
    pub fn contains(&self, address: u32) -> bool {
        let index = self.0.partition_point(|interval| interval.hi() <= address);
        self.0
            .get(index)
            .is_some_and(|interval| address >= interval.lo())
    }

    /// Returns `true` if the IPv4 address falls inside any interval.
    pub fn contains_v4(&self, address: Ipv4Addr) -> bool {
        self.contains(u32::from(address))
    }

    /// Classifies a raw 4-byte big-endian (network order) address.
    ///
    /// ## Errors
    /// - Any slice whose length is not 4, including raw IPv6 addresses
    ///   (`InvalidAddressLength`)
    pub fn contains_octets(&self, octets: &[u8]) -> Result<bool, Error> {
        let octets: [u8; 4] = octets
            .try_into()
            .map_err(|_| Error::InvalidAddressLength(octets.len()))?;
        Ok(self.contains(u32::from_be_bytes(octets)))
    }

    /// Classifies an IPv4 address, or an IPv6 address that is an IPv4-mapped
    /// address (`::ffff:a.b.c.d`).
    ///
    /// ## Errors
    /// - Any other IPv6 address (`UnsupportedAddress`)
    pub fn contains_ip(&self, address: IpAddr) -> Result<bool, Error> {
        match address {
            IpAddr::V4(v4) => Ok(self.contains_v4(v4)),
            IpAddr::V6(v6) => v6
                .to_ipv4_mapped()
                .map(|v4| self.contains_v4(v4))
                .ok_or(Error::UnsupportedAddress(address)),
        }
    }

    /// Returns the interval containing `address`, if any.
    pub fn find(&self, address: u32) -> Option<&Interval> {
        let index = self.0.partition_point(|interval| interval.hi() <= address);
        self.0.get(index).filter(|interval| address >= interval.lo())
    }

    /// Total number of addresses covered by the set.
    pub fn address_count(&self) -> u64 {
        self.0.iter().map(|interval| interval.len() as u64).sum()
    }

    /// Returns the number of intervals in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set holds no intervals.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the intervals in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.0.iter()
    }

    /// Read-only view of the backing intervals.
    pub fn as_slice(&self) -> &[Interval] {
        &self.0
    }
}

impl Index<usize> for IntervalSet {
    type Output = Interval;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for IntervalSet {
    type Item = Interval;
    type IntoIter = std::vec::IntoIter<Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a IntervalSet {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl TryFrom<Vec<Interval>> for IntervalSet {
    type Error = Error;

    fn try_from(intervals: Vec<Interval>) -> Result<Self, Self::Error> {
        Self::build(intervals)
    }
}

impl From<IntervalSet> for Vec<Interval> {
    fn from(set: IntervalSet) -> Self {
        set.0
    }
}
