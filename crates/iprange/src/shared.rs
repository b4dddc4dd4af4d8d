//! A swappable handle for refreshing a live interval table.

use std::sync::{Arc, RwLock};

use crate::IntervalSet;

/// Shares one immutable [`IntervalSet`] between any number of readers and
/// lets a refresh install a newly built set without touching the old one.
///
/// Readers either query through the handle or take a snapshot with
/// [`SharedIntervalSet::load`]; a snapshot stays valid and unchanged after a
/// [`SharedIntervalSet::replace`].
#[derive(Debug, Clone, Default)]
pub struct SharedIntervalSet {
    current: Arc<RwLock<Arc<IntervalSet>>>,
}

impl SharedIntervalSet {
    /// Wraps an already built set.
    pub fn new(set: IntervalSet) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(set))),
        }
    }

    /// Returns the set currently installed.
    pub fn load(&self) -> Arc<IntervalSet> {
        // We should never fail to acquire a lock from the RwLock so that it panics.
        self.current
            .read()
            .expect("BUG: Failed to acquire read lock")
            .clone()
    }

    /// Installs `set` and returns the one it replaced.
    pub fn replace(&self, set: IntervalSet) -> Arc<IntervalSet> {
        let next = Arc::new(set);
        let mut current = self
            .current
            .write()
            .expect("BUG: Failed to acquire write lock");
        std::mem::replace(&mut *current, next)
    }

    /// Queries the set currently installed.
    pub fn contains(&self, address: u32) -> bool {
        self.load().contains(address)
    }
}

impl From<IntervalSet> for SharedIntervalSet {
    fn from(set: IntervalSet) -> Self {
        Self::new(set)
    }
}
