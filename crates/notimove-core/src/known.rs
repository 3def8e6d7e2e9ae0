//! Bounded record of window ids the discovery loop has already handled.

use std::collections::HashMap;

use crate::platform::WindowId;

/// Window ids already handled, each stamped with the last pass it was enumerated in.
///
/// An id still present in the enumeration is refreshed every pass and so is never
/// evicted. Ids absent for more than `retain` passes are dropped.
#[derive(Debug, Clone)]
pub struct KnownWindows {
    last_seen: HashMap<WindowId, u64>,
    pass: u64,
    retain: u64,
}

impl KnownWindows {
    /// Empty set evicting ids unseen for more than `retain` passes.
    pub fn new(retain: u64) -> Self {
        Self {
            last_seen: HashMap::new(),
            pass: 0,
            retain,
        }
    }

    /// Replace the contents with `ids`, the windows visible when scanning starts.
    pub fn seed(&mut self, ids: impl IntoIterator<Item = WindowId>) {
        self.last_seen.clear();
        let pass = self.pass;
        self.last_seen.extend(ids.into_iter().map(|id| (id, pass)));
    }

    /// Start a new pass over the currently `visible` ids: refresh the ones we know and
    /// evict the ones gone for too long.
    pub fn begin_pass(&mut self, visible: impl IntoIterator<Item = WindowId>) {
        self.pass += 1;
        let pass = self.pass;
        for id in visible {
            if let Some(seen) = self.last_seen.get_mut(&id) {
                *seen = pass;
            }
        }
        let retain = self.retain;
        self.last_seen.retain(|_, seen| pass - *seen <= retain);
    }

    /// True when `id` has been handled.
    pub fn contains(&self, id: WindowId) -> bool {
        self.last_seen.contains_key(&id)
    }

    /// Mark `id` handled in the current pass.
    pub fn insert(&mut self, id: WindowId) {
        self.last_seen.insert(id, self.pass);
    }

    /// Number of remembered ids.
    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    /// True when nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }

    /// Change the eviction horizon.
    pub fn set_retain(&mut self, retain: u64) {
        self.retain = retain;
    }
}
