//! Capacity-bounded cluster store with least-recently-used eviction.
//!
//! Recency is a monotonically increasing tick. `entries` owns the records and
//! remembers each one's last tick; `recency` maps ticks back to ids so the
//! oldest entry is always the first key. A touch moves an id to a fresh tick.

use std::collections::{BTreeMap, HashMap};

use crate::cluster::{Cluster, ClusterId};

#[derive(Debug)]
struct Slot {
    cluster: Cluster,
    tick: u64,
}

#[derive(Debug, Default)]
pub struct ClusterStore {
    /// 0 = unbounded
    capacity: usize,
    entries: HashMap<ClusterId, Slot>,
    recency: BTreeMap<u64, ClusterId>,
    tick: u64,
}

impl ClusterStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a live cluster, marking it most recently used.
    pub fn get(&mut self, id: ClusterId) -> Option<&Cluster> {
        self.get_mut(id).map(|cluster| &*cluster)
    }

    pub fn get_mut(&mut self, id: ClusterId) -> Option<&mut Cluster> {
        let tick = self.next_tick();
        let slot = self.entries.get_mut(&id)?;
        self.recency.remove(&slot.tick);
        self.recency.insert(tick, id);
        slot.tick = tick;
        Some(&mut slot.cluster)
    }

    /// Mark a live cluster most recently used. Returns false if absent.
    pub fn touch(&mut self, id: ClusterId) -> bool {
        self.get_mut(id).is_some()
    }

    /// Look up a live cluster without changing its recency.
    pub fn peek(&self, id: ClusterId) -> Option<&Cluster> {
        self.entries.get(&id).map(|slot| &slot.cluster)
    }

    /// Insert or replace a cluster under its own id, marking it most recently
    /// used. Returns the evicted cluster when the store was over capacity.
    pub fn insert(&mut self, cluster: Cluster) -> Option<Cluster> {
        let id = cluster.id();
        let tick = self.next_tick();
        if let Some(old) = self.entries.insert(id, Slot { cluster, tick }) {
            self.recency.remove(&old.tick);
        }
        self.recency.insert(tick, id);

        if self.capacity > 0 && self.entries.len() > self.capacity {
            return self.evict_oldest();
        }
        None
    }

    /// Live clusters from least to most recently used. Does not touch.
    pub fn iter(&self) -> impl Iterator<Item = &Cluster> + '_ {
        self.recency
            .values()
            .filter_map(|id| self.entries.get(id).map(|slot| &slot.cluster))
    }

    fn evict_oldest(&mut self) -> Option<Cluster> {
        let (_, id) = self.recency.pop_first()?;
        self.entries.remove(&id).map(|slot| slot.cluster)
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}
