//! Lock-striped map used to accumulate relevance from many threads.
//!
//! Keys are spread over `N` shards by `|id| mod N`; each shard is its own
//! `parking_lot::Mutex`. Writers touching different shards never contend, and
//! no global lock is taken on the hot path.

use crate::DocId;
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::BTreeMap;

pub struct ConcurrentMap<V> {
    shards: Vec<Mutex<BTreeMap<DocId, V>>>,
}

impl<V> ConcurrentMap<V> {
    /// Create a map with `shard_count` shards (at least one).
    pub fn new(shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        Self {
            shards: (0..shard_count).map(|_| Mutex::new(BTreeMap::new())).collect(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Shard holding `id`.
    pub fn shard_of(&self, id: DocId) -> usize {
        id.unsigned_abs() as usize % self.shards.len()
    }

    /// Remove `id` under its shard lock. Racing with [`accumulate`] on the
    /// same id is data-race free, but which one lands last is unspecified.
    ///
    /// [`accumulate`]: ConcurrentMap::accumulate
    pub fn erase(&self, id: DocId) -> Option<V> {
        self.shards[self.shard_of(id)].lock().remove(&id)
    }

    /// Merge all shards into one ordered map. Taking `self` guarantees every
    /// worker holding a reference has finished.
    pub fn build_ordinary_map(self) -> BTreeMap<DocId, V> {
        let mut merged = BTreeMap::new();
        for shard in self.shards {
            merged.extend(shard.into_inner());
        }
        merged
    }
}

impl<V: Default> ConcurrentMap<V> {
    /// Lock the shard of `id` and return the value for `id`, inserting
    /// `V::default()` first if needed. The shard stays locked until the guard
    /// is dropped.
    pub fn accumulate(&self, id: DocId) -> MappedMutexGuard<'_, V> {
        let guard = self.shards[self.shard_of(id)].lock();
        MutexGuard::map(guard, |shard| shard.entry(id).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn keys_map_to_shards_by_modulo() {
        let map: ConcurrentMap<f64> = ConcurrentMap::new(4);
        assert_eq!(map.shard_of(0), 0);
        assert_eq!(map.shard_of(5), 1);
        assert_eq!(map.shard_of(-5), 1);
        assert_eq!(ConcurrentMap::<f64>::new(0).shard_count(), 1);
    }

    #[test]
    fn accumulate_and_erase() {
        let map: ConcurrentMap<f64> = ConcurrentMap::new(3);
        *map.accumulate(7) += 1.5;
        *map.accumulate(7) += 0.5;
        *map.accumulate(8) += 1.0;
        assert_eq!(map.erase(8), Some(1.0));
        assert_eq!(map.erase(8), None);
        let merged = map.build_ordinary_map();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[&7], 2.0);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let map: ConcurrentMap<u64> = ConcurrentMap::new(8);
        (0..10_000u64).into_par_iter().for_each(|i| {
            *map.accumulate((i % 100) as DocId) += 1;
        });
        let merged = map.build_ordinary_map();
        assert_eq!(merged.len(), 100);
        assert!(merged.values().all(|&count| count == 100));
    }

    #[test]
    fn erasing_some_ids_keeps_updates_to_others() {
        let map: ConcurrentMap<u64> = ConcurrentMap::new(3);
        for id in (1..200).step_by(2) {
            *map.accumulate(id) += 1;
        }
        (0..20_000u64).into_par_iter().for_each(|i| {
            let id = (i % 200) as DocId;
            if id % 2 == 0 {
                *map.accumulate(id) += 1;
            } else {
                map.erase(id);
            }
        });
        let merged = map.build_ordinary_map();
        assert_eq!(merged.len(), 100);
        assert!(merged.iter().all(|(&id, &count)| id % 2 == 0 && count == 100));
    }

    #[test]
    fn concurrent_erase_and_accumulate_on_same_id_do_not_tear() {
        let map: ConcurrentMap<u64> = ConcurrentMap::new(2);
        std::thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..1_000 {
                    *map.accumulate(1) += 1;
                }
            });
            s.spawn(|| {
                for _ in 0..1_000 {
                    map.erase(1);
                }
            });
        });
        let merged = map.build_ordinary_map();
        assert!(merged.get(&1).map_or(true, |&v| v <= 1_000));
    }
}
