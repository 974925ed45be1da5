//! Bucketed map with one lock per bucket.
//!
//! Keys are routed to a bucket by `key mod bucket_count`, so writers touching
//! keys in different buckets never contend. Merging the buckets back into a
//! single map is only meaningful once every writer has finished: callers join
//! their workers first, or hand the map over by value with
//! [`ConcurrentMap::into_ordinary_map`].

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::BTreeMap;

/// Exclusive access to one value; the owning bucket stays locked while this lives.
pub type Access<'a, V> = MappedMutexGuard<'a, V>;

/// Integer keys that can be routed to a bucket.
pub trait ShardKey: Copy + Ord {
    fn bucket_index(self, bucket_count: usize) -> usize;
}

macro_rules! impl_shard_key {
    ($($t:ty),*) => {
        $(impl ShardKey for $t {
            fn bucket_index(self, bucket_count: usize) -> usize {
                (self as i128).rem_euclid(bucket_count as i128) as usize
            }
        })*
    };
}

impl_shard_key!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

pub struct ConcurrentMap<K, V> {
    buckets: Vec<Mutex<BTreeMap<K, V>>>,
}

impl<K: ShardKey, V> ConcurrentMap<K, V> {
    /// A zero bucket count is raised to one.
    pub fn new(bucket_count: usize) -> Self {
        let buckets = (0..bucket_count.max(1)).map(|_| Mutex::new(BTreeMap::new())).collect();
        Self { buckets }
    }

    pub fn bucket_count(&self) -> usize { self.buckets.len() }

    fn bucket(&self, key: K) -> &Mutex<BTreeMap<K, V>> {
        &self.buckets[key.bucket_index(self.buckets.len())]
    }

    /// Lock the key's bucket and return its value, inserting a default on first access.
    pub fn access(&self, key: K) -> Access<'_, V>
    where
        V: Default,
    {
        MutexGuard::map(self.bucket(key).lock(), |bucket| bucket.entry(key).or_default())
    }

    pub fn erase(&self, key: K) -> Option<V> {
        self.bucket(key).lock().remove(&key)
    }

    /// Merge every bucket into one ordered map, holding one bucket lock at a time.
    pub fn build_ordinary_map(&self) -> BTreeMap<K, V>
    where
        V: Clone,
    {
        let mut result = BTreeMap::new();
        for bucket in &self.buckets {
            let bucket = bucket.lock();
            result.extend(bucket.iter().map(|(key, value)| (*key, value.clone())));
        }
        result
    }

    pub fn into_ordinary_map(self) -> BTreeMap<K, V> {
        self.buckets.into_iter().flat_map(|bucket| bucket.into_inner()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn routes_keys_by_modulo() {
        assert_eq!(7i32.bucket_index(5), 2);
        assert_eq!((-3i32).bucket_index(5), 2);
        assert_eq!(10u64.bucket_index(5), 0);
    }

    #[test]
    fn access_defaults_then_accumulates() {
        let map: ConcurrentMap<i32, f64> = ConcurrentMap::new(3);
        *map.access(4) += 1.5;
        *map.access(4) += 1.0;
        *map.access(1) += 0.5;
        assert_eq!(map.build_ordinary_map(), BTreeMap::from([(1, 0.5), (4, 2.5)]));
    }

    #[test]
    fn erase_removes_only_that_key() {
        let map: ConcurrentMap<i32, u32> = ConcurrentMap::new(2);
        *map.access(1) = 10;
        *map.access(3) = 30;
        assert_eq!(map.erase(1), Some(10));
        assert_eq!(map.erase(1), None);
        assert_eq!(map.into_ordinary_map(), BTreeMap::from([(3, 30)]));
    }

    #[test]
    fn zero_buckets_is_raised_to_one() {
        let map: ConcurrentMap<u32, u32> = ConcurrentMap::new(0);
        assert_eq!(map.bucket_count(), 1);
        *map.access(9) += 1;
        assert_eq!(map.into_ordinary_map()[&9], 1);
    }

    #[test]
    fn parallel_writers_on_shared_keys_do_not_lose_updates() {
        let map: ConcurrentMap<i32, u64> = ConcurrentMap::new(7);
        (0..10_000).into_par_iter().for_each(|i| {
            *map.access(i % 50) += 1;
        });
        let merged = map.into_ordinary_map();
        assert_eq!(merged.len(), 50);
        assert!(merged.values().all(|&count| count == 200));
    }

    #[test]
    fn scoped_threads_erase_while_others_write_other_buckets() {
        let map: ConcurrentMap<u32, u32> = ConcurrentMap::new(2);
        for key in 0..100 {
            *map.access(key) = key;
        }
        std::thread::scope(|s| {
            s.spawn(|| (0..100).step_by(2).for_each(|key| { map.erase(key); }));
            s.spawn(|| (1..100).step_by(2).for_each(|key| *map.access(key) += 1));
        });
        let merged = map.build_ordinary_map();
        assert_eq!(merged.len(), 50);
        assert!(merged.iter().all(|(key, value)| key % 2 == 1 && *value == key + 1));
    }
}
