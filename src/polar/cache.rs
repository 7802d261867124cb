//! Least-recently-used cache of bin maps keyed by their full geometry.
//!
//! Bin maps are immutable once built and handed out as `Arc<BinMap>`, so
//! readers never hold the lock while using one. On a miss the lock is released
//! while the map is built; two callers racing on the same geometry may both
//! build it, and the first one to publish wins.
use super::bins::{build_bin_map, BinMap, PolarGeometry};
use crate::error::ScaleError;
use log::debug;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug)]
pub struct BinMapCache {
    capacity: usize,
    /// Most recently used entry at the back.
    entries: Mutex<VecDeque<(PolarGeometry, Arc<BinMap>)>>,
}

impl Default for BinMapCache {
    /// Single-entry cache: replace on miss.
    fn default() -> Self {
        Self::new(1)
    }
}

impl BinMapCache {
    /// Cache holding at most `capacity` bin maps (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Whether a map for `geometry` is currently cached (does not touch recency).
    pub fn contains(&self, geometry: &PolarGeometry) -> bool {
        self.lock().iter().any(|(g, _)| g == geometry)
    }

    /// Return the cached map for `geometry`, building and publishing it on a miss.
    pub fn get_or_build(&self, geometry: PolarGeometry) -> Result<Arc<BinMap>, ScaleError> {
        if let Some(map) = self.touch(&geometry) {
            debug!("BinMapCache hit {:?}", geometry);
            return Ok(map);
        }

        let built = Arc::new(build_bin_map(geometry)?);

        let mut entries = self.lock();
        // Another caller may have published the same geometry while we were building.
        if let Some(pos) = entries.iter().position(|(g, _)| *g == geometry) {
            if let Some(entry) = entries.remove(pos) {
                let map = Arc::clone(&entry.1);
                entries.push_back(entry);
                return Ok(map);
            }
        }
        entries.push_back((geometry, Arc::clone(&built)));
        while entries.len() > self.capacity {
            if let Some((evicted, _)) = entries.pop_front() {
                debug!("BinMapCache evict {:?}", evicted);
            }
        }
        Ok(built)
    }

    fn touch(&self, geometry: &PolarGeometry) -> Option<Arc<BinMap>> {
        let mut entries = self.lock();
        let pos = entries.iter().position(|(g, _)| g == geometry)?;
        let entry = entries.remove(pos)?;
        let map = Arc::clone(&entry.1);
        entries.push_back(entry);
        Some(map)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<(PolarGeometry, Arc<BinMap>)>> {
        // Entries are only ever replaced whole, so a poisoned list is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_geometry_reuses_map() {
        let cache = BinMapCache::default();
        let g = PolarGeometry::new(32, 32, 2, 16, 24);
        let a = cache.get_or_build(g).expect("valid geometry");
        let b = cache.get_or_build(g).expect("valid geometry");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn single_entry_cache_replaces_on_miss() {
        let cache = BinMapCache::default();
        let g1 = PolarGeometry::new(32, 32, 2, 16, 24);
        let g2 = PolarGeometry::new(32, 32, 3, 16, 24);
        cache.get_or_build(g1).expect("valid geometry");
        cache.get_or_build(g2).expect("valid geometry");
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&g2));
        assert!(!cache.contains(&g1));
    }

    #[test]
    fn lru_evicts_least_recently_used() {
        let cache = BinMapCache::new(2);
        let g1 = PolarGeometry::new(32, 32, 2, 16, 24);
        let g2 = PolarGeometry::new(32, 32, 3, 16, 24);
        let g3 = PolarGeometry::new(32, 32, 4, 16, 24);
        cache.get_or_build(g1).expect("valid geometry");
        cache.get_or_build(g2).expect("valid geometry");
        cache.get_or_build(g1).expect("valid geometry");
        cache.get_or_build(g3).expect("valid geometry");
        assert!(cache.contains(&g1));
        assert!(!cache.contains(&g2));
        assert!(cache.contains(&g3));
    }

    #[test]
    fn invalid_geometry_is_not_cached() {
        let cache = BinMapCache::default();
        assert!(cache.get_or_build(PolarGeometry::new(32, 32, 16, 16, 8)).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let cache = Arc::new(BinMapCache::default());
        let g = PolarGeometry::new(48, 48, 2, 24, 32);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get_or_build(g).map(|m| m.radial_bins()))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().expect("thread finished").expect("valid geometry"), 22);
        }
        assert_eq!(cache.len(), 1);
    }
}
