use log::debug;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use ticketpress_traits::SharedImage;
use ticketpress_types::AssetRef;

pub const DEFAULT_CACHE_CAPACITY: usize = 20;

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<AssetRef, SharedImage>,
    /// Insertion order, oldest first.
    order: VecDeque<AssetRef>,
}

/// Decoded images keyed by asset reference.
///
/// Holds at most `capacity` entries. Inserting into a full cache evicts the
/// entry that was inserted first; reads do not refresh an entry's age.
#[derive(Debug)]
pub struct ImageCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl ImageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    // A panic while holding the lock cannot leave the maps inconsistent
    // beyond a missing entry, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, asset: &AssetRef) -> Option<SharedImage> {
        self.lock().entries.get(asset).cloned()
    }

    pub fn contains(&self, asset: &AssetRef) -> bool {
        self.lock().entries.contains_key(asset)
    }

    pub fn insert(&self, asset: AssetRef, image: SharedImage) {
        let mut state = self.lock();
        if state.entries.insert(asset.clone(), image).is_some() {
            return;
        }
        state.order.push_back(asset);
        while state.order.len() > self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.entries.remove(&oldest);
                debug!("Evicted {} from image cache", oldest.display_name());
            }
        }
    }

    pub fn remove(&self, asset: &AssetRef) -> Option<SharedImage> {
        let mut state = self.lock();
        let removed = state.entries.remove(asset);
        if removed.is_some() {
            state.order.retain(|a| a != asset);
        }
        removed
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::sync::Arc;

    fn img() -> SharedImage {
        Arc::new(RgbaImage::new(1, 1))
    }

    #[test]
    fn evicts_oldest_inserted_first() {
        let cache = ImageCache::new(2);
        cache.insert(AssetRef::new("a"), img());
        cache.insert(AssetRef::new("b"), img());
        // Reading `a` does not protect it.
        assert!(cache.get(&AssetRef::new("a")).is_some());
        cache.insert(AssetRef::new("c"), img());

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&AssetRef::new("a")));
        assert!(cache.contains(&AssetRef::new("b")));
        assert!(cache.contains(&AssetRef::new("c")));
    }

    #[test]
    fn reinsert_keeps_original_age() {
        let cache = ImageCache::new(2);
        cache.insert(AssetRef::new("a"), img());
        cache.insert(AssetRef::new("b"), img());
        cache.insert(AssetRef::new("a"), img());
        cache.insert(AssetRef::new("c"), img());
        assert!(!cache.contains(&AssetRef::new("a")));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn remove_and_clear() {
        let cache = ImageCache::default();
        assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
        cache.insert(AssetRef::new("a"), img());
        cache.insert(AssetRef::new("b"), img());
        assert!(cache.remove(&AssetRef::new("a")).is_some());
        assert!(cache.remove(&AssetRef::new("a")).is_none());
        cache.clear();
        assert!(cache.is_empty());
    }
}
