use ahash::AHashMap;
use compact_str::CompactString;
use smallvec::SmallVec;
use tracing::debug;

/// Reference counts for icon paths held by menu entries.
///
/// The surfaces themselves live in an external image cache; this table only
/// decides when a path is no longer used by any entry. Paths whose count
/// reaches zero are queued in `evicted` until the owner of the image cache
/// drains them.
#[derive(Debug, Default)]
pub struct IconCache {
    counts: AHashMap<CompactString, usize>,
    evicted: SmallVec<[CompactString; 4]>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more user of `path`. Empty paths are ignored.
    pub fn acquire(&mut self, path: &str) {
        if path.is_empty() {
            return;
        }
        *self.counts.entry(path.into()).or_insert(0) += 1;
    }

    /// Drop one user of `path`. Returns true when this was the last one.
    pub fn release(&mut self, path: &str) -> bool {
        let Some(count) = self.counts.get_mut(path) else {
            return false;
        };

        *count -= 1;
        if *count > 0 {
            return false;
        }

        self.counts.remove(path);
        debug!("Icon no longer referenced: {}", path);
        self.evicted.push(path.into());
        true
    }

    pub fn ref_count(&self, path: &str) -> usize {
        self.counts.get(path).copied().unwrap_or(0)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.counts.contains_key(path)
    }

    /// Paths released since the last call
    pub fn take_evicted(&mut self) -> SmallVec<[CompactString; 4]> {
        std::mem::take(&mut self.evicted)
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.evicted.clear();
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_only_at_zero() {
        let mut cache = IconCache::new();
        cache.acquire("icons/emu.png");
        cache.acquire("icons/emu.png");

        assert!(!cache.release("icons/emu.png"));
        assert_eq!(cache.ref_count("icons/emu.png"), 1);
        assert!(cache.take_evicted().is_empty());

        assert!(cache.release("icons/emu.png"));
        assert!(!cache.contains("icons/emu.png"));
        let evicted = cache.take_evicted();
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0], "icons/emu.png");
        assert!(cache.take_evicted().is_empty());
    }

    #[test]
    fn test_unknown_and_empty_paths() {
        let mut cache = IconCache::new();
        cache.acquire("");
        assert!(cache.is_empty());
        assert!(!cache.release("missing.png"));
    }
}
