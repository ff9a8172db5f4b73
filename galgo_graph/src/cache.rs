use std::collections::HashSet;
use std::collections::hash_map::Entry as MapEntry;

use log::debug;
use rustc_hash::FxHashMap;

use crate::ContentKey;

/// Hit/miss counters, mostly so tests can prove what was recomputed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

struct Entry<T> {
    key: ContentKey,
    /// `None` records "this input parsed to nothing": the memo still holds,
    /// and one irrelevant or broken file never affects its neighbours.
    value: Option<T>,
}

/// Per-file memo keyed by path. A value is recomputed only when the file's
/// content key differs from the memoized one.
pub struct FileCache<T> {
    entries: FxHashMap<String, Entry<T>>,
    stats: CacheStats,
}

impl<T> Default for FileCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FileCache<T> {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            stats: CacheStats::default(),
        }
    }

    /// Memoized update for one file snapshot. Returns `true` when the value
    /// was (re)computed, `false` on a cache hit.
    pub fn update_with(
        &mut self,
        path: &str,
        text: &str,
        compute: impl FnOnce(&str, &str) -> Option<T>,
    ) -> bool {
        let key = ContentKey::of_text(text);
        if let Some(entry) = self.entries.get(path) {
            if entry.key == key {
                self.stats.hits += 1;
                return false;
            }
        }
        self.stats.misses += 1;
        debug!("recomputing {path} ({key:?})");
        let value = compute(path, text);
        self.entries.insert(path.to_string(), Entry { key, value });
        true
    }

    /// True when the memo for `path` already matches `key`, whether the
    /// memoized value is present or empty. Lets callers split a snapshot
    /// set into hit and miss halves before computing anything.
    pub fn is_current(&self, path: &str, key: ContentKey) -> bool {
        self.entries.get(path).is_some_and(|e| e.key == key)
    }

    /// Drops memos for files that no longer exist.
    pub fn retain_paths(&mut self, live: &HashSet<String>) {
        self.entries.retain(|path, _| live.contains(path));
    }

    /// Memoized values with their paths, in path order. Iterating in sorted
    /// order keeps every downstream aggregate independent of arrival order.
    pub fn snapshot(&self) -> Vec<(&str, &T)> {
        let mut items: Vec<(&str, &T)> = self
            .entries
            .iter()
            .filter_map(|(path, e)| e.value.as_ref().map(|v| (path.as_str(), v)))
            .collect();
        items.sort_by(|a, b| a.0.cmp(b.0));
        items
    }

    /// Content key of one file's memo, if present and non-empty.
    pub fn key_of(&self, path: &str) -> Option<ContentKey> {
        let entry = self.entries.get(path)?;
        entry.value.as_ref()?;
        Some(entry.key)
    }

    /// Combined key over the retained value set; changes exactly when
    /// membership or member content changes.
    pub fn combined_key(&self) -> ContentKey {
        ContentKey::combine(
            self.entries
                .iter()
                .filter(|(_, e)| e.value.is_some())
                .map(|(path, e)| (path.as_str(), e.key)),
        )
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

/// Pair-level memo for join results, keyed by the match key. Each pair is
/// revalidated against the combined content key of its two sides, so a
/// change to one side invalidates only the pairs it participates in.
pub struct JoinMemo<V> {
    pairs: FxHashMap<String, (ContentKey, V)>,
    stats: CacheStats,
}

impl<V> Default for JoinMemo<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> JoinMemo<V> {
    pub fn new() -> Self {
        Self {
            pairs: FxHashMap::default(),
            stats: CacheStats::default(),
        }
    }

    /// Fresh pairs are built without touching the counters; only
    /// revalidations of a known pair count as a hit or miss.
    pub fn get_or_insert_with(
        &mut self,
        match_key: &str,
        pair_key: ContentKey,
        build: impl FnOnce() -> V,
    ) -> &V {
        match self.pairs.entry(match_key.to_string()) {
            MapEntry::Occupied(entry) => {
                let slot = entry.into_mut();
                if slot.0 != pair_key {
                    self.stats.misses += 1;
                    *slot = (pair_key, build());
                } else {
                    self.stats.hits += 1;
                }
                &slot.1
            }
            MapEntry::Vacant(entry) => &entry.insert((pair_key, build())).1,
        }
    }

    /// Drops pairs whose match key is no longer produced by either side.
    pub fn retain_keys(&mut self, live: &HashSet<String>) {
        self.pairs.retain(|key, _| live.contains(key));
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_cache_recomputes_only_on_content_change() {
        let mut cache: FileCache<usize> = FileCache::new();

        assert!(cache.update_with("a.tscn", "one", |_, t| Some(t.len())));
        assert!(!cache.update_with("a.tscn", "one", |_, _| panic!("must stay memoized")));
        assert!(cache.update_with("a.tscn", "three", |_, t| Some(t.len())));

        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 2 });
    }

    #[test]
    fn file_cache_holds_empty_results() {
        let mut cache: FileCache<usize> = FileCache::new();
        cache.update_with("broken.tscn", "???", |_, _| None);
        // Still memoized: same content must not be re-parsed.
        assert!(!cache.update_with("broken.tscn", "???", |_, _| panic!("memo lost")));
        assert!(cache.snapshot().is_empty());
    }

    #[test]
    fn file_cache_snapshot_is_sorted_by_path() {
        let mut cache: FileCache<&'static str> = FileCache::new();
        cache.update_with("b.tscn", "x", |_, _| Some("b"));
        cache.update_with("a.tscn", "y", |_, _| Some("a"));

        let paths: Vec<&str> = cache.snapshot().iter().map(|(p, _)| *p).collect();
        assert_eq!(paths, vec!["a.tscn", "b.tscn"]);
    }

    #[test]
    fn file_cache_combined_key_tracks_membership() {
        let mut cache: FileCache<usize> = FileCache::new();
        cache.update_with("a.tscn", "x", |_, t| Some(t.len()));
        let one = cache.combined_key();

        cache.update_with("b.tscn", "y", |_, t| Some(t.len()));
        let two = cache.combined_key();
        assert_ne!(one, two);

        cache.retain_paths(&HashSet::from(["a.tscn".to_string()]));
        assert_eq!(cache.combined_key(), one);
    }

    #[test]
    fn join_memo_builds_fresh_pairs_without_counting() {
        let mut memo: JoinMemo<u32> = JoinMemo::new();
        let key = ContentKey::of_text("k");

        assert_eq!(*memo.get_or_insert_with("a", key, || 1), 1);
        assert_eq!(*memo.get_or_insert_with("b", key, || 2), 2);
        assert_eq!(memo.stats(), CacheStats::default());

        assert_eq!(*memo.get_or_insert_with("a", key, || unreachable!()), 1);
        assert_eq!(memo.stats(), CacheStats { hits: 1, misses: 0 });
    }

    #[test]
    fn join_memo_invalidates_single_pair() {
        let mut memo: JoinMemo<String> = JoinMemo::new();
        let left = ContentKey::of_text("left");
        let right_a = ContentKey::of_text("a");
        let right_b = ContentKey::of_text("b");

        memo.get_or_insert_with("Music", left.pair(right_a), || "first".to_string());
        let hit = memo.get_or_insert_with("Music", left.pair(right_a), || unreachable!());
        assert_eq!(hit, "first");

        let rebuilt = memo.get_or_insert_with("Music", left.pair(right_b), || "second".to_string());
        assert_eq!(rebuilt, "second");
        assert_eq!(memo.stats(), CacheStats { hits: 1, misses: 1 });
    }
}
