//! Path cache with time-to-live expiry and hit-count eviction.

use std::collections::HashMap;

use game_core::Position;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Path;

/// One cached search result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathCacheEntry {
    pub start: Position,
    pub end: Position,
    pub path: Path,
    pub created_at: u64,
    pub hits: u32,
    /// Insertion order; newer entries win eviction ties.
    pub seq: u64,
}

impl PathCacheEntry {
    fn is_expired(&self, now: u64, timeout_ms: u64) -> bool {
        now.saturating_sub(self.created_at) >= timeout_ms
    }
}

/// Plain export of a [`PathCache`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathCacheSnapshot {
    /// Entries in insertion order.
    pub entries: Vec<PathCacheEntry>,
    pub next_seq: u64,
}

/// Search results keyed by `(start, end)`.
///
/// When an insert finds the cache full, expired entries are purged first.
/// If that does not free a slot, only the most-hit entries are kept (a
/// `keep_ratio` share, newer first on equal hits).
#[derive(Clone, Debug)]
pub struct PathCache {
    entries: HashMap<(Position, Position), PathCacheEntry>,
    max_size: usize,
    timeout_ms: u64,
    keep_ratio: f32,
    next_seq: u64,
}

impl PathCache {
    pub fn new(max_size: usize, timeout_ms: u64, keep_ratio: f32) -> Self {
        Self {
            entries: HashMap::new(),
            max_size,
            timeout_ms,
            keep_ratio: keep_ratio.clamp(0.0, 1.0),
            next_seq: 0,
        }
    }

    /// Returns a live entry's path and counts the hit.
    ///
    /// An expired entry is dropped and reported as a miss.
    pub fn lookup(&mut self, start: Position, end: Position, now: u64) -> Option<Path> {
        let key = (start, end);
        let entry = self.entries.get_mut(&key)?;
        if entry.is_expired(now, self.timeout_ms) {
            self.entries.remove(&key);
            return None;
        }
        entry.hits = entry.hits.saturating_add(1);
        Some(entry.path.clone())
    }

    /// Stores a fresh result, making room first if the cache is full.
    pub fn insert(&mut self, start: Position, end: Position, path: Path, now: u64) {
        if self.max_size == 0 {
            return;
        }

        let key = (start, end);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            self.purge_expired(now);
            if self.entries.len() >= self.max_size {
                let keep = ((self.entries.len() as f32 * self.keep_ratio) as usize)
                    .min(self.max_size - 1);
                self.retain_most_hit(keep);
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key,
            PathCacheEntry {
                start,
                end,
                path,
                created_at: now,
                hits: 0,
                seq,
            },
        );
    }

    /// Purges expired entries and trims the cache back to capacity.
    pub fn maintain(&mut self, now: u64) {
        self.purge_expired(now);
        if self.entries.len() > self.max_size {
            self.retain_most_hit(self.max_size);
        }
    }

    /// Drops the entry for `(start, end)`; returns whether one existed.
    pub fn invalidate(&mut self, start: Position, end: Position) -> bool {
        self.entries.remove(&(start, end)).is_some()
    }

    pub fn get(&self, start: Position, end: Position) -> Option<&PathCacheEntry> {
        self.entries.get(&(start, end))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn snapshot(&self) -> PathCacheSnapshot {
        let mut entries: Vec<_> = self.entries.values().cloned().collect();
        entries.sort_by_key(|e| e.seq);
        PathCacheSnapshot {
            entries,
            next_seq: self.next_seq,
        }
    }

    /// Replaces the contents with `snapshot`, then trims to capacity.
    pub fn restore(&mut self, snapshot: PathCacheSnapshot) {
        self.entries = snapshot
            .entries
            .into_iter()
            .map(|e| ((e.start, e.end), e))
            .collect();
        self.next_seq = snapshot
            .next_seq
            .max(self.entries.values().map(|e| e.seq + 1).max().unwrap_or(0));
        if self.entries.len() > self.max_size {
            self.retain_most_hit(self.max_size);
        }
    }

    fn purge_expired(&mut self, now: u64) {
        let before = self.entries.len();
        let timeout = self.timeout_ms;
        self.entries.retain(|_, e| !e.is_expired(now, timeout));
        let purged = before - self.entries.len();
        if purged > 0 {
            debug!(target: "npc_ai::pathfinding", purged, "expired cached paths");
        }
    }

    fn retain_most_hit(&mut self, keep: usize) {
        let mut ranked: Vec<_> = self
            .entries
            .values()
            .map(|e| (e.hits, e.seq, (e.start, e.end)))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

        let evicted = ranked.len().saturating_sub(keep);
        for (_, _, key) in ranked.into_iter().skip(keep) {
            self.entries.remove(&key);
        }
        debug!(target: "npc_ai::pathfinding", evicted, kept = self.entries.len(), "evicted least-hit paths");
    }
}
