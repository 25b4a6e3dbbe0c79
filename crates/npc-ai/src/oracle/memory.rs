//! Decaying memories of previously perceived entities.

use game_core::{EntityId, Position};
use serde::{Deserialize, Serialize};

use super::PerceptionChannel;

/// What the agent remembers about one target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub target: EntityId,
    pub last_position: Position,
    pub channel: PerceptionChannel,
    /// When the target was last perceived.
    pub timestamp: u64,
    /// 1.0 when refreshed, decays linearly towards 0.0.
    pub confidence: f32,
    pub importance: f32,
}

impl MemoryEntry {
    pub fn new(
        target: EntityId,
        last_position: Position,
        channel: PerceptionChannel,
        timestamp: u64,
        importance: f32,
    ) -> Self {
        Self {
            target,
            last_position,
            channel,
            timestamp,
            confidence: 1.0,
            importance,
        }
    }

    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }
}

/// Memories keyed by target, one entry per target, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryBank {
    entries: Vec<MemoryEntry>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or refreshes the memory of `entry.target`.
    pub fn remember(&mut self, entry: MemoryEntry) {
        match self.entries.iter_mut().find(|m| m.target == entry.target) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Lowers every confidence by `rate * elapsed_ms` and drops entries whose
    /// age reached `retention_ms`.
    ///
    /// Returns how many entries were purged.
    pub fn decay(&mut self, now: u64, elapsed_ms: u64, rate: f32, retention_ms: u64) -> usize {
        let loss = rate * elapsed_ms as f32;
        for entry in &mut self.entries {
            entry.confidence = (entry.confidence - loss).max(0.0);
        }

        let before = self.entries.len();
        self.entries.retain(|entry| entry.age(now) < retention_ms);
        before - self.entries.len()
    }

    pub fn get(&self, target: EntityId) -> Option<&MemoryEntry> {
        self.entries.iter().find(|m| m.target == target)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.entries.iter()
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
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f32 = 1.0 / 60_000.0;
    const RETENTION: u64 = 60_000;

    fn entry(target: u32, timestamp: u64) -> MemoryEntry {
        MemoryEntry::new(
            EntityId(target),
            Position::ORIGIN,
            PerceptionChannel::Vision,
            timestamp,
            1.0,
        )
    }

    #[test]
    fn remember_refreshes_in_place() {
        let mut bank = MemoryBank::new();
        bank.remember(entry(1, 0));
        bank.remember(entry(2, 0));
        bank.remember(MemoryEntry {
            last_position: Position::new(4, 4, 0),
            ..entry(1, 500)
        });

        assert_eq!(bank.len(), 2);
        let first = bank.iter().next().unwrap();
        assert_eq!(first.target, EntityId(1));
        assert_eq!(first.timestamp, 500);
        assert_eq!(first.last_position, Position::new(4, 4, 0));
    }

    #[test]
    fn confidence_decays_monotonically_then_purges() {
        let mut bank = MemoryBank::new();
        bank.remember(entry(1, 0));

        let mut last = 1.0;
        let mut now = 0;
        for step in [1_000, 5_000, 20_000, 30_000] {
            now += step;
            bank.decay(now, step, RATE, RETENTION);
            let confidence = bank.get(EntityId(1)).unwrap().confidence;
            assert!(confidence <= last);
            last = confidence;
        }

        now += 3_999;
        assert_eq!(bank.decay(now, 3_999, RATE, RETENTION), 0);
        assert_eq!(bank.decay(RETENTION, 1, RATE, RETENTION), 1);
        assert!(bank.is_empty());
    }
}
