//! Per-tick perception records and the merged perceived-entity view.

use bitflags::bitflags;
use game_core::{EntityId, EntityInfo, Position};
use serde::{Deserialize, Serialize};

/// Sense through which something was perceived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PerceptionChannel {
    Vision,
    Hearing,
}

bitflags! {
    /// Set of channels an entity was perceived through this tick.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Senses: u8 {
        const VISION = 1 << 0;
        const HEARING = 1 << 1;
    }
}

impl From<PerceptionChannel> for Senses {
    fn from(channel: PerceptionChannel) -> Self {
        match channel {
            PerceptionChannel::Vision => Senses::VISION,
            PerceptionChannel::Hearing => Senses::HEARING,
        }
    }
}

/// A single sensation, rebuilt every perception pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerceptionRecord {
    pub channel: PerceptionChannel,
    pub source: EntityId,
    pub target: EntityId,
    pub position: Position,
    /// 1.0 at the observer, falling linearly to 0.0 at the edge of range.
    pub intensity: f32,
    pub timestamp: u64,
}

/// Everything the observer knows about one entity this tick, all channels merged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerceivedEntity {
    pub id: EntityId,
    pub position: Position,
    pub distance: f32,
    pub senses: Senses,
    /// Strongest intensity over all channels.
    pub intensity: f32,
    pub hostile: bool,
    pub is_player: bool,
    pub armed: bool,
}

impl PerceivedEntity {
    pub(crate) fn new(info: &EntityInfo, distance: f32, channel: PerceptionChannel, intensity: f32) -> Self {
        Self {
            id: info.id,
            position: info.position,
            distance,
            senses: channel.into(),
            intensity,
            hostile: info.hostile,
            is_player: info.is_player,
            armed: info.armed,
        }
    }

    /// Folds another channel's sensation of the same entity into this one.
    pub(crate) fn merge(&mut self, channel: PerceptionChannel, intensity: f32) {
        self.senses |= channel.into();
        self.intensity = self.intensity.max(intensity);
    }

    pub fn is_seen(&self) -> bool {
        self.senses.contains(Senses::VISION)
    }

    pub fn is_heard(&self) -> bool {
        self.senses.contains(Senses::HEARING)
    }
}

/// Linear falloff from 1.0 at distance 0 to 0.0 at `range`.
pub(crate) fn falloff(distance: f32, range: f32) -> f32 {
    if range <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / range).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_unions_channels_and_keeps_max_intensity() {
        let info = EntityInfo::new(EntityId(3), Position::new(2, 0, 0));
        let mut perceived = PerceivedEntity::new(&info, 2.0, PerceptionChannel::Vision, 0.8);
        perceived.merge(PerceptionChannel::Hearing, 0.6);

        assert!(perceived.is_seen());
        assert!(perceived.is_heard());
        assert_eq!(perceived.intensity, 0.8);
    }

    #[test]
    fn falloff_is_linear() {
        assert_eq!(falloff(0.0, 10.0), 1.0);
        assert_eq!(falloff(5.0, 10.0), 0.5);
        assert_eq!(falloff(10.0, 10.0), 0.0);
        assert_eq!(falloff(3.0, 0.0), 0.0);
    }
}
