//! JSON round trips of the world-side value types (`serde` feature).
#![cfg(feature = "serde")]

use game_core::{
    Actor, EntityId, EntityInfo, MapBounds, Needs, Position, SurvivalNeedsProvider, SurvivalStats,
};
use serde::{Serialize, de::DeserializeOwned};

fn round_trip<T>(value: &T) -> T
where
    T: Serialize + DeserializeOwned,
{
    let json = serde_json::to_string(value).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn positions_and_bounds() {
    let position = Position::new(-3, 17, 2);
    assert_eq!(round_trip(&position), position);

    let bounds = MapBounds::new(40, 24, -2, 3);
    assert_eq!(round_trip(&bounds), bounds);
    assert_eq!(round_trip(&MapBounds::default()), MapBounds::default());
}

#[test]
fn need_flags() {
    let needs = Needs::THIRSTY | Needs::DEHYDRATED | Needs::TIRED;
    let back = round_trip(&needs);
    assert_eq!(back, needs);
    assert!(back.is_critical());
    assert_eq!(round_trip(&Needs::empty()), Needs::empty());
}

#[test]
fn survival_meters_keep_their_flags() {
    let stats = SurvivalStats::new(12.5, 90.0, 55.25);
    let back = round_trip(&stats);
    assert_eq!(back, stats);
    assert_eq!(back.needs(), stats.needs());
    assert!(back.is_dehydrated());
}

#[test]
fn entities_and_bodies() {
    let info = EntityInfo::new(EntityId(7), Position::new(1, 2, 0))
        .hostile()
        .armed();
    assert_eq!(round_trip(&info), info);

    let actor = Actor::new(EntityId(3), Position::new(4, 4, 0), 80.0)
        .with_health(32.5)
        .with_survival(SurvivalStats::new(60.0, 0.0, 10.0));
    assert_eq!(round_trip(&actor), actor);
}
