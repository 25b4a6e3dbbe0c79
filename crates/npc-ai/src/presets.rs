//! Complete archetype trees for common NPC types.
//!
//! ```text
//! guard(0.3)
//!   └─ Selector
//!       ├─ Sequence [health_below(0.3), has_enemies, FleeFromThreat]
//!       ├─ Sequence [has_enemies, AttackNearestEnemy]
//!       ├─ MoveToWaypoint
//!       └─ Wait
//! ```
//!
//! Every preset ends in [`Wait`], so it always proposes something.

use behavior_tree::{BehaviorNode, builder};
use game_core::Needs;

use crate::blackboard::Blackboard;
use crate::nodes::{
    ApproachNeighbor, AttackNearestEnemy, Consume, FleeFromThreat, InteractWithNeighbor,
    MoveToWaypoint, Wait, has_enemies, has_neighbor, health_below, needs_any,
};

pub type Archetype = BehaviorNode<Blackboard>;

/// How long a villager waits between chats.
pub const CHAT_COOLDOWN_MS: u64 = 5_000;

/// Guard: fights intruders, retreats when badly hurt, otherwise patrols.
///
/// # Arguments
///
/// * `flee_threshold` - Health ratio (0.0-1.0) below which to flee.
pub fn guard(flee_threshold: f32) -> Archetype {
    builder::selector(
        "guard",
        vec![
            builder::sequence(
                "retreat",
                vec![
                    health_below(flee_threshold),
                    has_enemies(),
                    builder::leaf("flee", FleeFromThreat),
                ],
            ),
            builder::sequence(
                "engage",
                vec![has_enemies(), builder::leaf("attack", AttackNearestEnemy)],
            ),
            builder::leaf("patrol", MoveToWaypoint),
            builder::leaf("wait", Wait),
        ],
    )
}

/// Villager: runs from danger, tends to its needs, chats with neighbours.
pub fn villager() -> Archetype {
    builder::selector(
        "villager",
        vec![
            builder::sequence(
                "run",
                vec![has_enemies(), builder::leaf("flee", FleeFromThreat)],
            ),
            builder::sequence(
                "tend_needs",
                vec![
                    needs_any(Needs::HUNGRY | Needs::THIRSTY | Needs::TIRED),
                    builder::leaf("consume", Consume),
                ],
            ),
            builder::cooldown(
                "chat_cooldown",
                CHAT_COOLDOWN_MS,
                builder::sequence(
                    "chat",
                    vec![
                        has_neighbor(),
                        builder::selector(
                            "talk_or_approach",
                            vec![
                                builder::leaf("interact", InteractWithNeighbor),
                                builder::leaf("approach", ApproachNeighbor),
                            ],
                        ),
                    ],
                ),
            ),
            builder::leaf("wait", Wait),
        ],
    )
}

/// Passive: never does anything but wait.
pub fn passive() -> Archetype {
    builder::selector("passive", vec![builder::leaf("wait", Wait)])
}
