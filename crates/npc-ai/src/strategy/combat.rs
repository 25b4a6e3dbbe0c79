//! Combat policy: fight perceived enemies, retreat when hurt.

use behavior_tree::builder;
use serde::{Deserialize, Serialize};

use super::{NodeFactory, StrategyParams, StrategyPredicate, check_unit};
use crate::error::StrategyError;
use crate::nodes::{AttackNearestEnemy, FleeFromThreat, Wait, enemy_in_melee, health_below};

/// Tunables of the combat policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatParams {
    /// At 0.5 or above the agent charges its nearest enemy; below it only
    /// strikes enemies already in melee range and otherwise holds position.
    pub aggressiveness: f32,
    /// Health ratio below which the agent flees.
    pub retreat_threshold: f32,
}

impl CombatParams {
    pub fn new(aggressiveness: f32, retreat_threshold: f32) -> Result<Self, StrategyError> {
        check_unit("aggressiveness", aggressiveness)?;
        check_unit("retreat_threshold", retreat_threshold)?;
        Ok(Self {
            aggressiveness,
            retreat_threshold,
        })
    }

    pub fn is_aggressive(&self) -> bool {
        self.aggressiveness >= 0.5
    }
}

impl Default for CombatParams {
    fn default() -> Self {
        Self {
            aggressiveness: 0.7,
            retreat_threshold: 0.3,
        }
    }
}

pub(super) fn predicates() -> Vec<StrategyPredicate> {
    vec![StrategyPredicate::new(|board, _| !board.enemies.is_empty())]
}

pub(super) fn nodes() -> Vec<NodeFactory> {
    vec![
        NodeFactory::new(|params| {
            let threshold = combat(params).retreat_threshold;
            builder::sequence(
                "retreat",
                vec![
                    health_below(threshold),
                    builder::leaf("flee", FleeFromThreat),
                ],
            )
        }),
        NodeFactory::new(|params| {
            if combat(params).is_aggressive() {
                builder::leaf("charge", AttackNearestEnemy)
            } else {
                builder::sequence(
                    "strike",
                    vec![enemy_in_melee(), builder::leaf("attack", AttackNearestEnemy)],
                )
            }
        }),
        NodeFactory::new(|_| builder::leaf("hold", Wait)),
    ]
}

fn combat(params: &StrategyParams) -> CombatParams {
    match params {
        StrategyParams::Combat(p) => *p,
        _ => CombatParams::default(),
    }
}
