//! Social policy: approach and talk to non-hostile neighbours.

use behavior_tree::builder;
use serde::{Deserialize, Serialize};

use super::{NodeFactory, StrategyParams, StrategyPredicate, check_unit};
use crate::error::StrategyError;
use crate::nodes::{ApproachNeighbor, InteractWithNeighbor, Wait, has_neighbor};

/// Longest pause between interactions, reached at zero trade interest.
pub const MAX_INTERACTION_COOLDOWN_MS: u64 = 10_000;

/// Tunables of the social policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SocialParams {
    /// 0.0 never seeks company, 1.0 interacts every turn it can.
    pub trade_interest: f32,
}

impl SocialParams {
    pub fn new(trade_interest: f32) -> Result<Self, StrategyError> {
        check_unit("trade_interest", trade_interest)?;
        Ok(Self { trade_interest })
    }

    /// Pause between two interactions.
    pub fn cooldown_ms(&self) -> u64 {
        ((1.0 - self.trade_interest) * MAX_INTERACTION_COOLDOWN_MS as f32) as u64
    }
}

impl Default for SocialParams {
    fn default() -> Self {
        Self {
            trade_interest: 0.5,
        }
    }
}

pub(super) fn predicates() -> Vec<StrategyPredicate> {
    vec![
        StrategyPredicate::new(|board, _| !board.neighbors.is_empty()),
        StrategyPredicate::new(|_, params| social(params).trade_interest > 0.0),
    ]
}

pub(super) fn nodes() -> Vec<NodeFactory> {
    vec![
        NodeFactory::new(|params| {
            builder::cooldown(
                "interaction_cooldown",
                social(params).cooldown_ms(),
                builder::sequence(
                    "socialize",
                    vec![
                        has_neighbor(),
                        builder::leaf("interact", InteractWithNeighbor),
                    ],
                ),
            )
        }),
        NodeFactory::new(|_| builder::leaf("approach", ApproachNeighbor)),
        NodeFactory::new(|_| builder::leaf("wait", Wait)),
    ]
}

fn social(params: &StrategyParams) -> SocialParams {
    match params {
        StrategyParams::Social(p) => *p,
        _ => SocialParams::default(),
    }
}
