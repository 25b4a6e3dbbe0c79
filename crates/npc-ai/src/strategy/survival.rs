//! Survival policy: eat, drink and rest when needs are flagged.

use behavior_tree::builder;
use game_core::Needs;

use super::{NodeFactory, StrategyPredicate};
use crate::nodes::{Consume, Wait, needs_any};

/// Needs that make the survival policy applicable.
pub const SURVIVAL_NEEDS: Needs = Needs::HUNGRY.union(Needs::THIRSTY).union(Needs::TIRED);

pub(super) fn predicates() -> Vec<StrategyPredicate> {
    vec![StrategyPredicate::new(|board, _| board.needs.intersects(SURVIVAL_NEEDS))]
}

pub(super) fn nodes() -> Vec<NodeFactory> {
    vec![
        NodeFactory::new(|_| {
            builder::sequence(
                "tend_needs",
                vec![needs_any(SURVIVAL_NEEDS), builder::leaf("consume", Consume)],
            )
        }),
        NodeFactory::new(|_| builder::leaf("wait", Wait)),
    ]
}
