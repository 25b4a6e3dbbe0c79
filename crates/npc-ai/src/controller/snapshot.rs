//! Save and load of a controller's complete mutable state.

use behavior_tree::{Status, TreeSnapshot};
use game_core::EntityId;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::NpcAi;
use crate::decision::AiDecision;
use crate::error::{AiError, StrategyError};
use crate::oracle::OracleSnapshot;
use crate::pathfinding::PathCacheSnapshot;
use crate::state::AiState;
use crate::strategy::{StrategyKind, StrategyManagerSnapshot};

/// Everything mutable in an [`NpcAi`].
///
/// Configuration, the archetype shape and custom strategy closures are not
/// part of the snapshot; they come from the agent the snapshot is restored
/// into.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NpcAiSnapshot {
    pub agent: EntityId,
    pub state: AiState,
    pub current: Option<AiDecision>,
    pub decisions: Vec<AiDecision>,
    pub next_decision_id: u64,
    pub last_status: Option<Status>,
    pub active_strategy: Option<String>,
    pub archetype_tree: TreeSnapshot,
    pub strategy_tree: Option<TreeSnapshot>,
    pub oracle: OracleSnapshot,
    pub path_cache: PathCacheSnapshot,
    pub strategies: StrategyManagerSnapshot,
}

impl NpcAi {
    pub fn snapshot(&self) -> NpcAiSnapshot {
        NpcAiSnapshot {
            agent: self.id,
            state: self.state,
            current: self.current,
            decisions: self.decisions.clone(),
            next_decision_id: self.next_decision_id,
            last_status: self.last_status,
            active_strategy: self.active.as_ref().map(|(kind, _)| kind.to_string()),
            archetype_tree: self.archetype.snapshot(),
            strategy_tree: self.active.as_ref().map(|(_, tree)| tree.snapshot()),
            oracle: self.oracle.snapshot(),
            path_cache: self.pathfinder.snapshot(),
            strategies: self.strategies.snapshot(),
        }
    }

    /// Restores state exported by [`snapshot`](Self::snapshot).
    ///
    /// Either everything is restored or nothing changes.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot belongs to another agent, names an unknown or
    /// unregistered strategy, or carries tree state of a different shape.
    pub fn restore(&mut self, snapshot: NpcAiSnapshot) -> Result<(), AiError> {
        for found in [snapshot.agent, snapshot.oracle.owner] {
            if found != self.id {
                return Err(AiError::AgentMismatch {
                    expected: self.id,
                    found,
                });
            }
        }

        let mut strategies = self.strategies.clone();
        strategies.restore(&snapshot.strategies)?;

        let active = match &snapshot.active_strategy {
            Some(tag) => {
                let kind = StrategyKind::parse(tag)?;
                let strategy = strategies
                    .get(kind)
                    .ok_or_else(|| StrategyError::UnknownKind(tag.clone()))?;
                let mut tree = self.compile(strategy);
                if let Some(saved) = snapshot.strategy_tree {
                    tree.restore(saved)?;
                }
                Some((kind, tree))
            }
            None => None,
        };

        if let Err(err) = self.archetype.restore(snapshot.archetype_tree) {
            warn!(target: "npc_ai::controller", agent = %self.id, %err, "snapshot rejected");
            return Err(err.into());
        }

        self.strategies = strategies;
        self.active = active;
        self.oracle.restore(snapshot.oracle)?;
        self.pathfinder.restore(snapshot.path_cache);
        self.state = snapshot.state;
        self.current = snapshot.current;
        self.decisions = snapshot.decisions;
        self.next_decision_id = snapshot.next_decision_id;
        self.last_status = snapshot.last_status;

        info!(target: "npc_ai::controller", agent = %self.id, state = %self.state, "snapshot restored");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AiError::Snapshot`] if serialization fails.
    pub fn to_json(&self) -> Result<String, AiError> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// # Errors
    ///
    /// Fails on malformed JSON or for any reason [`restore`](Self::restore) fails.
    pub fn restore_json(&mut self, json: &str) -> Result<(), AiError> {
        let snapshot: NpcAiSnapshot = serde_json::from_str(json)?;
        self.restore(snapshot)
    }
}
