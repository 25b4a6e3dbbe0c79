//! Priority arbitration among strategies.

use game_core::Position;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Strategy, StrategyKind, StrategySnapshot};
use crate::blackboard::Blackboard;
use crate::error::StrategyError;

/// An explicitly built set of strategies, at most one per kind.
#[derive(Clone, Debug, Default)]
pub struct StrategyManager {
    strategies: Vec<Strategy>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyManagerSnapshot {
    pub strategies: Vec<StrategySnapshot>,
}

impl StrategyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a manager from `strategies`, kept in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::DuplicateKind`] if two strategies share a kind.
    pub fn with_strategies(strategies: Vec<Strategy>) -> Result<Self, StrategyError> {
        let mut manager = Self::new();
        for strategy in strategies {
            manager.add(strategy)?;
        }
        Ok(manager)
    }

    /// Appends a strategy.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::DuplicateKind`] if its kind is already present.
    pub fn add(&mut self, strategy: Strategy) -> Result<(), StrategyError> {
        if self.get(strategy.kind()).is_some() {
            return Err(StrategyError::DuplicateKind(strategy.kind().to_string()));
        }
        self.strategies.push(strategy);
        Ok(())
    }

    pub fn remove(&mut self, kind: StrategyKind) -> Option<Strategy> {
        let index = self.strategies.iter().position(|s| s.kind() == kind)?;
        Some(self.strategies.remove(index))
    }

    pub fn get(&self, kind: StrategyKind) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.kind() == kind)
    }

    pub fn get_mut(&mut self, kind: StrategyKind) -> Option<&mut Strategy> {
        self.strategies.iter_mut().find(|s| s.kind() == kind)
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// The applicable strategy with the highest priority.
    ///
    /// Strategies are scanned in insertion order and only a strictly higher
    /// priority replaces the current best, so the first one added wins ties.
    pub fn best(&self, board: &Blackboard) -> Option<&Strategy> {
        let mut best: Option<&Strategy> = None;
        for strategy in &self.strategies {
            if !strategy.is_applicable(board) {
                continue;
            }
            if best.is_none_or(|b| strategy.priority() > b.priority()) {
                best = Some(strategy);
            }
        }
        if let Some(strategy) = best {
            debug!(target: "npc_ai::strategy", agent = %board.agent, best = strategy.name(), priority = strategy.priority(), "strategy selected");
        }
        best
    }

    /// Advances the waypoint cursor of the `kind` strategy.
    pub fn advance_waypoint(&mut self, kind: StrategyKind) -> Option<Position> {
        self.get_mut(kind)?.advance_waypoint()
    }

    /// Current waypoint of the patrol strategy, if any.
    pub fn patrol_waypoint(&self) -> Option<Position> {
        self.get(StrategyKind::Patrol)?.current_waypoint()
    }

    pub fn snapshot(&self) -> StrategyManagerSnapshot {
        StrategyManagerSnapshot {
            strategies: self.strategies.iter().map(Strategy::snapshot).collect(),
        }
    }

    /// Replaces the strategy set with `snapshot`.
    ///
    /// Strategies of a kind already present are restored in place, keeping
    /// their custom predicates and nodes; others are rebuilt from the
    /// snapshot. The result follows the snapshot's order. On error the
    /// manager is left unchanged.
    ///
    /// # Errors
    ///
    /// Fails on unknown kinds, duplicate kinds or malformed parameters.
    pub fn restore(&mut self, snapshot: &StrategyManagerSnapshot) -> Result<(), StrategyError> {
        let mut restored = Self::new();
        for entry in &snapshot.strategies {
            let kind = StrategyKind::parse(&entry.kind)?;
            let strategy = match self.get(kind) {
                Some(existing) => {
                    let mut strategy = existing.clone();
                    strategy.restore(entry)?;
                    strategy
                }
                None => Strategy::from_snapshot(entry)?,
            };
            restored.add(strategy)?;
        }
        *self = restored;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{EntityId, Needs};

    use crate::strategy::CombatParams;

    fn hungry() -> Blackboard {
        let mut board = Blackboard::new(EntityId(1), Position::ORIGIN);
        board.needs = Needs::HUNGRY;
        board
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut manager = StrategyManager::new();
        manager.add(Strategy::survival()).unwrap();
        assert_eq!(
            manager.add(Strategy::survival()),
            Err(StrategyError::DuplicateKind("survival".to_owned()))
        );
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn highest_applicable_priority_wins() {
        let manager = StrategyManager::with_strategies(vec![
            Strategy::patrol(vec![Position::new(3, 0, 0)]),
            Strategy::combat(CombatParams::default()),
            Strategy::survival(),
        ])
        .unwrap();

        assert_eq!(
            manager.best(&hungry()).map(Strategy::kind),
            Some(StrategyKind::Survival)
        );
        let quiet = Blackboard::new(EntityId(1), Position::ORIGIN);
        assert_eq!(
            manager.best(&quiet).map(Strategy::kind),
            Some(StrategyKind::Patrol)
        );
    }

    #[test]
    fn ties_go_to_the_first_added() {
        let manager = StrategyManager::with_strategies(vec![
            Strategy::patrol(vec![Position::new(3, 0, 0)]).with_priority(50),
            Strategy::survival().with_priority(50),
        ])
        .unwrap();
        assert_eq!(
            manager.best(&hungry()).map(Strategy::kind),
            Some(StrategyKind::Patrol)
        );

        let manager = StrategyManager::with_strategies(vec![
            Strategy::survival().with_priority(50),
            Strategy::patrol(vec![Position::new(3, 0, 0)]).with_priority(50),
        ])
        .unwrap();
        assert_eq!(
            manager.best(&hungry()).map(Strategy::kind),
            Some(StrategyKind::Survival)
        );
    }

    #[test]
    fn nothing_applicable() {
        let manager = StrategyManager::with_strategies(vec![Strategy::survival()]).unwrap();
        let quiet = Blackboard::new(EntityId(1), Position::ORIGIN);
        assert!(manager.best(&quiet).is_none());
        assert!(StrategyManager::new().best(&quiet).is_none());
    }

    #[test]
    fn waypoint_advances_only_on_request() {
        let a = Position::new(1, 0, 0);
        let b = Position::new(4, 0, 0);
        let mut manager =
            StrategyManager::with_strategies(vec![Strategy::patrol(vec![a, b])]).unwrap();

        assert_eq!(manager.patrol_waypoint(), Some(a));
        manager.best(&Blackboard::new(EntityId(1), a));
        assert_eq!(manager.patrol_waypoint(), Some(a));

        assert_eq!(manager.advance_waypoint(StrategyKind::Patrol), Some(b));
        assert_eq!(manager.patrol_waypoint(), Some(b));
        assert_eq!(manager.advance_waypoint(StrategyKind::Combat), None);
    }

    #[test]
    fn restore_keeps_custom_predicates() {
        let mut manager = StrategyManager::with_strategies(vec![
            Strategy::survival().with_condition(|_, _| false),
        ])
        .unwrap();

        let mut snapshot = manager.snapshot();
        snapshot.strategies[0].priority = 7;
        snapshot
            .strategies
            .push(Strategy::patrol(vec![Position::ORIGIN]).snapshot());
        manager.restore(&snapshot).unwrap();

        assert_eq!(manager.len(), 2);
        let survival = manager.get(StrategyKind::Survival).unwrap();
        assert_eq!(survival.priority(), 7);
        assert!(!survival.is_applicable(&hungry()));
        assert_eq!(manager.snapshot(), snapshot);
    }

    #[test]
    fn failed_restore_leaves_manager_untouched() {
        let mut manager = StrategyManager::with_strategies(vec![Strategy::survival()]).unwrap();
        let mut snapshot = manager.snapshot();
        snapshot.strategies.push(snapshot.strategies[0].clone());

        assert!(manager.restore(&snapshot).is_err());
        assert_eq!(manager.len(), 1);
    }
}
