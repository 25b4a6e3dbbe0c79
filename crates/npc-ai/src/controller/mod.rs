//! Per-agent orchestrator tying perception, behavior and movement together.
//!
//! Each [`NpcAi::tick`]:
//!
//! 1. refreshes the [`Oracle`] from the world
//! 2. runs the active behavior tree (the best applicable strategy's tree, or
//!    the archetype tree when no strategy applies)
//! 3. derives decisions ordered survival > threat response > tree proposal
//!    and keeps the first as the current decision
//!
//! [`NpcAi::process_turn`] then carries out the current decision.
mod execute;
mod snapshot;

pub use execute::TurnOutcome;
pub use snapshot::NpcAiSnapshot;

use behavior_tree::{BehaviorNode, BehaviorTree, Status};
use game_core::{AgentBody, EntityId, Needs, Perceivable};
use tracing::{debug, info, warn};

use crate::blackboard::Blackboard;
use crate::config::NpcAiConfig;
use crate::decision::{AiAction, AiDecision};
use crate::error::AiError;
use crate::oracle::Oracle;
use crate::pathfinding::Pathfinder;
use crate::presets;
use crate::state::AiState;
use crate::strategy::{Strategy, StrategyKind, StrategyManager};

/// The decision-making core of one NPC.
///
/// Owns its oracle, path cache, strategies and trees exclusively; the world
/// is only ever borrowed.
pub struct NpcAi {
    id: EntityId,
    config: NpcAiConfig,
    state: AiState,
    oracle: Oracle,
    pathfinder: Pathfinder,
    strategies: StrategyManager,
    archetype: BehaviorTree<Blackboard>,
    active: Option<(StrategyKind, BehaviorTree<Blackboard>)>,
    current: Option<AiDecision>,
    decisions: Vec<AiDecision>,
    next_decision_id: u64,
    last_status: Option<Status>,
}

impl NpcAi {
    pub fn builder(id: EntityId) -> NpcAiBuilder {
        NpcAiBuilder::new(id)
    }

    /// A passive agent with `config` and no strategies.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Config`] if `config` is invalid.
    pub fn new(id: EntityId, config: NpcAiConfig) -> Result<Self, AiError> {
        Self::builder(id)
            .config(config)
            .archetype(presets::passive())
            .build()
    }

    /// Runs one decision cycle and returns the new current decision.
    ///
    /// A dead body moves the agent to [`AiState::Dead`] and yields no decision.
    pub fn tick<B, W>(&mut self, body: &B, world: &W, now: u64) -> Option<&AiDecision>
    where
        B: AgentBody + ?Sized,
        W: Perceivable + ?Sized,
    {
        if body.is_dead() || self.state.is_dead() {
            self.transition(AiState::Dead);
            self.current = None;
            self.decisions.clear();
            return None;
        }

        self.oracle.update(world, body.position(), now);

        let mut board = Blackboard::observe(body, &self.oracle, self.state, now)
            .with_waypoint(self.strategies.patrol_waypoint())
            .with_melee_range(self.config.controller.melee_range);

        self.select_tree(&board);
        let tree = match &mut self.active {
            Some((_, tree)) => tree,
            None => &mut self.archetype,
        };
        let status = tree.update(&mut board, now);
        self.last_status = Some(status);

        if board.waypoint == Some(board.position)
            && let Some(next) = self.strategies.advance_waypoint(StrategyKind::Patrol)
        {
            debug!(target: "npc_ai::controller", agent = %self.id, %next, "waypoint reached");
        }

        let decisions = self.derive_decisions(&mut board, now);
        self.decisions = decisions;
        self.current = self.decisions.first().copied();

        if let Some(decision) = self.current {
            debug!(
                target: "npc_ai::controller",
                agent = %self.id,
                action = %decision.kind(),
                priority = decision.priority(),
                tree_status = status.as_str(),
                "decision"
            );
            self.transition(AiState::for_action(decision.kind()));
        }
        self.current.as_ref()
    }

    /// Switches to the best strategy's tree when the best kind changes.
    fn select_tree(&mut self, board: &Blackboard) {
        let best = self.strategies.best(board);
        let best_kind = best.map(Strategy::kind);
        let active_kind = self.active.as_ref().map(|(kind, _)| *kind);
        if best_kind == active_kind {
            return;
        }

        info!(
            target: "npc_ai::controller",
            agent = %self.id,
            from = active_kind.map_or("archetype", StrategyKind::as_str),
            to = best_kind.map_or("archetype", StrategyKind::as_str),
            "strategy switch"
        );
        self.active = best.map(|strategy| (strategy.kind(), self.compile(strategy)));
    }

    fn compile(&self, strategy: &Strategy) -> BehaviorTree<Blackboard> {
        strategy
            .behavior_tree()
            .with_max_iterations(self.config.behavior.max_iterations_per_tick)
            .with_history_capacity(self.config.behavior.history_capacity)
    }

    fn derive_decisions(&mut self, board: &mut Blackboard, now: u64) -> Vec<AiDecision> {
        let controller = self.config.controller.clone();
        let mut decisions = Vec::with_capacity(3);

        if board.needs.is_critical()
            && let Some(action) = AiAction::for_needs(board.needs & Needs::CRITICAL)
        {
            decisions.push(self.decide(action, controller.survival_priority, now));
        }

        if let Some(threat) = board.highest_threat.filter(|t| t.level.is_hostile()) {
            let action = if board.health_ratio() < controller.retreat_threshold {
                AiAction::flee(threat.target, threat.position)
            } else {
                AiAction::attack(threat.target, threat.position)
            };
            decisions.push(self.decide(action, controller.threat_priority, now));
        }

        let action = board.take_proposal().unwrap_or_else(AiAction::wait);
        decisions.push(self.decide(action, controller.behavior_priority, now));

        decisions.sort_by(|a, b| b.priority().cmp(&a.priority()));
        decisions
    }

    fn decide(&mut self, action: AiAction, priority: u8, now: u64) -> AiDecision {
        let id = self.next_decision_id;
        self.next_decision_id += 1;
        AiDecision::new(id, action, priority, now)
    }

    fn transition(&mut self, next: AiState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(next) {
            warn!(target: "npc_ai::controller", agent = %self.id, from = %self.state, to = %next, "illegal state transition");
            return;
        }
        info!(target: "npc_ai::controller", agent = %self.id, from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    /// Makes the next update of the active tree return `Failure` untouched.
    pub fn abort(&mut self) {
        self.active_tree_mut().abort();
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn config(&self) -> &NpcAiConfig {
        &self.config
    }

    pub fn oracle(&self) -> &Oracle {
        &self.oracle
    }

    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    pub fn pathfinder_mut(&mut self) -> &mut Pathfinder {
        &mut self.pathfinder
    }

    pub fn strategies(&self) -> &StrategyManager {
        &self.strategies
    }

    /// Mutable strategies. Changes take effect on the next tick.
    pub fn strategies_mut(&mut self) -> &mut StrategyManager {
        &mut self.strategies
    }

    pub fn active_strategy(&self) -> Option<StrategyKind> {
        self.active.as_ref().map(|(kind, _)| *kind)
    }

    pub fn archetype_tree(&self) -> &BehaviorTree<Blackboard> {
        &self.archetype
    }

    /// The tree ticked last (strategy tree or archetype).
    pub fn active_tree(&self) -> &BehaviorTree<Blackboard> {
        match &self.active {
            Some((_, tree)) => tree,
            None => &self.archetype,
        }
    }

    fn active_tree_mut(&mut self) -> &mut BehaviorTree<Blackboard> {
        match &mut self.active {
            Some((_, tree)) => tree,
            None => &mut self.archetype,
        }
    }

    pub fn last_status(&self) -> Option<Status> {
        self.last_status
    }

    pub fn current_decision(&self) -> Option<&AiDecision> {
        self.current.as_ref()
    }

    /// All decisions of the last tick, highest priority first.
    pub fn decisions(&self) -> &[AiDecision] {
        &self.decisions
    }
}

impl std::fmt::Debug for NpcAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NpcAi")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("active_strategy", &self.active_strategy())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// Builder for [`NpcAi`].
pub struct NpcAiBuilder {
    id: EntityId,
    config: NpcAiConfig,
    archetype: Option<BehaviorNode<Blackboard>>,
    strategies: Vec<Strategy>,
}

impl NpcAiBuilder {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            config: NpcAiConfig::default(),
            archetype: None,
            strategies: Vec::new(),
        }
    }

    pub fn config(mut self, config: NpcAiConfig) -> Self {
        self.config = config;
        self
    }

    /// Root of the tree used when no strategy applies. Required.
    pub fn archetype(mut self, root: BehaviorNode<Blackboard>) -> Self {
        self.archetype = Some(root);
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategies(mut self, strategies: impl IntoIterator<Item = Strategy>) -> Self {
        self.strategies.extend(strategies);
        self
    }

    /// # Errors
    ///
    /// Fails on an invalid config, a missing archetype or duplicate strategy kinds.
    pub fn build(self) -> Result<NpcAi, AiError> {
        self.config.validate()?;

        let mut tree = BehaviorTree::builder(format!("npc{}", self.id))
            .max_iterations(self.config.behavior.max_iterations_per_tick)
            .history_capacity(self.config.behavior.history_capacity);
        if let Some(root) = self.archetype {
            tree = tree.root(root);
        }
        let archetype = tree.build()?;
        let strategies = StrategyManager::with_strategies(self.strategies)?;

        Ok(NpcAi {
            id: self.id,
            oracle: Oracle::new(self.id, self.config.perception.clone()),
            pathfinder: Pathfinder::new(self.config.pathfinding.clone()),
            config: self.config,
            state: AiState::Idle,
            strategies,
            archetype,
            active: None,
            current: None,
            decisions: Vec::new(),
            next_decision_id: 0,
            last_status: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use behavior_tree::TreeError;
    use game_core::{Actor, EntityInfo, GridMap, MapBounds, Position, SurvivalStats};

    use crate::decision::AiActionKind;
    use crate::strategy::CombatParams;

    const ME: EntityId = EntityId(1);

    fn map_with(entities: &[EntityInfo]) -> GridMap {
        let mut map = GridMap::new(MapBounds::flat(30, 30));
        for entity in entities {
            map.insert_entity(entity.clone()).unwrap();
        }
        map
    }

    fn me() -> Actor {
        Actor::new(ME, Position::new(10, 10, 0), 100.0)
    }

    #[test]
    fn builder_requires_archetype() {
        let err = NpcAi::builder(ME).build().unwrap_err();
        assert!(matches!(err, AiError::Tree(TreeError::MissingRoot(_))));
    }

    #[test]
    fn builder_rejects_duplicate_strategies() {
        let err = NpcAi::builder(ME)
            .archetype(presets::passive())
            .strategy(Strategy::survival())
            .strategy(Strategy::survival())
            .build()
            .unwrap_err();
        assert!(matches!(err, AiError::Strategy(_)));
    }

    #[test]
    fn quiet_agent_waits() {
        let mut ai = NpcAi::new(ME, NpcAiConfig::default()).unwrap();
        let decision = *ai.tick(&me(), &map_with(&[]), 0).unwrap();

        assert_eq!(decision.kind(), AiActionKind::Wait);
        assert_eq!(decision.priority(), 1);
        assert_eq!(ai.state(), AiState::Idle);
        assert_eq!(ai.last_status(), Some(Status::Success));
    }

    #[test]
    fn survival_outranks_threat_outranks_behavior() {
        let body = me().with_survival(SurvivalStats::new(0.0, 90.0, 0.0));
        let map = map_with(&[EntityInfo::new(EntityId(2), Position::new(13, 10, 0)).hostile()]);
        let mut ai = NpcAi::builder(ME)
            .archetype(presets::villager())
            .build()
            .unwrap();

        ai.tick(&body, &map, 0);
        let kinds: Vec<_> = ai.decisions().iter().map(AiDecision::kind).collect();
        let priorities: Vec<_> = ai.decisions().iter().map(AiDecision::priority).collect();

        assert_eq!(
            kinds,
            vec![AiActionKind::Drink, AiActionKind::Attack, AiActionKind::Flee]
        );
        assert_eq!(priorities, vec![10, 8, 1]);
        assert_eq!(ai.current_decision().map(AiDecision::kind), Some(AiActionKind::Drink));
        assert_eq!(ai.state(), AiState::Resting);
    }

    #[test]
    fn low_health_turns_attack_into_flight() {
        let body = me().with_health(20.0);
        let map = map_with(&[EntityInfo::new(EntityId(2), Position::new(13, 10, 0)).hostile()]);
        let mut ai = NpcAi::new(ME, NpcAiConfig::default()).unwrap();

        let decision = *ai.tick(&body, &map, 0).unwrap();
        assert_eq!(decision.kind(), AiActionKind::Flee);
        assert_eq!(decision.target(), Some(EntityId(2)));
        assert_eq!(ai.state(), AiState::Fleeing);
    }

    #[test]
    fn decision_ids_are_unique() {
        let map = map_with(&[EntityInfo::new(EntityId(2), Position::new(13, 10, 0)).hostile()]);
        let mut ai = NpcAi::new(ME, NpcAiConfig::default()).unwrap();
        ai.tick(&me(), &map, 0);
        let mut ids: Vec<_> = ai.decisions().iter().map(AiDecision::id).collect();
        ai.tick(&me(), &map, 100);
        ids.extend(ai.decisions().iter().map(AiDecision::id));

        let len = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), len);
    }

    #[test]
    fn strategy_switch_keeps_tree_until_kind_changes() {
        let map = map_with(&[EntityInfo::new(EntityId(2), Position::new(13, 10, 0)).hostile()]);
        let mut ai = NpcAi::builder(ME)
            .archetype(presets::passive())
            .strategy(Strategy::combat(CombatParams::default()))
            .strategy(Strategy::patrol(vec![Position::new(15, 15, 0)]))
            .build()
            .unwrap();

        ai.tick(&me(), &map, 0);
        assert_eq!(ai.active_strategy(), Some(StrategyKind::Combat));
        ai.tick(&me(), &map, 100);
        assert_eq!(ai.active_tree().stats().execution_count, 2);

        let quiet = map_with(&[]);
        ai.tick(&me(), &quiet, 200);
        assert_eq!(ai.active_strategy(), Some(StrategyKind::Patrol));
        assert_eq!(ai.active_tree().stats().execution_count, 1);
        assert_eq!(
            ai.current_decision().map(AiDecision::kind),
            Some(AiActionKind::MoveTo)
        );
        assert_eq!(ai.archetype_tree().stats().execution_count, 0);
    }

    #[test]
    fn dead_agents_decide_nothing() {
        let mut ai = NpcAi::new(ME, NpcAiConfig::default()).unwrap();
        assert!(ai.tick(&me().with_health(0.0), &map_with(&[]), 0).is_none());
        assert_eq!(ai.state(), AiState::Dead);

        assert!(ai.tick(&me(), &map_with(&[]), 100).is_none());
        assert_eq!(ai.state(), AiState::Dead);
    }

    #[test]
    fn abort_fails_next_update_only() {
        let mut ai = NpcAi::new(ME, NpcAiConfig::default()).unwrap();
        ai.abort();
        let decision = *ai.tick(&me(), &map_with(&[]), 0).unwrap();

        assert_eq!(ai.last_status(), Some(Status::Failure));
        assert_eq!(decision.kind(), AiActionKind::Wait);

        ai.tick(&me(), &map_with(&[]), 100);
        assert_eq!(ai.last_status(), Some(Status::Success));
    }
}
