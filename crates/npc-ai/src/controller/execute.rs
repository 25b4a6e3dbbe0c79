//! Carrying out the current decision against the world.

use game_core::{
    AgentBody, AttackOutcome, CombatResolver, EntityId, GameError, Pathable, Position,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::NpcAi;
use crate::decision::{AiActionKind, AiDecision};
use crate::pathfinding::Path;

/// What [`NpcAi::process_turn`] did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TurnOutcome {
    /// The body advanced one hop.
    Moved { from: Position, to: Position },
    /// An attack was handed to the combat resolver.
    Attacked {
        target: EntityId,
        outcome: AttackOutcome,
    },
    /// The action needs no world change from this stack (or is already done).
    Acknowledged(AiActionKind),
    /// The action could not be carried out this turn.
    Blocked { kind: AiActionKind, reason: String },
    /// No decision to execute.
    Idle,
}

impl TurnOutcome {
    fn blocked(kind: AiActionKind, reason: impl Into<String>) -> Self {
        Self::Blocked {
            kind,
            reason: reason.into(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

impl NpcAi {
    /// Executes the current decision.
    ///
    /// Movement kinds advance at most one hop along a planned path; `Attack`
    /// closes in first when the target is beyond melee range. Survival and
    /// idle kinds are acknowledged without touching the world.
    pub fn process_turn<B, W, R>(
        &mut self,
        body: &mut B,
        world: &W,
        combat: &mut R,
        now: u64,
    ) -> TurnOutcome
    where
        B: AgentBody + ?Sized,
        W: Pathable + ?Sized,
        R: CombatResolver + ?Sized,
    {
        if self.state.is_dead() {
            return TurnOutcome::Idle;
        }
        let Some(decision) = self.current else {
            return TurnOutcome::Idle;
        };

        let outcome = match decision.kind() {
            AiActionKind::Move | AiActionKind::MoveTo => match decision.position() {
                Some(destination) => self.step_towards(body, world, destination, decision.kind(), now),
                None => TurnOutcome::blocked(decision.kind(), "no destination"),
            },
            AiActionKind::Follow => self.follow(body, world, &decision, now),
            AiActionKind::Flee => self.flee(body, world, &decision, now),
            AiActionKind::Attack => self.attack(body, world, combat, &decision, now),
            kind => TurnOutcome::Acknowledged(kind),
        };

        debug!(
            target: "npc_ai::controller",
            agent = %self.id,
            decision = decision.id(),
            action = %decision.kind(),
            ?outcome,
            "turn processed"
        );
        outcome
    }

    fn step_towards<B, W>(
        &mut self,
        body: &mut B,
        world: &W,
        destination: Position,
        kind: AiActionKind,
        now: u64,
    ) -> TurnOutcome
    where
        B: AgentBody + ?Sized,
        W: Pathable + ?Sized,
    {
        let from = body.position();
        if from == destination {
            return TurnOutcome::Acknowledged(kind);
        }
        match self.next_hop(world, from, destination, now) {
            Ok(Some(to)) => {
                body.set_position(to);
                TurnOutcome::Moved { from, to }
            }
            Ok(None) => TurnOutcome::Acknowledged(kind),
            Err(reason) => TurnOutcome::blocked(kind, reason),
        }
    }

    /// First free tile on the way from `from` to `destination`.
    ///
    /// A cached route that crosses terrain which has since become impassable
    /// is dropped and searched again once.
    fn next_hop<W>(
        &mut self,
        world: &W,
        from: Position,
        destination: Position,
        now: u64,
    ) -> Result<Option<Position>, String>
    where
        W: Pathable + ?Sized,
    {
        let mut path = self.route(world, from, destination, now)?;
        if path.points().iter().skip(1).any(|&p| !world.is_passable(p)) {
            debug!(target: "npc_ai::controller", %from, %destination, "cached route is stale");
            self.pathfinder.invalidate(from, destination);
            path = self.route(world, from, destination, now)?;
        }
        match path.next_position(0) {
            Some(to) if !world.is_passable(to) => Err(format!("{to} is blocked")),
            Some(to) if world.is_occupied(to) => Err(format!("{to} is occupied")),
            hop => Ok(hop),
        }
    }

    fn route<W>(&mut self, world: &W, from: Position, destination: Position, now: u64) -> Result<Path, String>
    where
        W: Pathable + ?Sized,
    {
        self.pathfinder
            .path_to(world, from, destination, now)
            .map_err(|err| {
                debug!(
                    target: "npc_ai::controller",
                    code = err.error_code(),
                    severity = err.severity().as_str(),
                    %from,
                    %destination,
                    "no route"
                );
                err.to_string()
            })
    }

    fn follow<B, W>(&mut self, body: &mut B, world: &W, decision: &AiDecision, now: u64) -> TurnOutcome
    where
        B: AgentBody + ?Sized,
        W: Pathable + ?Sized,
    {
        let target = decision
            .target()
            .and_then(|id| self.oracle.last_known_position(id))
            .or(decision.position());
        let Some(target) = target else {
            return TurnOutcome::blocked(AiActionKind::Follow, "target location unknown");
        };
        if body.position().is_adjacent(target) {
            return TurnOutcome::Acknowledged(AiActionKind::Follow);
        }
        let next_hop = self
            .pathfinder
            .path_to(world, body.position(), target, now)
            .ok()
            .and_then(|path| path.next_position(0));
        if next_hop == Some(target) {
            return TurnOutcome::Acknowledged(AiActionKind::Follow);
        }
        self.step_towards(body, world, target, AiActionKind::Follow, now)
    }

    fn flee<B, W>(&mut self, body: &mut B, world: &W, decision: &AiDecision, now: u64) -> TurnOutcome
    where
        B: AgentBody + ?Sized,
        W: Pathable + ?Sized,
    {
        let threat = decision
            .target()
            .and_then(|id| self.oracle.last_known_position(id))
            .or(decision.position());
        let Some(threat) = threat else {
            return TurnOutcome::blocked(AiActionKind::Flee, "threat location unknown");
        };

        let from = body.position();
        let distance = self.config.controller.flee_distance;
        let (mut dx, mut dy) = ((from.x - threat.x).signum(), (from.y - threat.y).signum());
        if dx == 0 && dy == 0 {
            dx = 1;
        }
        let destination = world
            .bounds()
            .clamp(from.offset(dx * distance, dy * distance, 0));

        if destination != from
            && let Ok(Some(to)) = self.next_hop(world, from, destination, now)
            && to.distance_to(threat) > from.distance_to(threat)
        {
            body.set_position(to);
            return TurnOutcome::Moved { from, to };
        }

        match escape_step(world, from, threat) {
            Some(to) => {
                body.set_position(to);
                TurnOutcome::Moved { from, to }
            }
            None => TurnOutcome::blocked(AiActionKind::Flee, "cornered"),
        }
    }

    fn attack<B, W, R>(
        &mut self,
        body: &mut B,
        world: &W,
        combat: &mut R,
        decision: &AiDecision,
        now: u64,
    ) -> TurnOutcome
    where
        B: AgentBody + ?Sized,
        W: Pathable + ?Sized,
        R: CombatResolver + ?Sized,
    {
        let Some(target) = decision.target() else {
            return TurnOutcome::blocked(AiActionKind::Attack, "no target");
        };
        let Some(position) = self.oracle.last_known_position(target).or(decision.position()) else {
            return TurnOutcome::blocked(AiActionKind::Attack, "target location unknown");
        };

        if body.position().distance_to(position) > self.config.controller.melee_range {
            return self.step_towards(body, world, position, AiActionKind::Attack, now);
        }

        let outcome = combat.resolve_attack(body.id(), target);
        TurnOutcome::Attacked { target, outcome }
    }
}

/// The free lateral neighbour of `from` farthest from `threat`, if it is
/// farther than `from` itself.
fn escape_step<W>(world: &W, from: Position, threat: Position) -> Option<Position>
where
    W: Pathable + ?Sized,
{
    const LATERAL: [(i32, i32); 8] = [
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];

    let current = from.distance_to(threat);
    LATERAL
        .iter()
        .map(|&(dx, dy)| from.offset(dx, dy, 0))
        .filter(|&p| world.is_passable(p) && !world.is_occupied(p))
        .map(|p| (p, p.distance_to(threat)))
        .filter(|&(_, d)| d > current)
        .fold(None, |best: Option<(Position, f32)>, candidate| match best {
            Some((_, d)) if d >= candidate.1 => best,
            _ => Some(candidate),
        })
        .map(|(p, _)| p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{Actor, EntityInfo, GridMap, MapBounds};

    use crate::config::NpcAiConfig;
    use crate::presets;

    const ME: EntityId = EntityId(1);
    const FOE: EntityId = EntityId(2);

    #[derive(Default)]
    struct Recorder {
        attacks: Vec<(EntityId, EntityId)>,
    }

    impl CombatResolver for Recorder {
        fn resolve_attack(&mut self, attacker: EntityId, target: EntityId) -> AttackOutcome {
            self.attacks.push((attacker, target));
            AttackOutcome::Hit { damage: 4.0 }
        }
    }

    fn world(foe: Option<Position>) -> GridMap {
        let mut map = GridMap::new(MapBounds::flat(20, 20));
        if let Some(position) = foe {
            map.insert_entity(EntityInfo::new(FOE, position).hostile())
                .unwrap();
        }
        map
    }

    #[test]
    fn idle_without_decision() {
        let mut ai = NpcAi::new(ME, NpcAiConfig::default()).unwrap();
        let mut body = Actor::new(ME, Position::new(5, 5, 0), 100.0);
        let outcome = ai.process_turn(&mut body, &world(None), &mut Recorder::default(), 0);
        assert_eq!(outcome, TurnOutcome::Idle);
    }

    #[test]
    fn wait_is_acknowledged() {
        let map = world(None);
        let mut ai = NpcAi::new(ME, NpcAiConfig::default()).unwrap();
        let mut body = Actor::new(ME, Position::new(5, 5, 0), 100.0);
        ai.tick(&body, &map, 0);

        let outcome = ai.process_turn(&mut body, &map, &mut Recorder::default(), 0);
        assert_eq!(outcome, TurnOutcome::Acknowledged(AiActionKind::Wait));
        assert_eq!(body.position(), Position::new(5, 5, 0));
    }

    #[test]
    fn attack_closes_distance_then_resolves() {
        let map = world(Some(Position::new(8, 5, 0)));
        let mut ai = NpcAi::new(ME, NpcAiConfig::default()).unwrap();
        let mut body = Actor::new(ME, Position::new(5, 5, 0), 100.0);
        let mut combat = Recorder::default();

        ai.tick(&body, &map, 0);
        assert_eq!(
            ai.process_turn(&mut body, &map, &mut combat, 0),
            TurnOutcome::Moved {
                from: Position::new(5, 5, 0),
                to: Position::new(6, 5, 0),
            }
        );
        ai.tick(&body, &map, 100);
        ai.process_turn(&mut body, &map, &mut combat, 100);
        assert_eq!(body.position(), Position::new(7, 5, 0));
        assert!(combat.attacks.is_empty());

        ai.tick(&body, &map, 200);
        assert_eq!(
            ai.process_turn(&mut body, &map, &mut combat, 200),
            TurnOutcome::Attacked {
                target: FOE,
                outcome: AttackOutcome::Hit { damage: 4.0 },
            }
        );
        assert_eq!(combat.attacks, vec![(ME, FOE)]);
    }

    #[test]
    fn flee_moves_away_from_threat() {
        let map = world(Some(Position::new(5, 5, 0)));
        let mut ai = NpcAi::new(ME, NpcAiConfig::default()).unwrap();
        let mut body = Actor::new(ME, Position::new(7, 5, 0), 100.0).with_health(10.0);

        ai.tick(&body, &map, 0);
        let before = body.position().distance_to(Position::new(5, 5, 0));
        let outcome = ai.process_turn(&mut body, &map, &mut Recorder::default(), 0);

        assert!(matches!(outcome, TurnOutcome::Moved { .. }));
        assert!(body.position().distance_to(Position::new(5, 5, 0)) > before);
    }

    #[test]
    fn cornered_flight_is_blocked() {
        let mut map = world(Some(Position::new(1, 1, 0)));
        map.add_wall(Position::new(0, 1, 0));
        map.add_wall(Position::new(1, 0, 0));
        let mut ai = NpcAi::new(ME, NpcAiConfig::default()).unwrap();
        let mut body = Actor::new(ME, Position::ORIGIN, 100.0).with_health(10.0);

        ai.tick(&body, &map, 0);
        let outcome = ai.process_turn(&mut body, &map, &mut Recorder::default(), 0);
        assert!(outcome.is_blocked());
        assert_eq!(body.position(), Position::ORIGIN);
    }

    #[test]
    fn patrol_advances_one_hop() {
        let map = world(None);
        let mut ai = NpcAi::builder(ME)
            .archetype(presets::passive())
            .strategy(crate::strategy::Strategy::patrol(vec![Position::new(9, 5, 0)]))
            .build()
            .unwrap();
        let mut body = Actor::new(ME, Position::new(5, 5, 0), 100.0);

        ai.tick(&body, &map, 0);
        let outcome = ai.process_turn(&mut body, &map, &mut Recorder::default(), 0);
        assert_eq!(
            outcome,
            TurnOutcome::Moved {
                from: Position::new(5, 5, 0),
                to: Position::new(6, 5, 0),
            }
        );
        assert_eq!(ai.pathfinder().cache_len(), 1);
    }

    #[test]
    fn stale_cached_route_is_searched_again() {
        let mut map = world(None);
        let mut ai = NpcAi::builder(ME)
            .archetype(presets::passive())
            .strategy(crate::strategy::Strategy::patrol(vec![Position::new(9, 5, 0)]))
            .build()
            .unwrap();
        let start = Position::new(5, 5, 0);
        let mut body = Actor::new(ME, start, 100.0);

        ai.tick(&body, &map, 0);
        ai.process_turn(&mut body, &map, &mut Recorder::default(), 0);
        assert!(ai.pathfinder().cache_entry(start, Position::new(9, 5, 0)).is_some());

        // The move did not stick and the tile it went through is now a wall.
        body.set_position(start);
        map.add_wall(Position::new(6, 5, 0));

        ai.tick(&body, &map, 100);
        let outcome = ai.process_turn(&mut body, &map, &mut Recorder::default(), 100);
        assert!(matches!(outcome, TurnOutcome::Moved { .. }));
        assert_ne!(body.position(), Position::new(6, 5, 0));
        assert!(map.is_passable(body.position()));

        let entry = ai.pathfinder().cache_entry(start, Position::new(9, 5, 0)).unwrap();
        assert!(entry.path.points().iter().all(|&p| map.is_passable(p)));
    }
}
