//! The tick loop.
//!
//! Each tick scripted entities take one step along their routes, then every
//! living agent ticks its controller and executes one turn. Hits are applied
//! after all agents have acted, so agents are processed in a fixed order but
//! none of them sees the effects of another's attack until the next tick.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use behavior_tree::Status;
use game_core::{
    Actor, AgentBody, AttackOutcome, CombatResolver, EntityId, EntityInfo, GridMap, Perceivable,
    Position,
};
use npc_ai::{AiActionKind, AiState, NpcAi, NpcAiSnapshot, TurnOutcome};
use serde::Serialize;
use tracing::{debug, info};

use crate::scenario::{Scenario, position};

/// Combat collaborator: every attack on a living target lands for a fixed amount.
struct FixedDamage<'a> {
    damage: f32,
    alive: &'a dyn Fn(EntityId) -> bool,
    hits: Vec<(EntityId, f32)>,
}

impl CombatResolver for FixedDamage<'_> {
    fn resolve_attack(&mut self, attacker: EntityId, target: EntityId) -> AttackOutcome {
        if attacker == target || !(self.alive)(target) {
            return AttackOutcome::Rejected;
        }
        self.hits.push((target, self.damage));
        AttackOutcome::Hit {
            damage: self.damage,
        }
    }
}

struct Agent {
    ai: NpcAi,
    body: Actor,
    tally: BTreeMap<String, u32>,
}

struct Scripted {
    info: EntityInfo,
    health: f32,
    route: Vec<Position>,
}

pub struct Simulation {
    map: GridMap,
    agents: Vec<Agent>,
    scripted: Vec<Scripted>,
    tick: u64,
    tick_ms: u64,
    attack_damage: f32,
    needs_per_tick: (f32, f32, f32),
}

/// End-of-run summary of one agent.
#[derive(Debug, Serialize)]
pub struct AgentReport {
    pub id: EntityId,
    pub position: Position,
    pub health: f32,
    pub state: AiState,
    pub strategy: Option<String>,
    pub last_status: Option<Status>,
    pub actions: BTreeMap<String, u32>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub ticks: u64,
    pub agents: Vec<AgentReport>,
    pub survivors: Vec<EntityId>,
}

impl Simulation {
    pub fn new(scenario: &Scenario) -> Result<Self> {
        let mut map = scenario.build_map()?;
        let config = scenario.agent_config();

        let mut agents = Vec::with_capacity(scenario.agents.len());
        for spec in &scenario.agents {
            let id = EntityId(spec.id);
            let mut body = Actor::new(id, position(spec.position), spec.max_health)
                .with_survival(spec.survival());
            if let Some(health) = spec.health {
                body = body.with_health(health);
            }
            map.insert_entity(EntityInfo::new(id, body.position()))
                .with_context(|| format!("Failed to place agent {}", spec.id))?;

            let ai = NpcAi::builder(id)
                .config(config.clone())
                .archetype(spec.archetype())
                .strategies(spec.strategies()?)
                .build()
                .with_context(|| format!("Failed to build agent {}", spec.id))?;
            agents.push(Agent {
                ai,
                body,
                tally: BTreeMap::new(),
            });
        }

        let scripted = scenario
            .entities
            .iter()
            .map(|spec| Scripted {
                info: spec.info(),
                health: spec.health,
                route: spec.route.iter().copied().map(position).collect(),
            })
            .collect();

        info!(
            scenario = %scenario.name,
            agents = agents.len(),
            entities = scenario.entities.len(),
            "simulation ready"
        );

        Ok(Self {
            map,
            agents,
            scripted,
            tick: 0,
            tick_ms: scenario.tick_ms,
            attack_damage: scenario.attack_damage,
            needs_per_tick: scenario.needs_per_tick,
        })
    }

    pub fn now(&self) -> u64 {
        self.tick * self.tick_ms
    }

    pub fn run(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// Advances the world by one tick.
    pub fn step(&mut self) -> Result<()> {
        let now = self.now();
        self.map.settle();
        self.move_scripted()?;

        let living: Vec<EntityId> = self.map.entities().iter().map(|e| e.id).collect();
        let alive = |id: EntityId| living.contains(&id);
        let mut combat = FixedDamage {
            damage: self.attack_damage,
            alive: &alive,
            hits: Vec::new(),
        };

        for agent in self.agents.iter_mut().filter(|a| !a.body.is_dead()) {
            grow_needs(&mut agent.body, self.needs_per_tick);

            let Some(decision) = agent.ai.tick(&agent.body, &self.map, now).copied() else {
                continue;
            };
            let outcome = agent
                .ai
                .process_turn(&mut agent.body, &self.map, &mut combat, now);
            self.map
                .move_entity(agent.body.id(), agent.body.position())
                .context("Agent left the map")?;
            if let TurnOutcome::Acknowledged(kind) = outcome {
                tend(&mut agent.body, kind);
            }
            agent.ai.pathfinder_mut().maintain_cache(now);
            *agent.tally.entry(decision.kind().to_string()).or_default() += 1;

            info!(
                tick = self.tick,
                agent = %agent.body.id(),
                action = %decision.kind(),
                priority = decision.priority(),
                state = %agent.ai.state(),
                outcome = ?outcome,
                "turn"
            );
        }

        let hits = std::mem::take(&mut combat.hits);
        self.apply_hits(hits);
        self.tick += 1;
        Ok(())
    }

    fn move_scripted(&mut self) -> Result<()> {
        for entity in &mut self.scripted {
            if entity.route.is_empty() || entity.health <= 0.0 {
                continue;
            }
            let index = usize::try_from(self.tick).unwrap_or(usize::MAX) % entity.route.len();
            let to = entity.route[index];
            if to != entity.info.position && !self.map.occupants(to).is_empty() {
                continue;
            }
            self.map
                .move_entity(entity.info.id, to)
                .with_context(|| format!("Scripted entity {} left the map", entity.info.id))?;
            entity.info.position = to;
        }
        Ok(())
    }

    fn apply_hits(&mut self, hits: Vec<(EntityId, f32)>) {
        let mut totals: HashMap<EntityId, f32> = HashMap::new();
        for (target, damage) in hits {
            *totals.entry(target).or_default() += damage;
        }

        for (target, damage) in totals {
            if let Some(agent) = self.agents.iter_mut().find(|a| a.body.id() == target) {
                agent.body.health = (agent.body.health - damage).max(0.0);
                debug!(%target, damage, health = agent.body.health, "agent hit");
                if agent.body.is_dead() {
                    self.map.remove_entity(target);
                    info!(%target, "agent died");
                }
            } else if let Some(entity) = self.scripted.iter_mut().find(|e| e.info.id == target) {
                entity.health = (entity.health - damage).max(0.0);
                debug!(%target, damage, health = entity.health, "entity hit");
                if entity.health <= 0.0 {
                    self.map.remove_entity(target);
                    info!(%target, "entity destroyed");
                }
            }
        }
    }

    pub fn report(&self) -> Report {
        Report {
            ticks: self.tick,
            agents: self
                .agents
                .iter()
                .map(|agent| AgentReport {
                    id: agent.body.id(),
                    position: agent.body.position(),
                    health: agent.body.health(),
                    state: agent.ai.state(),
                    strategy: agent.ai.active_strategy().map(|k| k.to_string()),
                    last_status: agent.ai.last_status(),
                    actions: agent.tally.clone(),
                })
                .collect(),
            survivors: self.map.entities().iter().map(|e| e.id).collect(),
        }
    }

    pub fn snapshots(&self) -> Vec<NpcAiSnapshot> {
        self.agents.iter().map(|agent| agent.ai.snapshot()).collect()
    }

    pub fn body(&self, id: EntityId) -> Option<&Actor> {
        self.agents.iter().map(|a| &a.body).find(|b| b.id() == id)
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }
}

fn grow_needs(body: &mut Actor, (hunger, thirst, fatigue): (f32, f32, f32)) {
    let survival = &mut body.survival;
    survival.hunger = (survival.hunger + hunger).min(100.0);
    survival.thirst = (survival.thirst + thirst).min(100.0);
    survival.fatigue = (survival.fatigue + fatigue).min(100.0);
}

/// Survival effects of acknowledged actions.
fn tend(body: &mut Actor, kind: AiActionKind) {
    let survival = &mut body.survival;
    match kind {
        AiActionKind::Eat => survival.hunger = 0.0,
        AiActionKind::Drink => survival.thirst = 0.0,
        AiActionKind::Sleep => survival.fatigue = 0.0,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::SurvivalNeedsProvider;

    fn scenario(source: &str) -> Simulation {
        Simulation::new(&Scenario::parse(source).unwrap()).unwrap()
    }

    #[test]
    fn guard_destroys_static_intruder() {
        let mut sim = scenario(
            r#"Scenario(
                map: (width: 10, height: 5),
                entities: [(id: 9, position: (6, 2, 0), hostile: true, health: 20.0)],
                agents: [(id: 1, position: (2, 2, 0), archetype: Guard(flee_threshold: 0.3))],
                attack_damage: 10.0,
            )"#,
        );
        sim.run(4).unwrap();
        assert_eq!(sim.body(EntityId(1)).unwrap().position(), Position::new(5, 2, 0));
        assert_eq!(sim.report().agents[0].actions.get("attack"), Some(&1));

        sim.run(4).unwrap();
        let report = sim.report();
        assert_eq!(report.ticks, 8);
        assert_eq!(report.survivors, vec![EntityId(1)]);
        assert!(report.agents[0].actions["attack"] >= 2);
    }

    #[test]
    fn thirsty_villager_drinks() {
        let mut sim = scenario(
            r#"Scenario(
                map: (width: 6, height: 6),
                agents: [(id: 1, position: (2, 2, 0), archetype: Villager, survival: (0.0, 95.0, 0.0))],
            )"#,
        );
        sim.step().unwrap();

        let body = sim.body(EntityId(1)).unwrap();
        assert_eq!(body.thirst(), 0.0);
        assert_eq!(sim.report().agents[0].actions.get("drink"), Some(&1));
    }

    #[test]
    fn scripted_entities_follow_their_route() {
        let mut sim = scenario(
            r#"Scenario(
                map: (width: 8, height: 8),
                entities: [(id: 9, position: (6, 6, 0), route: [(6, 6, 0), (6, 5, 0), (5, 5, 0)])],
                agents: [(id: 1, position: (0, 0, 0))],
            )"#,
        );
        sim.run(3).unwrap();
        assert_eq!(sim.map().position_of(EntityId(9)), Some(Position::new(5, 5, 0)));
        assert_eq!(sim.snapshots().len(), 1);
    }
}
