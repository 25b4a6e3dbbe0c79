//! Named, prioritised behavior policies.
//!
//! A [`Strategy`] pairs an applicability test (a conjunction of predicates)
//! with the node factories of a small behavior tree. Trees are compiled
//! fresh on every [`Strategy::behavior_tree`] call, so compiled trees never
//! share decorator state. The [`StrategyManager`] picks the applicable
//! strategy with the highest priority.
mod combat;
mod manager;
mod patrol;
mod social;
mod survival;

pub use combat::CombatParams;
pub use manager::{StrategyManager, StrategyManagerSnapshot};
pub use patrol::PatrolRoute;
pub use social::{MAX_INTERACTION_COOLDOWN_MS, SocialParams};
pub use survival::SURVIVAL_NEEDS;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use behavior_tree::{BehaviorNode, BehaviorTree, builder};
use game_core::Position;
use serde::{Deserialize, Serialize};

use crate::blackboard::Blackboard;
use crate::error::StrategyError;

/// Built-in policy families.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StrategyKind {
    Combat,
    Survival,
    Social,
    Patrol,
}

impl StrategyKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Combat => "combat",
            StrategyKind::Survival => "survival",
            StrategyKind::Social => "social",
            StrategyKind::Patrol => "patrol",
        }
    }

    pub const fn default_priority(self) -> u8 {
        match self {
            StrategyKind::Survival => 100,
            StrategyKind::Combat => 80,
            StrategyKind::Social => 40,
            StrategyKind::Patrol => 20,
        }
    }

    /// Parses a saved tag.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError::UnknownKind`] for unrecognised tags.
    pub fn parse(tag: &str) -> Result<Self, StrategyError> {
        Self::from_str(tag).map_err(|_| StrategyError::UnknownKind(tag.to_owned()))
    }
}

/// Kind-specific tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StrategyParams {
    Combat(CombatParams),
    Survival,
    Social(SocialParams),
    Patrol(PatrolRoute),
}

impl StrategyParams {
    pub fn default_for(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Combat => Self::Combat(CombatParams::default()),
            StrategyKind::Survival => Self::Survival,
            StrategyKind::Social => Self::Social(SocialParams::default()),
            StrategyKind::Patrol => Self::Patrol(PatrolRoute::default()),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Combat(_) => StrategyKind::Combat,
            Self::Survival => StrategyKind::Survival,
            Self::Social(_) => StrategyKind::Social,
            Self::Patrol(_) => StrategyKind::Patrol,
        }
    }

    pub fn route(&self) -> Option<&PatrolRoute> {
        match self {
            Self::Patrol(route) => Some(route),
            _ => None,
        }
    }

    fn route_mut(&mut self) -> Option<&mut PatrolRoute> {
        match self {
            Self::Patrol(route) => Some(route),
            _ => None,
        }
    }
}

/// Applicability test evaluated against the blackboard.
#[derive(Clone)]
pub struct StrategyPredicate(Arc<dyn Fn(&Blackboard, &StrategyParams) -> bool + Send + Sync>);

impl StrategyPredicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Blackboard, &StrategyParams) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn test(&self, board: &Blackboard, params: &StrategyParams) -> bool {
        (self.0)(board, params)
    }
}

/// Produces one top-level node of a strategy's tree.
#[derive(Clone)]
pub struct NodeFactory(Arc<dyn Fn(&StrategyParams) -> BehaviorNode<Blackboard> + Send + Sync>);

impl NodeFactory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&StrategyParams) -> BehaviorNode<Blackboard> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn build(&self, params: &StrategyParams) -> BehaviorNode<Blackboard> {
        (self.0)(params)
    }
}

/// A named policy with priority, applicability predicates and tree nodes.
#[derive(Clone)]
pub struct Strategy {
    kind: StrategyKind,
    priority: u8,
    params: StrategyParams,
    predicates: Vec<StrategyPredicate>,
    nodes: Vec<NodeFactory>,
}

/// Plain key-value export of a [`Strategy`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategySnapshot {
    pub kind: String,
    pub priority: u8,
    #[serde(default)]
    pub parameters: BTreeMap<String, f32>,
    #[serde(default)]
    pub route: Vec<Position>,
    #[serde(default)]
    pub waypoint: usize,
}

impl Strategy {
    /// The built-in policy for `params`' kind at its default priority.
    pub fn from_params(params: StrategyParams) -> Self {
        let kind = params.kind();
        let (predicates, nodes) = match kind {
            StrategyKind::Combat => (combat::predicates(), combat::nodes()),
            StrategyKind::Survival => (survival::predicates(), survival::nodes()),
            StrategyKind::Social => (social::predicates(), social::nodes()),
            StrategyKind::Patrol => (patrol::predicates(), patrol::nodes()),
        };
        Self {
            kind,
            priority: kind.default_priority(),
            params,
            predicates,
            nodes,
        }
    }

    pub fn combat(params: CombatParams) -> Self {
        Self::from_params(StrategyParams::Combat(params))
    }

    pub fn survival() -> Self {
        Self::from_params(StrategyParams::Survival)
    }

    pub fn social(params: SocialParams) -> Self {
        Self::from_params(StrategyParams::Social(params))
    }

    pub fn patrol(waypoints: Vec<Position>) -> Self {
        Self::from_params(StrategyParams::Patrol(PatrolRoute::new(waypoints)))
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Adds an applicability predicate; all predicates must hold.
    #[must_use]
    pub fn with_condition<F>(mut self, f: F) -> Self
    where
        F: Fn(&Blackboard, &StrategyParams) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(StrategyPredicate::new(f));
        self
    }

    /// Inserts a top-level node ahead of the built-in ones.
    #[must_use]
    pub fn with_node<F>(mut self, f: F) -> Self
    where
        F: Fn(&StrategyParams) -> BehaviorNode<Blackboard> + Send + Sync + 'static,
    {
        self.nodes.insert(0, NodeFactory::new(f));
        self
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    pub fn is_applicable(&self, board: &Blackboard) -> bool {
        self.predicates.iter().all(|p| p.test(board, &self.params))
    }

    /// Compiles a fresh tree: a selector over this strategy's nodes.
    pub fn behavior_tree(&self) -> BehaviorTree<Blackboard> {
        let children = self.nodes.iter().map(|f| f.build(&self.params)).collect();
        BehaviorTree::new(self.name(), builder::selector(self.name(), children))
    }

    /// Current patrol waypoint; `None` for other kinds or an empty route.
    pub fn current_waypoint(&self) -> Option<Position> {
        self.params.route().and_then(PatrolRoute::current)
    }

    /// Moves the patrol cursor to the next waypoint and returns it.
    pub fn advance_waypoint(&mut self) -> Option<Position> {
        self.params.route_mut().and_then(PatrolRoute::advance)
    }

    pub fn snapshot(&self) -> StrategySnapshot {
        let mut parameters = BTreeMap::new();
        let mut route = Vec::new();
        let mut waypoint = 0;
        match &self.params {
            StrategyParams::Combat(p) => {
                parameters.insert("aggressiveness".to_owned(), p.aggressiveness);
                parameters.insert("retreat_threshold".to_owned(), p.retreat_threshold);
            }
            StrategyParams::Social(p) => {
                parameters.insert("trade_interest".to_owned(), p.trade_interest);
            }
            StrategyParams::Patrol(r) => {
                route = r.waypoints.clone();
                waypoint = r.cursor;
            }
            StrategyParams::Survival => {}
        }
        StrategySnapshot {
            kind: self.kind.to_string(),
            priority: self.priority,
            parameters,
            route,
            waypoint,
        }
    }

    /// Rebuilds a built-in strategy from its export.
    ///
    /// # Errors
    ///
    /// Fails on an unknown kind tag or out-of-range parameters.
    pub fn from_snapshot(snapshot: &StrategySnapshot) -> Result<Self, StrategyError> {
        let params = params_from_snapshot(snapshot)?;
        Ok(Self::from_params(params).with_priority(snapshot.priority))
    }

    /// Applies an export of the same kind, keeping custom predicates and nodes.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot is malformed or of another kind.
    pub fn restore(&mut self, snapshot: &StrategySnapshot) -> Result<(), StrategyError> {
        let params = params_from_snapshot(snapshot)?;
        if params.kind() != self.kind {
            return Err(StrategyError::InvalidParameter {
                name: "kind",
                reason: format!("expected {}, found {}", self.kind, snapshot.kind),
            });
        }
        self.params = params;
        self.priority = snapshot.priority;
        Ok(())
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy")
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .field("params", &self.params)
            .field("predicates", &self.predicates.len())
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

fn params_from_snapshot(snapshot: &StrategySnapshot) -> Result<StrategyParams, StrategyError> {
    let kind = StrategyKind::parse(&snapshot.kind)?;
    let value = |name: &str, default: f32| snapshot.parameters.get(name).copied().unwrap_or(default);

    Ok(match kind {
        StrategyKind::Combat => {
            let defaults = CombatParams::default();
            StrategyParams::Combat(CombatParams::new(
                value("aggressiveness", defaults.aggressiveness),
                value("retreat_threshold", defaults.retreat_threshold),
            )?)
        }
        StrategyKind::Survival => StrategyParams::Survival,
        StrategyKind::Social => StrategyParams::Social(SocialParams::new(value(
            "trade_interest",
            SocialParams::default().trade_interest,
        ))?),
        StrategyKind::Patrol => {
            let len = snapshot.route.len();
            if snapshot.waypoint >= len.max(1) {
                return Err(StrategyError::InvalidParameter {
                    name: "waypoint",
                    reason: format!("index {} out of route of {len}", snapshot.waypoint),
                });
            }
            StrategyParams::Patrol(PatrolRoute {
                waypoints: snapshot.route.clone(),
                cursor: snapshot.waypoint,
            })
        }
    })
}

fn check_unit(name: &'static str, value: f32) -> Result<(), StrategyError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(StrategyError::InvalidParameter {
            name,
            reason: format!("{value} is outside [0, 1]"),
        })
    }
}
