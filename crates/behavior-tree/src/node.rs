//! Behavior node definition and dispatch.
//!
//! A [`BehaviorNode`] is a tagged variant ([`NodeKind`]) plus the attributes
//! shared by every node: id, display name, owned children and an optional
//! guard. Nodes themselves are immutable during execution; all mutable
//! decorator state goes through the [`Frame`].

use crate::state::{Frame, NodeId};
use crate::{composite, decorator, Behavior, Status};

/// Read-only predicate used by conditions and guards.
pub type Predicate<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;

/// How a `Parallel` node combines the statuses of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParallelPolicy {
    /// Any Success ⇒ Success, else any Running ⇒ Running, else Failure.
    RequireOne,
    /// Any Failure ⇒ Failure, else any Running ⇒ Running, else Success.
    RequireAll,
    /// Success iff more than half succeeded, else Running if any Running, else Failure.
    RequireSuccess,
}

/// Node-type tag and type-specific configuration.
pub enum NodeKind<C> {
    Selector,
    Sequence,
    Parallel(ParallelPolicy),
    Inverter,
    /// Repeats its child `count` times; `-1` repeats until the child stops succeeding.
    Repeater {
        count: i32,
    },
    Retry {
        max_retries: u32,
    },
    Cooldown {
        cooldown_ms: u64,
    },
    Condition(Predicate<C>),
    Action(Box<dyn Behavior<C>>),
}

impl<C> NodeKind<C> {
    pub const fn label(&self) -> &'static str {
        match self {
            NodeKind::Selector => "selector",
            NodeKind::Sequence => "sequence",
            NodeKind::Parallel(_) => "parallel",
            NodeKind::Inverter => "inverter",
            NodeKind::Repeater { .. } => "repeater",
            NodeKind::Retry { .. } => "retry",
            NodeKind::Cooldown { .. } => "cooldown",
            NodeKind::Condition(_) => "condition",
            NodeKind::Action(_) => "action",
        }
    }

    /// Decorators must own exactly one child.
    pub const fn is_decorator(&self) -> bool {
        matches!(
            self,
            NodeKind::Inverter
                | NodeKind::Repeater { .. }
                | NodeKind::Retry { .. }
                | NodeKind::Cooldown { .. }
        )
    }

    /// Leaves must own no children.
    pub const fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Condition(_) | NodeKind::Action(_))
    }
}

impl<C> std::fmt::Debug for NodeKind<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Parallel(policy) => write!(f, "Parallel({policy:?})"),
            NodeKind::Repeater { count } => write!(f, "Repeater({count})"),
            NodeKind::Retry { max_retries } => write!(f, "Retry({max_retries})"),
            NodeKind::Cooldown { cooldown_ms } => write!(f, "Cooldown({cooldown_ms}ms)"),
            other => f.write_str(other.label()),
        }
    }
}

/// One node of a behavior tree.
pub struct BehaviorNode<C> {
    pub(crate) id: NodeId,
    name: String,
    kind: NodeKind<C>,
    children: Vec<BehaviorNode<C>>,
    guard: Option<Predicate<C>>,
}

impl<C> BehaviorNode<C> {
    /// Creates a node of any kind with an explicit child list.
    ///
    /// No arity check happens here: a decorator built with zero or several
    /// children evaluates to [`Status::Invalid`] instead of panicking.
    pub fn new(name: impl Into<String>, kind: NodeKind<C>, children: Vec<BehaviorNode<C>>) -> Self {
        Self {
            id: NodeId::default(),
            name: name.into(),
            kind,
            children,
            guard: None,
        }
    }

    /// Attaches a guard checked before type-specific dispatch.
    pub fn with_guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Box::new(guard));
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind<C> {
        &self.kind
    }

    pub fn children(&self) -> &[BehaviorNode<C>] {
        &self.children
    }

    pub fn has_guard(&self) -> bool {
        self.guard.is_some()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    /// Assigns pre-order ids starting at `next`; returns the next free id.
    pub(crate) fn assign_ids(&mut self, next: u32) -> u32 {
        self.id = NodeId(next);
        let mut next = next + 1;
        for child in &mut self.children {
            next = child.assign_ids(next);
        }
        next
    }

    /// Visits every node of the subtree in pre-order.
    pub(crate) fn visit(&self, f: &mut dyn FnMut(&BehaviorNode<C>)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    /// Evaluates this node against `ctx`.
    ///
    /// The guard, if present, is checked first; a failing guard yields
    /// `Failure` without touching any child.
    pub fn execute(&self, ctx: &mut C, frame: &mut Frame<'_>) -> Status {
        if let Some(guard) = &self.guard
            && !guard(ctx)
        {
            tracing::trace!(node = %self.id, name = %self.name, "guard rejected");
            return Status::Failure;
        }

        if self.kind.is_decorator() && self.children.len() != 1 {
            tracing::warn!(
                node = %self.id,
                name = %self.name,
                kind = self.kind.label(),
                children = self.children.len(),
                "decorator requires exactly one child"
            );
            return Status::Invalid;
        }

        if self.kind.is_leaf() && !self.children.is_empty() {
            tracing::warn!(
                node = %self.id,
                name = %self.name,
                kind = self.kind.label(),
                "leaf node must not own children"
            );
            return Status::Invalid;
        }

        let status = match &self.kind {
            NodeKind::Selector => composite::selector(&self.children, ctx, frame),
            NodeKind::Sequence => composite::sequence(&self.children, ctx, frame),
            NodeKind::Parallel(policy) => composite::parallel(*policy, &self.children, ctx, frame),
            NodeKind::Inverter => decorator::inverter(&self.children[0], ctx, frame),
            NodeKind::Repeater { count } => {
                decorator::repeater(self.id, *count, &self.children[0], ctx, frame)
            }
            NodeKind::Retry { max_retries } => {
                decorator::retry(self.id, *max_retries, &self.children[0], ctx, frame)
            }
            NodeKind::Cooldown { cooldown_ms } => {
                decorator::cooldown(self.id, *cooldown_ms, &self.children[0], ctx, frame)
            }
            NodeKind::Condition(predicate) => {
                if predicate(ctx) {
                    Status::Success
                } else {
                    Status::Failure
                }
            }
            NodeKind::Action(behavior) => behavior.tick(ctx),
        };

        tracing::trace!(node = %self.id, name = %self.name, status = status.as_str(), "node evaluated");
        status
    }
}

impl<C> std::fmt::Debug for BehaviorNode<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("guard", &self.guard.is_some())
            .field("children", &self.children)
            .finish()
    }
}
