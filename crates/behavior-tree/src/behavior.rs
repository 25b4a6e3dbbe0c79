//! Core behavior trait.
//!
//! This module defines the [`Behavior`] trait, the callback abstraction behind
//! action leaves. The trait is generic over a context type `C`, allowing
//! leaves to read the blackboard and record their side effects on it.

use crate::Status;

/// A side-effecting leaf callback that can be evaluated against a context.
pub trait Behavior<C>: Send + Sync {
    /// Evaluate this behavior against the given context.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Mutable reference to the context/blackboard. Leaves can read
    ///   game state and modify it (e.g., to store the action they chose).
    ///
    /// # Returns
    ///
    /// The status declared by the leaf itself. Returning `Running` tells the
    /// enclosing composite that the leaf expects to be ticked again.
    fn tick(&self, ctx: &mut C) -> Status;
}

/// Blanket implementation for boxed behaviors.
///
/// This allows `Box<dyn Behavior<C>>` to also implement `Behavior<C>`,
/// enabling dynamic dispatch and heterogeneous collections of leaves.
impl<C> Behavior<C> for Box<dyn Behavior<C>> {
    #[inline]
    fn tick(&self, ctx: &mut C) -> Status {
        (**self).tick(ctx)
    }
}

/// Adapter turning a closure into a [`Behavior`].
pub struct FnBehavior<F> {
    f: F,
}

impl<F> FnBehavior<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<C, F> Behavior<C> for FnBehavior<F>
where
    F: Fn(&mut C) -> Status + Send + Sync,
{
    #[inline]
    fn tick(&self, ctx: &mut C) -> Status {
        (self.f)(ctx)
    }
}
