//! Error classification shared by the workspace, plus [`WorldError`] for the
//! in-memory world.
//!
//! Expected outcomes of play (a missed attack, an unreachable tile) are
//! values. Error types are reserved for bad input and broken data.

use crate::state::{EntityId, Position};

/// How a caller should react to an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Try again later or pick another action (blocked tile, no route).
    Recoverable,
    /// The request itself is wrong (out of bounds, out-of-range parameter).
    Validation,
    /// State that should be impossible.
    Internal,
    /// Construction or save data is unusable.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Internal and fatal errors point at a bug or corrupt data.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Implemented by every error enum in the workspace.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for logs; defaults to the type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised by [`crate::GridMap`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("position {0} is out of map bounds")]
    OutOfBounds(Position),

    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
}

impl GameError for WorldError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            WorldError::OutOfBounds(_) => "WORLD_OUT_OF_BOUNDS",
            WorldError::UnknownEntity(_) => "WORLD_UNKNOWN_ENTITY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_errors_are_validation() {
        let err = WorldError::OutOfBounds(Position::new(-1, 0, 0));
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert!(!err.severity().is_recoverable());
        assert!(!err.severity().is_internal());
        assert_eq!(err.error_code(), "WORLD_OUT_OF_BOUNDS");
        assert_eq!(err.to_string(), "position (-1, 0, 0) is out of map bounds");
    }

    #[test]
    fn fatal_counts_as_internal() {
        assert!(ErrorSeverity::Fatal.is_internal());
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert_eq!(ErrorSeverity::Fatal.as_str(), "fatal");
    }
}
