//! Error types of the NPC stack.
//!
//! Expected outcomes (no path, no applicable strategy) are values, not
//! errors. The types here cover search failures reported with a reason,
//! construction mistakes and malformed saved data.

use behavior_tree::TreeError;
use game_core::{ErrorSeverity, GameError, Position};

/// Why a path search did not produce a path.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("start position {0} is blocked")]
    StartBlocked(Position),

    #[error("end position {0} is blocked")]
    EndBlocked(Position),

    #[error("position {0} is outside the map")]
    OutOfBounds(Position),

    #[error("path cost exceeds maximum of {max_cost}")]
    MaxCostExceeded { max_cost: f32 },

    #[error("search gave up after {expansions} expansions")]
    SearchLimitReached { expansions: usize },

    #[error("no path found")]
    NoPath,
}

impl GameError for PathError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            PathError::OutOfBounds(_) => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PathError::StartBlocked(_) => "PATH_START_BLOCKED",
            PathError::EndBlocked(_) => "PATH_END_BLOCKED",
            PathError::OutOfBounds(_) => "PATH_OUT_OF_BOUNDS",
            PathError::MaxCostExceeded { .. } => "PATH_MAX_COST_EXCEEDED",
            PathError::SearchLimitReached { .. } => "PATH_SEARCH_LIMIT",
            PathError::NoPath => "PATH_NOT_FOUND",
        }
    }
}

/// Strategy construction and import errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    #[error("unknown strategy kind '{0}'")]
    UnknownKind(String),

    #[error("strategy '{0}' is already registered")]
    DuplicateKind(String),

    #[error("invalid strategy parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl GameError for StrategyError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            StrategyError::UnknownKind(_) => ErrorSeverity::Fatal,
            StrategyError::DuplicateKind(_) | StrategyError::InvalidParameter { .. } => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            StrategyError::UnknownKind(_) => "STRATEGY_UNKNOWN_KIND",
            StrategyError::DuplicateKind(_) => "STRATEGY_DUPLICATE_KIND",
            StrategyError::InvalidParameter { .. } => "STRATEGY_INVALID_PARAMETER",
        }
    }
}

/// Configuration loading errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("invalid configuration value {field}: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

impl ConfigError {
    pub(crate) const fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

impl GameError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Parse(_) => "CONFIG_PARSE",
            ConfigError::Invalid { .. } => "CONFIG_INVALID",
        }
    }
}

/// Top-level error of the controller and its snapshot import/export.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("snapshot (de)serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("snapshot belongs to agent {found}, expected {expected}")]
    AgentMismatch {
        expected: game_core::EntityId,
        found: game_core::EntityId,
    },
}

impl GameError for AiError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            AiError::Tree(_) | AiError::Snapshot(_) => ErrorSeverity::Fatal,
            AiError::Strategy(e) => e.severity(),
            AiError::Config(e) => e.severity(),
            AiError::AgentMismatch { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AiError::Tree(TreeError::MissingRoot(_)) => "TREE_MISSING_ROOT",
            AiError::Tree(TreeError::UnknownNode(_)) => "TREE_UNKNOWN_NODE",
            AiError::Tree(TreeError::ShapeMismatch { .. }) => "TREE_SHAPE_MISMATCH",
            AiError::Strategy(e) => e.error_code(),
            AiError::Config(e) => e.error_code(),
            AiError::Snapshot(_) => "AI_SNAPSHOT",
            AiError::AgentMismatch { .. } => "AI_AGENT_MISMATCH",
        }
    }
}
