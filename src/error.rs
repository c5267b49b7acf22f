//! Engine error type.
//!
//! Only fatal conditions are errors. A vetoed event (`prevented`) and a
//! trigger whose condition is not satisfied are normal outcomes and are
//! reported through results, never through [`EngineError`].

use crate::core::EntityId;
use crate::responses::ChoiceId;

/// Errors that abort the action being resolved.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Trigger recursion went past the configured depth bound.
    #[error("event recursion depth {depth} exceeds maximum {max_depth}")]
    DepthExceeded {
        /// Depth that was attempted.
        depth: u32,
        /// Configured bound.
        max_depth: u32,
    },

    /// An expression called a function missing from the function table.
    #[error("unknown function: {name}")]
    UnknownFunction {
        /// Name that failed to resolve.
        name: String,
    },

    /// A function rejected its arguments.
    #[error("invalid argument to {function}: {reason}")]
    InvalidArgument {
        /// Function being called.
        function: String,
        /// What was wrong.
        reason: String,
    },

    /// An expression produced a value of the wrong shape for its use site.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected shape.
        expected: &'static str,
        /// Value that was found.
        found: String,
    },

    /// A choice was offered while another one is still waiting.
    #[error("choice {existing} is already pending")]
    ChoiceAlreadyPending {
        /// The choice currently waiting for an answer.
        existing: ChoiceId,
    },

    /// A submission referenced a choice that is not pending (never offered,
    /// or already resolved).
    #[error("choice {id} is not pending")]
    ChoiceNotPending {
        /// Submitted choice id.
        id: ChoiceId,
    },

    /// A submission picked an option the choice does not offer.
    #[error("selection {selection:?} is not an option of choice {id}")]
    InvalidSelection {
        /// Choice being answered.
        id: ChoiceId,
        /// Rejected selection.
        selection: String,
    },

    /// An action referenced an entity that is not in the game.
    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),

    /// An action is not legal in the current state.
    #[error("invalid action: {reason}")]
    InvalidAction {
        /// Why the action was rejected.
        reason: String,
    },

    /// Engine configuration failed to load or validate.
    #[error("configuration error: {0}")]
    Config(String),

    /// A session failed to serialize or deserialize.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidAction`].
    pub fn invalid_action(reason: impl Into<String>) -> Self {
        Self::InvalidAction {
            reason: reason.into(),
        }
    }

    /// True for the recursion guard, which callers may want to report
    /// differently from content errors.
    #[must_use]
    pub fn is_depth_exceeded(&self) -> bool {
        matches!(self, Self::DepthExceeded { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
