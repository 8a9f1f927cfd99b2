//! Error types for lifecycle transitions.

use crate::controller::Phase;

/// A specialized `Result` type for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Errors raised when a lifecycle transition cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The requested transition is not legal from the current state.
    #[error("Invalid state transition: cannot go from {from} to {to}")]
    InvalidTransition {
        /// The current lifecycle phase.
        from: Phase,
        /// The attempted target phase.
        to: Phase,
    },

    /// A poll outcome arrived for a session that is no longer the active
    /// flow. Stale outcomes are discarded, never applied.
    #[error("Stale outcome for session '{session_id}'")]
    StaleOutcome {
        /// Id of the superseded session.
        session_id: String,
    },
}

impl LifecycleError {
    /// Creates a new `InvalidTransition` error.
    #[must_use]
    pub const fn invalid_transition(from: Phase, to: Phase) -> Self {
        Self::InvalidTransition { from, to }
    }

    /// Creates a new `StaleOutcome` error.
    #[must_use]
    pub fn stale_outcome(session_id: impl Into<String>) -> Self {
        Self::StaleOutcome {
            session_id: session_id.into(),
        }
    }
}
