//! Error type for backend transport operations.
//!
//! Every failure a caller can see is normalized into [`ClientError`] carrying
//! a human-readable message: validation failures are raised locally before
//! any request is sent, and everything the wire can do wrong collapses into
//! the transport variant.

/// A specialized `Result` type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by the transport client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The video was rejected client-side before any request was sent.
    #[error("{message}")]
    Validation {
        /// Why the video was rejected.
        message: String,
    },

    /// A backend call failed: non-success response, unparseable body, or a
    /// network-level failure.
    #[error("{message}")]
    Transport {
        /// Human-readable description, preferring the backend's own
        /// explanation over a synthesized one.
        message: String,
    },
}

impl ClientError {
    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns the user-facing message carried by this error.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message } | Self::Transport { message } => message,
        }
    }

    /// Returns `true` if this error was raised before any request was sent.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
