//! Surfcoach backend transport client.
//!
//! This crate wraps the three backend operations the client application
//! consumes — create a session from an uploaded video, fetch a session by
//! id, and send a follow-up chat message — plus the health check, and
//! normalizes every failure into a single error type carrying a
//! human-readable message.
//!
//! # Types
//!
//! - [`CoachApi`] - The trait seam the rest of the application talks through
//! - [`HttpClient`] - Reqwest-backed implementation of [`CoachApi`]
//! - [`VideoUpload`] - Builder describing a video submission
//! - [`SessionReport`] / [`AggregatedError`] - The terminal report payload
//! - [`ClientError`] - Normalized validation/transport error
//!
//! # Example
//!
//! ```no_run
//! use surfcoach_client::{CoachApi, HttpClient, VideoUpload};
//!
//! # async fn example() -> surfcoach_client::Result<()> {
//! let client = HttpClient::new("http://127.0.0.1:8000")?;
//! client.health_check().await?;
//!
//! let summary = client
//!     .create_session(VideoUpload::new("session.mp4").with_skill_level("beginner"))
//!     .await?;
//! println!("session {} is {}", summary.session_id, summary.status);
//! # Ok(())
//! # }
//! ```

mod error;
mod http;
mod types;
mod validate;

pub use error::{ClientError, Result};
pub use http::{CoachApi, HttpClient, VideoUpload, DEFAULT_SERVER_URL};
pub use types::{
    AggregatedError, ChatReply, MetricName, SessionReport, SessionState, SessionStatus,
    SessionSummary, Severity,
};
pub use validate::{
    ensure_supported_extension, ensure_within_size_limit, validate_video, ALLOWED_EXTENSIONS,
    MAX_VIDEO_SIZE_MB,
};
