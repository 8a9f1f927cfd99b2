//! Session lifecycle for the Surfcoach client.
//!
//! The application moves through a single flow at a time:
//! upload → processing → results, with every failure returning to upload
//! carrying a dismissible error. This crate owns that state machine:
//!
//! - [`LifecycleController`] - Sole mutator of the [`LifecycleState`],
//!   observable through a watch channel
//! - [`poll_until_terminal`] - The fixed-cadence polling protocol with
//!   strict cancellation semantics
//! - [`ChatSession`] - Follow-up conversation over a completed report
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use surfcoach_client::HttpClient;
//! use surfcoach_session::{LifecycleController, Phase};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(HttpClient::new("http://127.0.0.1:8000")?);
//! let controller = LifecycleController::new(api);
//! let mut updates = controller.subscribe();
//!
//! controller.session_created("abc123").await?;
//! updates.wait_for(|state| state.phase() != Phase::Processing).await?;
//! # Ok(())
//! # }
//! ```

mod chat;
mod controller;
mod error;
mod poller;

pub use chat::{ChatMessage, ChatRole, ChatSession, SendOutcome};
pub use controller::{LifecycleController, LifecycleState, Phase};
pub use error::LifecycleError;
pub use poller::{poll_until_terminal, PollOutcome, PollerConfig, ANALYSIS_FAILED_MESSAGE};
