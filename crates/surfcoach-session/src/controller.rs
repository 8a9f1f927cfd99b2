//! Lifecycle state machine for the single active analysis flow.
//!
//! The controller owns the current screen state and is its sole mutator.
//! Upload success hands it a session id; it then spawns a poller whose
//! terminal outcome feeds back in as [`LifecycleController::complete`] or
//! [`LifecycleController::fail`]. Starting a new flow or resetting always
//! cancels the previous poller first, so at most one live poller exists and
//! a stale poll can never mutate a newer flow.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use surfcoach_client::{CoachApi, SessionReport};

use crate::error::{LifecycleError, Result};
use crate::poller::{poll_until_terminal, PollOutcome, PollerConfig};

// ============================================================================
// LifecycleState
// ============================================================================

/// The coarse phase of the lifecycle, used in transition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a video submission; may carry an error to display.
    Upload,
    /// A session is being analyzed.
    Processing,
    /// A completed report is on screen.
    Results,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload => write!(f, "upload"),
            Self::Processing => write!(f, "processing"),
            Self::Results => write!(f, "results"),
        }
    }
}

/// The single active lifecycle state.
///
/// Exactly one of these exists at a time; a report exists if and only if
/// the state is `Results`.
#[derive(Debug, Clone)]
pub enum LifecycleState {
    /// Initial state. Carries the error from a failed flow, if any.
    Upload {
        /// Dismissible error message from the previous flow.
        error: Option<String>,
    },
    /// An analysis session is running.
    Processing {
        /// Id of the session being polled.
        session_id: String,
    },
    /// The analysis completed.
    Results {
        /// Id of the completed session.
        session_id: String,
        /// The report, stored exactly as received.
        report: SessionReport,
    },
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::Upload { error: None }
    }
}

impl LifecycleState {
    /// Returns the coarse phase of this state.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Upload { .. } => Phase::Upload,
            Self::Processing { .. } => Phase::Processing,
            Self::Results { .. } => Phase::Results,
        }
    }

    /// Returns the displayed error, if the state carries one.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Upload { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Returns the active session id, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Upload { .. } => None,
            Self::Processing { session_id } | Self::Results { session_id, .. } => Some(session_id),
        }
    }

    /// Returns the stored report, if the state is `Results`.
    #[must_use]
    pub const fn report(&self) -> Option<&SessionReport> {
        match self {
            Self::Results { report, .. } => Some(report),
            _ => None,
        }
    }
}

// ============================================================================
// LifecycleController
// ============================================================================

/// Handle to the poller task of the active flow.
struct ActivePoller {
    session_id: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owner and sole mutator of the lifecycle state.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct LifecycleController {
    api: Arc<dyn CoachApi>,
    config: PollerConfig,
    state: Arc<Mutex<LifecycleState>>,
    watch_tx: Arc<watch::Sender<LifecycleState>>,
    poller: Arc<Mutex<Option<ActivePoller>>>,
}

impl LifecycleController {
    /// Creates a controller in the `Upload` state with the default poll
    /// cadence.
    #[must_use]
    pub fn new(api: Arc<dyn CoachApi>) -> Self {
        Self::with_config(api, PollerConfig::default())
    }

    /// Creates a controller with an explicit poll cadence.
    #[must_use]
    pub fn with_config(api: Arc<dyn CoachApi>, config: PollerConfig) -> Self {
        let (watch_tx, _watch_rx) = watch::channel(LifecycleState::default());
        Self {
            api,
            config,
            state: Arc::new(Mutex::new(LifecycleState::default())),
            watch_tx: Arc::new(watch_tx),
            poller: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns a snapshot of the current state.
    pub async fn state(&self) -> LifecycleState {
        self.state.lock().await.clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.watch_tx.subscribe()
    }

    /// Moves `Upload` → `Processing` and starts polling the new session.
    ///
    /// Clears any displayed error. Any poller from a previous flow is
    /// cancelled before the new one is spawned.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidTransition`] unless the current
    /// state is `Upload`.
    pub async fn session_created(&self, session_id: impl Into<String>) -> Result<()> {
        let session_id = session_id.into();

        {
            let mut state = self.state.lock().await;
            if state.phase() != Phase::Upload {
                return Err(LifecycleError::invalid_transition(
                    state.phase(),
                    Phase::Processing,
                ));
            }
            *state = LifecycleState::Processing {
                session_id: session_id.clone(),
            };
            self.publish(&state);
        }

        info!(%session_id, "Session created; starting poller");
        self.cancel_active_poller().await;
        self.spawn_poller(session_id).await;
        Ok(())
    }

    /// Moves `Processing` → `Results`, storing the report exactly as
    /// received.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::StaleOutcome`] if `session_id` is not the
    /// active session, or [`LifecycleError::InvalidTransition`] if the state
    /// is not `Processing`.
    pub async fn complete(&self, session_id: &str, report: SessionReport) -> Result<()> {
        let mut state = self.state.lock().await;
        Self::ensure_active(&state, session_id, Phase::Results)?;

        info!(%session_id, "Analysis completed");
        *state = LifecycleState::Results {
            session_id: session_id.to_string(),
            report,
        };
        self.publish(&state);
        Ok(())
    }

    /// Moves `Processing` → `Upload`, carrying an error to display.
    ///
    /// The session id is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::StaleOutcome`] if `session_id` is not the
    /// active session, or [`LifecycleError::InvalidTransition`] if the state
    /// is not `Processing`.
    pub async fn fail(&self, session_id: &str, message: impl Into<String>) -> Result<()> {
        let mut state = self.state.lock().await;
        Self::ensure_active(&state, session_id, Phase::Upload)?;

        let message = message.into();
        info!(%session_id, %message, "Flow failed");
        *state = LifecycleState::Upload {
            error: Some(message),
        };
        self.publish(&state);
        Ok(())
    }

    /// Checks that `session_id` is the currently processing session.
    fn ensure_active(state: &LifecycleState, session_id: &str, target: Phase) -> Result<()> {
        match state {
            LifecycleState::Processing { session_id: active } if active == session_id => Ok(()),
            LifecycleState::Processing { .. } => Err(LifecycleError::stale_outcome(session_id)),
            other => Err(LifecycleError::invalid_transition(other.phase(), target)),
        }
    }

    /// Returns to `Upload`, discarding session id, report and error.
    ///
    /// Valid from any state; also serves as the abort for an in-flight flow.
    pub async fn reset(&self) {
        self.cancel_active_poller().await;

        let mut state = self.state.lock().await;
        debug!(from = %state.phase(), "Resetting lifecycle");
        *state = LifecycleState::Upload { error: None };
        self.publish(&state);
    }

    /// Publishes the current state to watchers. Callers hold the state lock.
    fn publish(&self, state: &LifecycleState) {
        self.watch_tx.send_replace(state.clone());
    }

    /// Cancels and forgets the active poller, if any.
    async fn cancel_active_poller(&self) {
        if let Some(active) = self.poller.lock().await.take() {
            debug!(session_id = %active.session_id, "Cancelling poller");
            active.cancel.cancel();
            active.handle.abort();
        }
    }

    /// Spawns the polling task for the given session and records its handle.
    async fn spawn_poller(&self, session_id: String) {
        let cancel = CancellationToken::new();

        let handle = tokio::spawn({
            let controller = self.clone();
            let api = Arc::clone(&self.api);
            let cancel = cancel.clone();
            let config = self.config;
            let session_id = session_id.clone();
            async move {
                let Some(outcome) =
                    poll_until_terminal(api.as_ref(), &session_id, &cancel, &config).await
                else {
                    return;
                };

                // Cancellation may have raced the final response.
                if cancel.is_cancelled() {
                    return;
                }

                let applied = match outcome {
                    PollOutcome::Completed(report) => {
                        controller.complete(&session_id, *report).await
                    }
                    PollOutcome::Failed(message) => controller.fail(&session_id, message).await,
                };

                if let Err(err) = applied {
                    debug!(%session_id, %err, "Discarding stale poll outcome");
                }
            }
        });

        *self.poller.lock().await = Some(ActivePoller {
            session_id,
            cancel,
            handle,
        });
    }
}
