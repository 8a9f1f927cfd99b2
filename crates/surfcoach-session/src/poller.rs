//! Polling protocol for observing an in-progress analysis job.
//!
//! The poller waits a short settling delay before the first poll (so it does
//! not race the just-created job), then queries the session on a fixed
//! interval until a terminal status appears, a transport failure occurs, or
//! the caller cancels. Polls never overlap: the next one is only scheduled
//! after the previous one resolves.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use surfcoach_client::{CoachApi, SessionReport, SessionStatus};

/// Fixed user-facing message shown when the backend reports a failed job.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Analysis failed. Please try again with a different video.";

/// Message shown when a session claims completion without a report payload.
const MISSING_REPORT_MESSAGE: &str = "Analysis completed but the report could not be loaded.";

/// Timing of the polling protocol.
///
/// The defaults are the protocol's values; tests shorten them rather than
/// mocking the clock over real sockets.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    /// Delay before the first poll, so a just-created job has time to land.
    pub initial_delay: Duration,
    /// Fixed interval between polls.
    pub poll_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1500),
            poll_interval: Duration::from_millis(2500),
        }
    }
}

/// Terminal outcome of one polling run.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The session completed; carries the report exactly as received.
    Completed(Box<SessionReport>),
    /// The flow ended in an error to display: either the backend reported a
    /// failed job or a poll's transport failed.
    Failed(String),
}

/// Polls a session until a terminal outcome or cancellation.
///
/// Returns `None` if cancellation wins: the token is raced against every
/// sleep and every in-flight request, and re-checked before the outcome is
/// returned, so a response that resolves after cancellation is discarded.
///
/// A single transport failure ends the run; there is no per-poll retry. A
/// permanently unresponsive backend manifests as polling forever, which is
/// the accepted behavior (the user can always reset the flow).
pub async fn poll_until_terminal(
    api: &dyn CoachApi,
    session_id: &str,
    cancel: &CancellationToken,
    config: &PollerConfig,
) -> Option<PollOutcome> {
    tokio::select! {
        () = cancel.cancelled() => return None,
        () = sleep(config.initial_delay) => {}
    }

    loop {
        let result = tokio::select! {
            () = cancel.cancelled() => return None,
            result = api.get_session(session_id) => result,
        };

        // A response that arrives in the same poll as a cancellation must
        // not be applied.
        if cancel.is_cancelled() {
            return None;
        }

        match result {
            Ok(state) => match state.status() {
                SessionStatus::Completed => {
                    debug!(session_id, "Session completed");
                    return Some(match state.into_report() {
                        Some(report) => PollOutcome::Completed(Box::new(report)),
                        None => {
                            warn!(session_id, "Completed session carried no report");
                            PollOutcome::Failed(MISSING_REPORT_MESSAGE.to_string())
                        }
                    });
                }
                SessionStatus::Failed => {
                    debug!(session_id, "Backend reported job failure");
                    return Some(PollOutcome::Failed(ANALYSIS_FAILED_MESSAGE.to_string()));
                }
                status @ (SessionStatus::Pending | SessionStatus::Processing) => {
                    debug!(session_id, %status, "Session still in progress");
                }
            },
            Err(err) => {
                warn!(session_id, error = %err, "Poll failed; ending flow");
                return Some(PollOutcome::Failed(err.message().to_string()));
            }
        }

        tokio::select! {
            () = cancel.cancelled() => return None,
            () = sleep(config.poll_interval) => {}
        }
    }
}
