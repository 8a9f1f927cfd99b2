//! HTTP transport to the Surfcoach analysis backend.
//!
//! [`CoachApi`] is the seam the rest of the workspace talks through, so the
//! lifecycle and chat logic can run against scripted fakes in tests.
//! [`HttpClient`] is the real reqwest-backed implementation.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::error::{ClientError, Result};
use crate::types::{ChatReply, SessionState, SessionSummary};

/// Default address of a locally running backend.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Request timeout applied to every call except the upload, which may carry
/// a large body.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// VideoUpload
// ============================================================================

/// Describes a video submission.
///
/// # Example
///
/// ```
/// use surfcoach_client::VideoUpload;
///
/// let upload = VideoUpload::new("session.mp4")
///     .with_surfer_name("Kai")
///     .with_skill_level("intermediate");
/// ```
#[derive(Debug, Clone)]
pub struct VideoUpload {
    /// Path to the video file on disk.
    pub path: PathBuf,
    /// Optional surfer name forwarded to the coach.
    pub surfer_name: Option<String>,
    /// Optional skill level (beginner/intermediate/advanced).
    pub skill_level: Option<String>,
}

impl VideoUpload {
    /// Creates an upload for the given video path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            surfer_name: None,
            skill_level: None,
        }
    }

    /// Attaches the surfer's name.
    #[must_use]
    pub fn with_surfer_name(mut self, name: impl Into<String>) -> Self {
        self.surfer_name = Some(name.into());
        self
    }

    /// Attaches the surfer's skill level.
    #[must_use]
    pub fn with_skill_level(mut self, level: impl Into<String>) -> Self {
        self.skill_level = Some(level.into());
        self
    }
}

// ============================================================================
// CoachApi
// ============================================================================

/// The backend operations the client consumes.
///
/// Each operation is request/response and fails with a normalized
/// [`ClientError::Transport`] carrying a human-readable message.
#[async_trait]
pub trait CoachApi: Send + Sync {
    /// Uploads a video and starts an analysis session.
    async fn create_session(&self, upload: VideoUpload) -> Result<SessionSummary>;

    /// Fetches the current state of a session by id.
    async fn get_session(&self, session_id: &str) -> Result<SessionState>;

    /// Sends a follow-up chat message for a completed session.
    async fn send_chat_message(&self, session_id: &str, message: &str) -> Result<ChatReply>;

    /// Checks whether the backend is reachable and healthy.
    async fn health_check(&self) -> Result<()>;
}

// ============================================================================
// HttpClient
// ============================================================================

/// Reqwest-backed [`CoachApi`] implementation.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Creates a client for the given server address.
    ///
    /// The address is the server root (e.g. `http://127.0.0.1:8000`); the
    /// `/api/v1` prefix is appended internally.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(server_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::transport(format!("Failed to build HTTP client: {e}")))?;

        let mut base_url = server_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        base_url.push_str("/api/v1");

        Ok(Self { client, base_url })
    }

    /// Returns the API base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CoachApi for HttpClient {
    #[instrument(skip(self), fields(video = %upload.path.display()))]
    async fn create_session(&self, upload: VideoUpload) -> Result<SessionSummary> {
        let file_name = upload
            .path
            .file_name()
            .map_or_else(|| "video".to_string(), |n| n.to_string_lossy().into_owned());

        let bytes = tokio::fs::read(&upload.path).await.map_err(|e| {
            ClientError::transport(format!(
                "Cannot read video file '{}': {e}",
                upload.path.display()
            ))
        })?;
        debug!(size_bytes = bytes.len(), "Read video for upload");

        let mut form = Form::new().part("video", Part::bytes(bytes).file_name(file_name));
        if let Some(name) = upload.surfer_name {
            form = form.text("surfer_name", name);
        }
        if let Some(level) = upload.skill_level {
            form = form.text("skill_level", level);
        }

        let response = self
            .client
            .post(format!("{}/sessions/", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("Upload failed: {e}")))?;

        let summary: SessionSummary = parse_success("Upload", response).await?;
        debug!(session_id = %summary.session_id, "Session created");
        Ok(summary)
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: &str) -> Result<SessionState> {
        let response = self
            .client
            .get(format!("{}/sessions/{session_id}", self.base_url))
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("Session fetch failed: {e}")))?;

        parse_success("Session fetch", response).await
    }

    #[instrument(skip(self, message))]
    async fn send_chat_message(&self, session_id: &str, message: &str) -> Result<ChatReply> {
        let response = self
            .client
            .post(format!("{}/sessions/{session_id}/chat", self.base_url))
            .json(&json!({ "message": message }))
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("Chat failed: {e}")))?;

        parse_success("Chat", response).await
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("Health check failed: {e}")))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(normalize_error("Health check", response).await)
        }
    }
}

// ============================================================================
// Response handling
// ============================================================================

/// Error body the backend attaches to rejections.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Decodes a success body, or normalizes the failure.
async fn parse_success<T: serde::de::DeserializeOwned>(
    operation: &str,
    response: Response,
) -> Result<T> {
    if !response.status().is_success() {
        return Err(normalize_error(operation, response).await);
    }

    let status = response.status().as_u16();
    response.json::<T>().await.map_err(|e| {
        debug!(operation, status, "Failed to decode success body");
        ClientError::transport(format!("{operation} returned an invalid body: {e}"))
    })
}

/// Normalizes a non-success response into a transport error.
///
/// Prefers the backend's own `detail` explanation; if the body is absent or
/// unparseable, synthesizes `"<Operation> failed (<status>)"`. Body-parse
/// failure here never becomes its own error.
async fn normalize_error(operation: &str, response: Response) -> ClientError {
    let status = response.status().as_u16();
    let detail = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail);

    let message = detail.unwrap_or_else(|| format!("{operation} failed ({status})"));
    debug!(operation, status, %message, "Backend call failed");
    ClientError::transport(message)
}
