//! Wire types for the Surfcoach backend API.
//!
//! These mirror the JSON shapes the analysis service emits. A session is
//! created by the upload call, observed by polling, and once it reaches the
//! `completed` status the same lookup endpoint returns the full report
//! instead of the bare summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// SessionStatus
// ============================================================================

/// Backend-reported status of an analysis session.
///
/// Statuses only ever move forward along
/// `pending`/`processing` → `completed` | `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Upload accepted, analysis not started yet.
    Pending,
    /// Analysis job is running.
    Processing,
    /// Analysis finished; the report is available.
    Completed,
    /// Analysis job failed on the backend.
    Failed,
}

impl SessionStatus {
    /// Returns `true` if this status ends polling for the session.
    ///
    /// Terminal statuses are `Completed` and `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ============================================================================
// Severity and MetricName
// ============================================================================

/// Severity of a technique deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Minor deviation, usually cosmetic.
    Low,
    /// Noticeable deviation worth correcting.
    Medium,
    /// Deviation that materially affects the ride.
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// The fixed set of biomechanical metrics the backend measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum MetricName {
    LeftKneeAngle,
    RightKneeAngle,
    LeftHipAngle,
    RightHipAngle,
    LeftElbowAngle,
    RightElbowAngle,
    LeftArmRaise,
    RightArmRaise,
    ShoulderTilt,
    SpinalAngle,
    HeadForwardOffset,
    StanceWidthRatio,
}

// ============================================================================
// Report payload
// ============================================================================

/// One technique deviation category, collapsed across all analyzed frames.
///
/// Immutable once received; owned exclusively by the report that contains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedError {
    /// Which metric deviated.
    pub metric: MetricName,
    /// How severe the deviation is.
    pub severity: Severity,
    /// Average measured value across offending frames.
    pub avg_measured_value: f64,
    /// Lower bound of the ideal range.
    pub ideal_min: f64,
    /// Upper bound of the ideal range.
    pub ideal_max: f64,
    /// Average deviation from the ideal range.
    pub avg_deviation: f64,
    /// Largest single-frame deviation observed.
    pub max_deviation: f64,
    /// Number of frames where the deviation occurred.
    pub frame_count: u32,
    /// Total frames the analyzer looked at.
    pub total_frames_analyzed: u32,
    /// Share of analyzed frames affected, 0-100.
    pub frequency_pct: f64,
    /// Timestamp of the first offending frame.
    pub first_timestamp_sec: f64,
    /// Timestamp of the last offending frame.
    pub last_timestamp_sec: f64,
    /// Span between first and last occurrence.
    pub duration_sec: f64,
    /// Frame number of the worst observation.
    pub worst_frame_number: u32,
    /// Timestamp of the worst observation.
    pub worst_timestamp_sec: f64,
    /// Value measured on the worst frame.
    pub worst_measured_value: f64,
    /// Server path to an evidence clip around the worst moment, if extracted.
    #[serde(default)]
    pub clip_path: Option<String>,
    /// Server path to an evidence thumbnail, if extracted.
    #[serde(default)]
    pub thumbnail_path: Option<String>,
}

/// The terminal payload of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Backend-assigned session identifier.
    pub session_id: String,
    /// Status at the time the report was produced (always `completed`).
    pub status: SessionStatus,
    /// Total frames in the source video.
    pub total_frames: u32,
    /// Frames that were analyzed for pose metrics.
    pub analyzed_frames: u32,
    /// Frames skipped (no pose detected, low visibility).
    pub skipped_frames: u32,
    /// Duration of the uploaded video in seconds.
    pub video_duration_sec: f64,
    /// Frame rate of the uploaded video.
    pub video_fps: f64,
    /// Technique findings, ordered as the backend emitted them.
    pub aggregated_errors: Vec<AggregatedError>,
    /// Free-text coaching feedback, possibly empty.
    pub coaching_feedback: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// How long the analysis took, in seconds.
    pub processing_time_sec: f64,
}

// ============================================================================
// Session summary and lookup result
// ============================================================================

/// Session metadata returned by the upload call and by lookups while the
/// analysis is still running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Backend-assigned session identifier.
    pub session_id: String,
    /// Current status of the analysis job.
    pub status: SessionStatus,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Original filename of the uploaded video.
    pub video_filename: String,
    /// Surfer name supplied at upload time, if any.
    #[serde(default)]
    pub surfer_name: Option<String>,
    /// Skill level supplied at upload time, if any.
    #[serde(default)]
    pub skill_level: Option<String>,
}

/// What a session lookup yields: the full report once the analysis has
/// completed, otherwise the bare summary.
///
/// The report shape carries strictly more fields than the summary, so the
/// untagged deserialization tries it first.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SessionState {
    /// Terminal `completed` session with its report.
    Report(SessionReport),
    /// Session that has not produced a report yet.
    Summary(SessionSummary),
}

impl SessionState {
    /// Returns the backend-assigned session identifier.
    #[must_use]
    pub fn session_id(&self) -> &str {
        match self {
            Self::Report(report) => &report.session_id,
            Self::Summary(summary) => &summary.session_id,
        }
    }

    /// Returns the current status of the session.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        match self {
            Self::Report(report) => report.status,
            Self::Summary(summary) => summary.status,
        }
    }

    /// Extracts the report, if this state carries one.
    #[must_use]
    pub fn into_report(self) -> Option<SessionReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Summary(_) => None,
        }
    }
}

// ============================================================================
// Chat
// ============================================================================

/// Reply from the AI coach to a follow-up chat message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    /// The coach's answer.
    pub reply: String,
    /// When the reply was produced.
    pub timestamp: DateTime<Utc>,
}
