//! Surfcoach report rendering.
//!
//! This crate turns a completed [`SessionReport`] into a human-readable
//! Markdown document, plus the small helpers the presentation needs:
//! severity tallies and display names for the measured metrics.
//!
//! # Types
//!
//! - [`MarkdownGenerator`] - Renders a report to Markdown
//! - [`SeverityCounts`] - Findings tallied by severity
//!
//! # Example
//!
//! ```no_run
//! use surfcoach_client::SessionReport;
//! use surfcoach_report::MarkdownGenerator;
//!
//! # fn example(report: &SessionReport) {
//! let markdown = MarkdownGenerator::new(report).generate();
//! assert!(markdown.contains("# Surf Technique Report"));
//! # }
//! ```

mod markdown;

pub use markdown::MarkdownGenerator;

use surfcoach_client::{AggregatedError, MetricName, Severity};

// ============================================================================
// SeverityCounts
// ============================================================================

/// Findings tallied by severity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    /// Number of high-severity findings.
    pub high: usize,
    /// Number of medium-severity findings.
    pub medium: usize,
    /// Number of low-severity findings.
    pub low: usize,
}

impl SeverityCounts {
    /// Tallies the findings of a report by severity.
    #[must_use]
    pub fn from_findings(findings: &[AggregatedError]) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }

    /// Returns the total number of findings.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

// ============================================================================
// Metric display names
// ============================================================================

/// Returns the human-readable display name for a metric.
#[must_use]
pub const fn metric_label(metric: MetricName) -> &'static str {
    match metric {
        MetricName::LeftKneeAngle => "Left Knee Angle",
        MetricName::RightKneeAngle => "Right Knee Angle",
        MetricName::LeftHipAngle => "Left Hip Angle",
        MetricName::RightHipAngle => "Right Hip Angle",
        MetricName::LeftElbowAngle => "Left Elbow Angle",
        MetricName::RightElbowAngle => "Right Elbow Angle",
        MetricName::LeftArmRaise => "Left Arm Raise",
        MetricName::RightArmRaise => "Right Arm Raise",
        MetricName::ShoulderTilt => "Shoulder Tilt",
        MetricName::SpinalAngle => "Spinal Angle",
        MetricName::HeadForwardOffset => "Head Forward Offset",
        MetricName::StanceWidthRatio => "Stance Width Ratio",
    }
}
