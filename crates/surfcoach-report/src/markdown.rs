//! Markdown rendering of a completed analysis report.
//!
//! The generated document contains:
//!
//! - A summary table with the video and analysis metrics
//! - Technique findings, most severe first
//! - The coaching feedback section

use std::fmt::Write;

use chrono::{DateTime, Utc};

use surfcoach_client::{AggregatedError, SessionReport, Severity};

use crate::{metric_label, SeverityCounts};

/// Generates Markdown documents from completed session reports.
///
/// The generator borrows the report and produces a formatted Markdown
/// string suitable for saving next to the analyzed video.
pub struct MarkdownGenerator<'a> {
    report: &'a SessionReport,
}

impl<'a> MarkdownGenerator<'a> {
    /// Creates a generator for the given report.
    #[must_use]
    pub const fn new(report: &'a SessionReport) -> Self {
        Self { report }
    }

    /// Generates the complete Markdown document.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        self.write_title(&mut output);
        self.write_summary(&mut output);
        self.write_findings(&mut output);
        self.write_feedback(&mut output);
        Self::write_footer(&mut output);

        output
    }

    /// Writes the report title.
    fn write_title(&self, output: &mut String) {
        let _ = writeln!(
            output,
            "# Surf Technique Report: {}\n",
            self.report.session_id
        );
    }

    /// Writes the summary section with the metrics table.
    fn write_summary(&self, output: &mut String) {
        let counts = SeverityCounts::from_findings(&self.report.aggregated_errors);

        let _ = writeln!(output, "## Summary\n");
        let _ = writeln!(output, "| Metric | Value |");
        let _ = writeln!(output, "|--------|-------|");
        let _ = writeln!(
            output,
            "| Video Duration | {} |",
            format_timecode(self.report.video_duration_sec)
        );
        let _ = writeln!(
            output,
            "| Frames Analyzed | {} of {} ({} skipped) |",
            self.report.analyzed_frames, self.report.total_frames, self.report.skipped_frames
        );
        let _ = writeln!(output, "| Frame Rate | {:.1} fps |", self.report.video_fps);
        let _ = writeln!(
            output,
            "| Processing Time | {:.1}s |",
            self.report.processing_time_sec
        );
        let _ = writeln!(
            output,
            "| Findings | {} ({} high, {} medium, {} low) |",
            counts.total(),
            counts.high,
            counts.medium,
            counts.low
        );
        let _ = writeln!(
            output,
            "| Analyzed | {} |\n",
            format_timestamp(&self.report.created_at)
        );
    }

    /// Writes the technique findings, most severe first.
    fn write_findings(&self, output: &mut String) {
        let _ = writeln!(output, "## Technique Findings\n");

        if self.report.aggregated_errors.is_empty() {
            let _ = writeln!(output, "*No technique deviations detected. Great ride!*\n");
            return;
        }

        let mut findings: Vec<_> = self.report.aggregated_errors.iter().collect();
        findings.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then(b.frequency_pct.total_cmp(&a.frequency_pct))
        });

        for finding in findings {
            Self::write_finding(output, finding);
        }
    }

    /// Writes a single finding entry.
    fn write_finding(output: &mut String, finding: &AggregatedError) {
        let label = metric_label(finding.metric);
        let icon = severity_icon(finding.severity);
        let _ = writeln!(output, "### {icon} {label}\n");

        let _ = writeln!(
            output,
            "- **Measured**: {:.1} on average (ideal {:.1}\u{2013}{:.1})",
            finding.avg_measured_value, finding.ideal_min, finding.ideal_max
        );
        let _ = writeln!(
            output,
            "- **Deviation**: {:.1} average, {:.1} at worst",
            finding.avg_deviation, finding.max_deviation
        );
        let _ = writeln!(
            output,
            "- **Frequency**: {:.0}% of analyzed frames ({} of {})",
            finding.frequency_pct, finding.frame_count, finding.total_frames_analyzed
        );
        let _ = writeln!(
            output,
            "- **Worst Moment**: {} (measured {:.1})",
            format_timecode(finding.worst_timestamp_sec),
            finding.worst_measured_value
        );
        if finding.clip_path.is_some() {
            let _ = writeln!(output, "- **Evidence**: clip available in the session");
        }
        let _ = writeln!(output);
    }

    /// Writes the coaching feedback section.
    fn write_feedback(&self, output: &mut String) {
        let _ = writeln!(output, "## Coaching Feedback\n");

        if self.report.coaching_feedback.trim().is_empty() {
            let _ = writeln!(output, "*No coaching feedback was generated.*\n");
        } else {
            let _ = writeln!(output, "{}\n", self.report.coaching_feedback.trim());
        }
    }

    /// Writes the document footer.
    fn write_footer(output: &mut String) {
        let _ = writeln!(output, "---");
        let _ = writeln!(
            output,
            "*Generated by Surfcoach at {}*",
            format_timestamp(&Utc::now())
        );
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Formats a video offset in seconds as `m:ss.s`.
///
/// Examples: 5.2 seconds -> "0:05.2", 75.3 seconds -> "1:15.3".
fn format_timecode(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor();
    let remainder = seconds - minutes * 60.0;
    format!("{minutes:.0}:{remainder:04.1}")
}

/// Formats a timestamp as "YYYY-MM-DD HH:MM:SS UTC".
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Returns the indicator for a finding's severity.
const fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "&#128308;",
        Severity::Medium => "&#128992;",
        Severity::Low => "&#128993;",
    }
}

// ============================================================================
// Tests
// ============================================================================
