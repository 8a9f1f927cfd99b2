//! Client-side preflight checks for video uploads.
//!
//! These guards reject obviously bad uploads before any bytes leave the
//! machine. They mirror the backend's own rules, so passing them does not
//! guarantee acceptance, only that the common rejections happen instantly.

use std::path::Path;

use crate::error::{ClientError, Result};

/// Video container formats the backend accepts.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "mkv", "webm"];

/// Maximum accepted video size in megabytes.
pub const MAX_VIDEO_SIZE_MB: u64 = 100;

/// Checks that the file carries a supported video extension.
///
/// The comparison is case-insensitive.
pub fn ensure_supported_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());

    match extension {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(ClientError::validation(format!(
            "Unsupported video format '.{ext}'. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))),
        None => Err(ClientError::validation(
            "File has no extension. Allowed: ".to_string() + &ALLOWED_EXTENSIONS.join(", "),
        )),
    }
}

/// Checks that the file size is within the upload limit.
pub fn ensure_within_size_limit(size_bytes: u64) -> Result<()> {
    let limit_bytes = MAX_VIDEO_SIZE_MB * 1024 * 1024;
    if size_bytes > limit_bytes {
        let size_mb = size_bytes as f64 / (1024.0 * 1024.0);
        return Err(ClientError::validation(format!(
            "Video too large ({size_mb:.1} MB). Max: {MAX_VIDEO_SIZE_MB} MB"
        )));
    }
    Ok(())
}

/// Runs all preflight checks against a video file on disk.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] if the file is missing, has an
/// unsupported extension, or exceeds the size limit.
pub async fn validate_video(path: &Path) -> Result<()> {
    ensure_supported_extension(path)?;

    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        ClientError::validation(format!("Cannot read video file '{}': {e}", path.display()))
    })?;

    if !metadata.is_file() {
        return Err(ClientError::validation(format!(
            "'{}' is not a file",
            path.display()
        )));
    }

    ensure_within_size_limit(metadata.len())
}
