// src/utils.rs
use std::path::Path;
use std::time::Duration;

use crate::error::{EnhancerError, Result};

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Validate file extension against allowed types
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> Result<()> {
    match get_file_extension(filename) {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => Err(EnhancerError::UnsupportedFileType(filename.to_string())),
    }
}

/// Render a duration as "Xm Ys"
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Write file content, creating parent directories first
pub async fn write_file_content(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(path, content).await?;
    Ok(())
}

/// Join a base URL and an endpoint path without doubling slashes
pub fn join_url(base: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
