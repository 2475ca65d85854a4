//! File helpers for detector responses and JSON reports.

use crate::detection::{DetectionBatch, DetectorResponse};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Reads a detector response from disk and converts it into a batch.
pub fn load_detections(path: &Path) -> Result<DetectionBatch, String> {
    let body = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read detections {}: {e}", path.display()))?;
    DetectorResponse::from_json(&body)
        .map(DetectorResponse::into_batch)
        .map_err(|e| format!("{e} ({})", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
