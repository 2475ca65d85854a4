//! Runtime configuration for the command-line tool.
//!
//! ```json
//! {
//!   "input_path": "detections.json",
//!   "scale_override": null,
//!   "output": { "json_out": "report.json", "format": "both" },
//!   "params": {
//!     "scale": {
//!       "ruler_length_cm": 10.0,
//!       "fallback": 0.1,
//!       "ruler_labels": ["ruler", "regua"],
//!       "min_ruler_width_px": 1.0
//!     },
//!     "measure": { "projection_correction": 0.8 }
//!   }
//! }
//! ```
//!
//! Everything except `input_path` is optional. Pipeline parameters are
//! range-checked after parsing.

use crate::analysis::AnalyzerParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What the tool prints to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Both,
}

impl OutputFormat {
    pub fn includes_text(self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Both)
    }

    pub fn includes_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where to write the JSON report; printed to stdout when absent.
    pub json_out: Option<PathBuf>,
    pub format: OutputFormat,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    /// Detector response JSON for one image.
    pub input_path: PathBuf,
    /// Manual cm/px calibration.
    #[serde(default)]
    pub scale_override: Option<f64>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub params: AnalyzerParams,
}

/// `origin` names the config in error messages.
fn parse_from(contents: &str, origin: &str) -> Result<RuntimeConfig, String> {
    let config: RuntimeConfig = serde_json::from_str(contents)
        .map_err(|e| format!("Failed to parse config{origin}: {e}"))?;
    config
        .params
        .validate()
        .map_err(|e| format!("Invalid config{origin}: {e}"))?;
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<RuntimeConfig, String> {
    parse_from(contents, "")
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_from(&contents, &format!(" {}", path.display()))
}
