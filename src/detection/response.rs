//! Adapter for the upstream detector's JSON payload.
//!
//! The hosted detector answers with
//!
//! ```json
//! {
//!   "predictions": [
//!     { "x": 312.5, "y": 401.0, "width": 24.0, "height": 22.0,
//!       "class": "mamilo_direito", "confidence": 0.91 }
//!   ],
//!   "image": { "width": 1024, "height": 768 }
//! }
//! ```
//!
//! `x`/`y` are box centres. Extra keys the detector adds (`class_id`,
//! `detection_id`, `time`, ...) are ignored. Transport, auth and retries are
//! the caller's business; this module only maps the shape.

use super::{Detection, DetectionBatch, ImageSize};
use serde::{Deserialize, Serialize};

/// One entry of `predictions`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorPrediction {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "class")]
    pub class_name: String,
    pub confidence: f64,
}

impl From<DetectorPrediction> for Detection {
    fn from(p: DetectorPrediction) -> Self {
        Detection::new(p.class_name, p.x, p.y, p.width, p.height, p.confidence)
    }
}

/// Full detector response for one image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorResponse {
    #[serde(default)]
    pub predictions: Vec<DetectorPrediction>,
    #[serde(default)]
    pub image: ImageSize,
}

impl DetectorResponse {
    /// Parses a response body.
    pub fn from_json(body: &str) -> Result<Self, String> {
        serde_json::from_str(body).map_err(|e| format!("Failed to parse detector response: {e}"))
    }

    /// Converts into the crate's batch type. No validation happens here; the
    /// analyzer validates on ingestion.
    pub fn into_batch(self) -> DetectionBatch {
        DetectionBatch {
            detections: self.predictions.into_iter().map(Detection::from).collect(),
            image: self.image,
        }
    }
}
