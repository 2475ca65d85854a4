//! Detections produced by the external object detector.
//!
//! A [`Detection`] is one labeled bounding box in pixel coordinates. The
//! detector returns a [`DetectionBatch`] per image: the detections (in
//! arbitrary order) plus the image dimensions.
//!
//! Modules
//! - [`response`] – adapter for the upstream detector JSON payload.
//! - [`validate`] – ingestion checks rejecting malformed geometry.

pub mod response;
pub mod validate;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

pub use response::{DetectorPrediction, DetectorResponse};
pub use validate::{validate_batch, validate_detections, InvalidDetectionError};

/// Bounding box extent in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

/// Image dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

/// One observed object in an image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Upstream class name, free text.
    pub label: String,
    /// Box centre in pixel coordinates (y grows downwards).
    pub center: Point2<f64>,
    pub size: BoxSize,
    /// Detector score in `[0, 1]`.
    pub confidence: f64,
}

impl Detection {
    pub fn new(
        label: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        confidence: f64,
    ) -> Self {
        Self {
            label: label.into(),
            center: Point2::new(x, y),
            size: BoxSize { width, height },
            confidence,
        }
    }

    /// Returns a copy with every pixel quantity multiplied by `k`.
    pub fn scaled(&self, k: f64) -> Self {
        Self {
            label: self.label.clone(),
            center: Point2::new(self.center.x * k, self.center.y * k),
            size: BoxSize {
                width: self.size.width * k,
                height: self.size.height * k,
            },
            confidence: self.confidence,
        }
    }
}

/// All detections reported for a single image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionBatch {
    pub detections: Vec<Detection>,
    pub image: ImageSize,
}

impl DetectionBatch {
    pub fn new(detections: Vec<Detection>, image: ImageSize) -> Self {
        Self { detections, image }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
