//! Breast anthropometry from object-detector output.
//!
//! An external detector labels anatomical landmarks (nipples, breast bases,
//! inframammary folds, midline) and optionally a reference ruler in a torso
//! photograph. This crate turns those detections into five clinical
//! distances in centimeters:
//!
//! - [`scale`] resolves the cm/px factor from a manual override, a detected
//!   ruler of known length, or a fallback.
//! - [`landmarks`] folds free-text detector classes into a closed set of
//!   roles, keeping the most confident detection per role.
//! - [`measure`] applies the per-measurement formulas and rounding.
//! - [`analysis`] validates input and packages the result.
//!
//! [`record`] and [`summary`] build payloads for the external measurement
//! store and narrative summarization function.

pub mod analysis;
pub mod config;
pub mod detection;
pub mod io;
pub mod landmarks;
pub mod measure;
pub mod record;
pub mod scale;
pub mod summary;

// --- High-level re-exports -------------------------------------------------

pub use crate::analysis::{analyze, pack, AnalysisResult, Analyzer, AnalyzerParams};
pub use crate::detection::{Detection, DetectionBatch, ImageSize, InvalidDetectionError};
pub use crate::landmarks::{map_landmarks, LandmarkMap, LandmarkRole};
pub use crate::measure::{compute_measurements, MeasurementKind, MeasurementSet};
pub use crate::scale::{resolve_scale, ResolvedScale, ScaleFactor, ScaleSource};

/// Small prelude for quick experiments.
///
/// ```
/// use mammometry::prelude::*;
///
/// let batch = DetectionBatch::new(
///     vec![
///         Detection::new("mamilo_esquerdo", 100.0, 200.0, 10.0, 10.0, 0.9),
///         Detection::new("mamilo_direito", 300.0, 200.0, 10.0, 10.0, 0.9),
///     ],
///     ImageSize { width: 640.0, height: 480.0 },
/// );
/// let result = Analyzer::default().analyze(&batch, Some(0.1)).unwrap();
/// assert_eq!(result.measurements.get(MeasurementKind::InterNippleDistance), 20.0);
/// ```
pub mod prelude {
    pub use crate::detection::{Detection, DetectionBatch, ImageSize};
    pub use crate::measure::MeasurementKind;
    pub use crate::{AnalysisResult, Analyzer, AnalyzerParams};
}
