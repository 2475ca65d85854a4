//! Ingestion checks for detector output.
//!
//! A batch is accepted only if every detection has finite coordinates, a
//! non-negative finite size and a confidence in `[0, 1]`. The first offending
//! detection rejects the whole batch; nothing downstream ever sees partially
//! validated input.

use super::{Detection, DetectionBatch};

/// Malformed detector output. The only error the analysis pipeline raises.
#[derive(Clone, Debug, PartialEq)]
pub enum InvalidDetectionError {
    /// A coordinate, extent or score is NaN or infinite.
    NonFinite {
        index: usize,
        field: &'static str,
        value: f64,
    },
    /// Width or height below zero.
    NegativeSize {
        index: usize,
        field: &'static str,
        value: f64,
    },
    /// Confidence outside `[0, 1]`.
    ConfidenceOutOfRange { index: usize, value: f64 },
    /// Image dimensions are negative or non-finite.
    InvalidImageSize { field: &'static str, value: f64 },
}

impl InvalidDetectionError {
    /// Index of the offending detection, if the error concerns one.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::NonFinite { index, .. }
            | Self::NegativeSize { index, .. }
            | Self::ConfidenceOutOfRange { index, .. } => Some(*index),
            Self::InvalidImageSize { .. } => None,
        }
    }
}

impl std::fmt::Display for InvalidDetectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite {
                index,
                field,
                value,
            } => write!(f, "detection #{index}: {field} is not finite ({value})"),
            Self::NegativeSize {
                index,
                field,
                value,
            } => write!(f, "detection #{index}: {field} is negative ({value})"),
            Self::ConfidenceOutOfRange { index, value } => write!(
                f,
                "detection #{index}: confidence {value} outside [0, 1]"
            ),
            Self::InvalidImageSize { field, value } => {
                write!(f, "image {field} is invalid ({value})")
            }
        }
    }
}

impl std::error::Error for InvalidDetectionError {}

fn check_finite(
    index: usize,
    field: &'static str,
    value: f64,
) -> Result<(), InvalidDetectionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InvalidDetectionError::NonFinite {
            index,
            field,
            value,
        })
    }
}

fn check_extent(
    index: usize,
    field: &'static str,
    value: f64,
) -> Result<(), InvalidDetectionError> {
    check_finite(index, field, value)?;
    if value < 0.0 {
        return Err(InvalidDetectionError::NegativeSize {
            index,
            field,
            value,
        });
    }
    Ok(())
}

fn validate_one(index: usize, det: &Detection) -> Result<(), InvalidDetectionError> {
    check_finite(index, "center.x", det.center.x)?;
    check_finite(index, "center.y", det.center.y)?;
    check_extent(index, "width", det.size.width)?;
    check_extent(index, "height", det.size.height)?;
    check_finite(index, "confidence", det.confidence)?;
    if !(0.0..=1.0).contains(&det.confidence) {
        return Err(InvalidDetectionError::ConfidenceOutOfRange {
            index,
            value: det.confidence,
        });
    }
    Ok(())
}

/// Validates every detection, stopping at the first malformed one.
pub fn validate_detections(detections: &[Detection]) -> Result<(), InvalidDetectionError> {
    detections
        .iter()
        .enumerate()
        .try_for_each(|(i, det)| validate_one(i, det))
}

/// Validates the image dimensions and all detections of a batch.
pub fn validate_batch(batch: &DetectionBatch) -> Result<(), InvalidDetectionError> {
    for (field, value) in [("width", batch.image.width), ("height", batch.image.height)] {
        if !value.is_finite() || value < 0.0 {
            return Err(InvalidDetectionError::InvalidImageSize { field, value });
        }
    }
    validate_detections(&batch.detections)
}
