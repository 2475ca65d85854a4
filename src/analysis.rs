//! End-to-end analysis of one image's detections.
//!
//! Overview
//! - Validates the batch; malformed geometry rejects it with
//!   [`InvalidDetectionError`], the only failure of the pipeline.
//! - Resolves the cm/px scale (override → ruler → fallback).
//! - Maps detector labels onto landmark roles.
//! - Computes the five measurements and packages them with the scale and an
//!   echo of the raw detections for downstream visualisation.
//!
//! Every call owns its inputs and outputs. [`Analyzer`] holds only immutable
//! parameters and is shared freely across threads; [`Analyzer::analyze_many`]
//! fans independent images out over the rayon pool.

use crate::detection::{validate_batch, Detection, DetectionBatch, ImageSize, InvalidDetectionError};
use crate::landmarks::{map_landmarks, LandmarkMap, LandmarkRole};
use crate::measure::{
    MeasureParams, MeasurementAvailability, MeasurementCalculator, MeasurementSet, Measurements,
};
use crate::scale::{ResolvedScale, ScaleParams, ScaleResolver, ScaleSource};
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters for the whole pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerParams {
    pub scale: ScaleParams,
    pub measure: MeasureParams,
}

impl AnalyzerParams {
    /// Checks the numeric parameters serde cannot constrain on its own.
    pub fn validate(&self) -> Result<(), String> {
        self.scale.validate()?;
        self.measure.validate()
    }
}

/// Packaged output of one analysis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// The five measurements in centimeters.
    pub measurements: MeasurementSet,
    /// `false` where a measurement is `0` only because landmarks were missing.
    pub availability: MeasurementAvailability,
    pub scale: ResolvedScale,
    pub image: ImageSize,
    /// Role → index into `detections` of the detection chosen for it.
    pub landmarks: BTreeMap<LandmarkRole, usize>,
    /// Raw detections as received.
    pub detections: Vec<Detection>,
}

impl AnalysisResult {
    /// Whether the scale came from the configured fallback.
    pub fn used_fallback_scale(&self) -> bool {
        self.scale.source == ScaleSource::Fallback
    }
}

/// Assembles an [`AnalysisResult`]. No computation happens here.
pub fn pack(
    batch: DetectionBatch,
    landmarks: &LandmarkMap,
    scale: ResolvedScale,
    measurements: Measurements,
) -> AnalysisResult {
    let landmarks = LandmarkRole::ALL
        .into_iter()
        .filter_map(|role| landmarks.source_index(role).map(|i| (role, i)))
        .collect();
    AnalysisResult {
        measurements: measurements.values,
        availability: measurements.availability,
        scale,
        image: batch.image,
        landmarks,
        detections: batch.detections,
    }
}

/// Configured measurement pipeline.
#[derive(Clone, Debug, Default)]
pub struct Analyzer {
    resolver: ScaleResolver,
    calculator: MeasurementCalculator,
}

impl Analyzer {
    pub fn new(params: AnalyzerParams) -> Self {
        Self {
            resolver: ScaleResolver::new(params.scale),
            calculator: MeasurementCalculator::new(params.measure),
        }
    }

    /// Runs the pipeline on one image.
    ///
    /// `scale_override` is a manual cm/px calibration; `None` (or a
    /// non-positive value) triggers automatic resolution.
    pub fn analyze(
        &self,
        batch: &DetectionBatch,
        scale_override: Option<f64>,
    ) -> Result<AnalysisResult, InvalidDetectionError> {
        if let Err(err) = validate_batch(batch) {
            warn!("Analyzer::analyze rejected batch: {err}");
            return Err(err);
        }

        let scale = self.resolver.resolve(&batch.detections, scale_override);
        let landmarks = map_landmarks(&batch.detections);
        let measurements = self.calculator.compute(&landmarks, scale.factor);

        debug!(
            "Analyzer::analyze detections={} landmarks={} measured={}/5 scale={:.5} ({:?})",
            batch.len(),
            landmarks.len(),
            measurements.availability.available_count(),
            scale.factor.cm_per_px(),
            scale.source
        );

        Ok(pack(batch.clone(), &landmarks, scale, measurements))
    }

    /// Analyzes independent images in parallel. Results keep input order.
    pub fn analyze_many(
        &self,
        batches: &[DetectionBatch],
        scale_override: Option<f64>,
    ) -> Vec<Result<AnalysisResult, InvalidDetectionError>> {
        batches
            .par_iter()
            .map(|batch| self.analyze(batch, scale_override))
            .collect()
    }
}

/// Runs the pipeline with default parameters.
pub fn analyze(
    batch: &DetectionBatch,
    scale_override: Option<f64>,
) -> Result<AnalysisResult, InvalidDetectionError> {
    Analyzer::default().analyze(batch, scale_override)
}
