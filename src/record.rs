//! Payloads for the external measurement store.
//!
//! The store keeps one measurement record per session (patient, how the scale
//! was calibrated, the five values, free-text observations, image reference)
//! and one value row per measurement. This module only builds those payloads;
//! writing them is the caller's job.

use crate::analysis::AnalysisResult;
use crate::measure::{MeasurementKind, MeasurementSet};
use crate::scale::ScaleSource;
use serde::{Deserialize, Serialize};

/// Calibration method recorded alongside the measurements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMethod {
    /// Scale found by the pipeline itself (detected ruler or fallback).
    #[default]
    Auto,
    /// Manual calibration against a physical ruler.
    Ruler,
    /// Depth-sensor calibration.
    Lidar,
}

/// A manual override is assumed to come from a ruler; LiDAR callers say so
/// with [`MeasurementRecord::with_scale_method`].
impl From<ScaleSource> for ScaleMethod {
    fn from(source: ScaleSource) -> Self {
        match source {
            ScaleSource::Manual => ScaleMethod::Ruler,
            ScaleSource::Ruler { .. } | ScaleSource::Fallback => ScaleMethod::Auto,
        }
    }
}

/// Measurement record as stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub patient_id: String,
    pub scale_method: ScaleMethod,
    pub measurements_data: MeasurementSet,
    pub ai_observations: Option<String>,
    pub image_url: Option<String>,
}

/// One row of the per-measurement table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementValue {
    pub measurement_type: String,
    pub value_cm: f64,
}

impl MeasurementRecord {
    pub fn new(
        patient_id: impl Into<String>,
        scale_method: ScaleMethod,
        measurements: MeasurementSet,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            scale_method,
            measurements_data: measurements,
            ai_observations: None,
            image_url: None,
        }
    }

    /// Record for an automatic analysis, with a short observation noting how
    /// many detections it was based on. The scale method follows the
    /// resolved scale source.
    pub fn from_analysis(patient_id: impl Into<String>, result: &AnalysisResult) -> Self {
        let observation = format!(
            "Automatic analysis: {} detections, {} landmarks, {}/{} measurements computed",
            result.detections.len(),
            result.landmarks.len(),
            result.availability.available_count(),
            MeasurementKind::COUNT
        );
        let scale_method = ScaleMethod::from(result.scale.source);
        Self::new(patient_id, scale_method, result.measurements).with_observations(observation)
    }

    pub fn with_scale_method(mut self, method: ScaleMethod) -> Self {
        self.scale_method = method;
        self
    }

    pub fn with_observations(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.ai_observations = (!text.trim().is_empty()).then_some(text);
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.image_url = (!url.trim().is_empty()).then_some(url);
        self
    }

    /// Value rows, one per measurement, in fixed order.
    pub fn values(&self) -> Vec<MeasurementValue> {
        self.measurements_data
            .iter()
            .map(|(kind, value_cm)| MeasurementValue {
                measurement_type: kind.key().to_string(),
                value_cm,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::detection::{Detection, DetectionBatch, ImageSize};

    #[test]
    fn values_cover_all_keys() {
        let mut set = MeasurementSet::default();
        set.set(MeasurementKind::BreastHeight, 7.5);
        let record = MeasurementRecord::new("p-1", ScaleMethod::Lidar, set);
        let rows = record.values();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].measurement_type, "altura_mama");
        assert_eq!(rows[4].value_cm, 7.5);
        assert_eq!(rows[0].value_cm, 0.0);
    }

    #[test]
    fn record_json_shape() {
        let record = MeasurementRecord::new("p-9", ScaleMethod::Ruler, MeasurementSet::default())
            .with_image_url("https://example.org/img.jpg")
            .with_observations("   ");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["patient_id"], "p-9");
        assert_eq!(json["scale_method"], "ruler");
        assert!(json["ai_observations"].is_null());
        assert_eq!(json["image_url"], "https://example.org/img.jpg");
        assert_eq!(json["measurements_data"]["projecao_mamaria"], 0.0);
    }

    #[test]
    fn from_analysis_notes_detection_count() {
        let batch = DetectionBatch::new(
            vec![
                Detection::new("mamilo_esquerdo", 100.0, 200.0, 8.0, 8.0, 0.9),
                Detection::new("mamilo_direito", 300.0, 200.0, 8.0, 8.0, 0.9),
            ],
            ImageSize::default(),
        );
        let result = analyze(&batch, Some(0.1)).unwrap();
        let record = MeasurementRecord::from_analysis("p-2", &result);
        assert_eq!(record.scale_method, ScaleMethod::Ruler);
        assert_eq!(
            record.ai_observations.as_deref(),
            Some("Automatic analysis: 2 detections, 2 landmarks, 1/5 measurements computed")
        );
        assert_eq!(
            record.measurements_data.get(MeasurementKind::InterNippleDistance),
            20.0
        );
    }

    #[test]
    fn scale_method_follows_scale_source() {
        let batch = DetectionBatch::new(
            vec![Detection::new("regua", 50.0, 20.0, 100.0, 6.0, 0.8)],
            ImageSize::default(),
        );
        let detected = analyze(&batch, None).unwrap();
        let record = MeasurementRecord::from_analysis("p-3", &detected);
        assert_eq!(record.scale_method, ScaleMethod::Auto);
        assert_eq!(serde_json::to_value(&record).unwrap()["scale_method"], "auto");

        let fallback = analyze(&DetectionBatch::default(), None).unwrap();
        assert_eq!(ScaleMethod::from(fallback.scale.source), ScaleMethod::Auto);

        let lidar = MeasurementRecord::from_analysis("p-3", &detected)
            .with_scale_method(ScaleMethod::Lidar);
        assert_eq!(serde_json::to_value(&lidar).unwrap()["scale_method"], "lidar");

        let stored: ScaleMethod = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(stored, ScaleMethod::Auto);
    }
}
