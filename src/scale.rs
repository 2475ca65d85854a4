//! Pixel → centimeter scale resolution.
//!
//! Resolution order:
//! - a positive, finite manual override wins unchanged;
//! - otherwise the first detection (input order) whose label contains one of
//!   the ruler synonyms gives `ruler_length_cm / width_px`;
//! - otherwise the configured fallback.
//!
//! The resolver never fails and never yields a non-positive factor. Rulers
//! narrower than `min_ruler_width_px` (zero-width boxes included) are
//! skipped, so a ruler factor never exceeds `ruler_length_cm / min_ruler_width_px`.

use crate::detection::Detection;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Centimeters per pixel. Always finite and strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Fallback used when neither an override nor a ruler is available.
    pub const DEFAULT_FALLBACK: ScaleFactor = ScaleFactor(0.1);

    pub fn new(cm_per_px: f64) -> Option<Self> {
        (cm_per_px.is_finite() && cm_per_px > 0.0).then_some(Self(cm_per_px))
    }

    #[inline]
    pub fn cm_per_px(self) -> f64 {
        self.0
    }

    /// Converts a pixel length to centimeters.
    #[inline]
    pub fn to_cm(self, px: f64) -> f64 {
        px * self.0
    }
}

impl TryFrom<f64> for ScaleFactor {
    type Error = String;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        ScaleFactor::new(v).ok_or_else(|| format!("scale factor must be finite and > 0, got {v}"))
    }
}

impl From<ScaleFactor> for f64 {
    fn from(s: ScaleFactor) -> Self {
        s.0
    }
}

/// How the scale of an analysis was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleSource {
    /// Caller-supplied calibration.
    Manual,
    /// Derived from a detected reference ruler.
    Ruler {
        /// Index of the ruler detection in the input batch.
        detection: usize,
    },
    /// No override and no usable ruler.
    Fallback,
}

/// Scale actually used by an analysis together with its provenance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedScale {
    pub factor: ScaleFactor,
    pub source: ScaleSource,
}

/// Parameters of the scale resolver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleParams {
    /// Physical length of the calibration ruler in centimeters.
    pub ruler_length_cm: f64,
    /// Scale used when nothing better is available.
    pub fallback: ScaleFactor,
    /// Case-insensitive substrings identifying a ruler detection.
    pub ruler_labels: Vec<String>,
    /// Rulers whose box is narrower than this are ignored.
    pub min_ruler_width_px: f64,
}

impl Default for ScaleParams {
    fn default() -> Self {
        Self {
            ruler_length_cm: 10.0,
            fallback: ScaleFactor::DEFAULT_FALLBACK,
            ruler_labels: vec!["ruler".into(), "regua".into(), "régua".into()],
            min_ruler_width_px: 1.0,
        }
    }
}

impl ScaleParams {
    pub fn validate(&self) -> Result<(), String> {
        if !self.ruler_length_cm.is_finite() || self.ruler_length_cm <= 0.0 {
            return Err(format!(
                "ruler_length_cm must be finite and > 0, got {}",
                self.ruler_length_cm
            ));
        }
        if !self.min_ruler_width_px.is_finite() || self.min_ruler_width_px <= 0.0 {
            return Err(format!(
                "min_ruler_width_px must be finite and > 0, got {}",
                self.min_ruler_width_px
            ));
        }
        Ok(())
    }
}

/// Resolves the cm/px factor for one image.
#[derive(Clone, Debug, Default)]
pub struct ScaleResolver {
    params: ScaleParams,
}

impl ScaleResolver {
    pub fn new(params: ScaleParams) -> Self {
        Self { params }
    }

    /// Whether `label` names a reference ruler.
    pub fn is_ruler_label(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.params
            .ruler_labels
            .iter()
            .any(|syn| label.contains(&syn.to_lowercase()))
    }

    /// Scale from the first usable ruler detection, if any.
    pub fn scale_from_ruler(&self, detections: &[Detection]) -> Option<(usize, ScaleFactor)> {
        detections.iter().enumerate().find_map(|(i, det)| {
            if !self.is_ruler_label(&det.label) {
                return None;
            }
            let width = det.size.width;
            let factor = (width >= self.params.min_ruler_width_px)
                .then(|| ScaleFactor::new(self.params.ruler_length_cm / width))
                .flatten();
            if factor.is_none() {
                debug!(
                    "ScaleResolver: ruler detection #{i} unusable (width={}px, length={}cm)",
                    width, self.params.ruler_length_cm
                );
            }
            factor.map(|f| (i, f))
        })
    }

    pub fn resolve(
        &self,
        detections: &[Detection],
        override_cm_per_px: Option<f64>,
    ) -> ResolvedScale {
        if let Some(v) = override_cm_per_px {
            match ScaleFactor::new(v) {
                Some(factor) => {
                    return ResolvedScale {
                        factor,
                        source: ScaleSource::Manual,
                    }
                }
                None => warn!("ScaleResolver: ignoring invalid manual scale {v}"),
            }
        }

        if let Some((detection, factor)) = self.scale_from_ruler(detections) {
            debug!(
                "ScaleResolver: ruler #{detection} -> {:.5} cm/px",
                factor.cm_per_px()
            );
            return ResolvedScale {
                factor,
                source: ScaleSource::Ruler { detection },
            };
        }

        warn!(
            "ScaleResolver: no scale available, using fallback {} cm/px",
            self.params.fallback.cm_per_px()
        );
        ResolvedScale {
            factor: self.params.fallback,
            source: ScaleSource::Fallback,
        }
    }
}

/// Resolves a scale with the default ruler vocabulary and a 10 cm ruler.
pub fn resolve_scale(
    detections: &[Detection],
    override_cm_per_px: Option<f64>,
    fallback: ScaleFactor,
) -> ScaleFactor {
    ScaleResolver::new(ScaleParams {
        fallback,
        ..ScaleParams::default()
    })
    .resolve(detections, override_cm_per_px)
    .factor
}
