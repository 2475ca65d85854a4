//! Clinical distances computed from resolved landmarks.
//!
//! Five measurements are produced for every image. Each has a fixed formula
//! over pixel coordinates; the pixel length is converted with the resolved
//! cm/px factor and rounded to one decimal (half away from zero).
//!
//! | key                      | roles                              | pixels              |
//! |--------------------------|------------------------------------|---------------------|
//! | `distancia_intermamilar` | nipple L, nipple R                 | Euclidean distance  |
//! | `altura_mamilo_sulco`    | nipple R, inframammary fold R      | `|Δy|`              |
//! | `projecao_mamaria`       | nipple R, midline                  | `|Δx| · 0.8`        |
//! | `largura_base_mama`      | breast base R                      | box width           |
//! | `altura_mama`            | nipple R, breast base R            | `|Δy|`              |
//!
//! Height, width and projection use the right side only. A measurement whose
//! landmarks are missing is `0` and flagged unavailable; partial coverage is
//! normal and never an error. The same holds for a length that overflows to a
//! non-finite centimeter value.

use crate::landmarks::{LandmarkMap, LandmarkRole};
use crate::scale::ScaleFactor;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The fixed set of measurements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeasurementKind {
    InterNippleDistance,
    NippleToFoldHeight,
    BreastProjection,
    BreastBaseWidth,
    BreastHeight,
}

impl MeasurementKind {
    pub const COUNT: usize = 5;

    pub const ALL: [MeasurementKind; Self::COUNT] = [
        MeasurementKind::InterNippleDistance,
        MeasurementKind::NippleToFoldHeight,
        MeasurementKind::BreastProjection,
        MeasurementKind::BreastBaseWidth,
        MeasurementKind::BreastHeight,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// Key used by downstream storage and UI. Stable.
    pub fn key(self) -> &'static str {
        match self {
            MeasurementKind::InterNippleDistance => "distancia_intermamilar",
            MeasurementKind::NippleToFoldHeight => "altura_mamilo_sulco",
            MeasurementKind::BreastProjection => "projecao_mamaria",
            MeasurementKind::BreastBaseWidth => "largura_base_mama",
            MeasurementKind::BreastHeight => "altura_mama",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    /// Landmarks that must be present for the measurement to be computed.
    pub fn required_roles(self) -> &'static [LandmarkRole] {
        match self {
            MeasurementKind::InterNippleDistance => {
                &[LandmarkRole::NippleLeft, LandmarkRole::NippleRight]
            }
            MeasurementKind::NippleToFoldHeight => &[
                LandmarkRole::NippleRight,
                LandmarkRole::InframammaryFoldRight,
            ],
            MeasurementKind::BreastProjection => {
                &[LandmarkRole::NippleRight, LandmarkRole::MidLine]
            }
            MeasurementKind::BreastBaseWidth => &[LandmarkRole::BreastBaseRight],
            MeasurementKind::BreastHeight => {
                &[LandmarkRole::NippleRight, LandmarkRole::BreastBaseRight]
            }
        }
    }
}

/// Centimeter value for each of the five measurements.
///
/// Serializes as a flat `{ key: number }` object holding all five keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "BTreeMap<String, f64>", try_from = "BTreeMap<String, f64>")]
pub struct MeasurementSet {
    values: [f64; MeasurementKind::COUNT],
}

impl MeasurementSet {
    pub fn get(&self, kind: MeasurementKind) -> f64 {
        self.values[kind.index()]
    }

    pub fn set(&mut self, kind: MeasurementKind, cm: f64) {
        self.values[kind.index()] = cm;
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeasurementKind, f64)> + '_ {
        MeasurementKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

impl From<MeasurementSet> for BTreeMap<String, f64> {
    fn from(set: MeasurementSet) -> Self {
        set.iter().map(|(k, v)| (k.key().to_string(), v)).collect()
    }
}

impl TryFrom<BTreeMap<String, f64>> for MeasurementSet {
    type Error = String;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut set = MeasurementSet::default();
        for (key, value) in &map {
            let kind = MeasurementKind::from_key(key)
                .ok_or_else(|| format!("unknown measurement '{key}'"))?;
            if !value.is_finite() || *value < 0.0 {
                return Err(format!("measurement '{key}' must be a non-negative number"));
            }
            set.set(kind, *value);
        }
        if let Some(missing) = MeasurementKind::ALL
            .iter()
            .find(|k| !map.contains_key(k.key()))
        {
            return Err(format!("missing measurement '{}'", missing.key()));
        }
        Ok(set)
    }
}

/// Whether each measurement was computed or defaulted for missing landmarks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(into = "BTreeMap<String, bool>")]
pub struct MeasurementAvailability {
    flags: [bool; MeasurementKind::COUNT],
}

impl MeasurementAvailability {
    pub fn is_available(&self, kind: MeasurementKind) -> bool {
        self.flags[kind.index()]
    }

    pub fn available_count(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }

    pub fn missing(&self) -> impl Iterator<Item = MeasurementKind> + '_ {
        MeasurementKind::ALL
            .into_iter()
            .filter(move |k| !self.is_available(*k))
    }
}

impl From<MeasurementAvailability> for BTreeMap<String, bool> {
    fn from(a: MeasurementAvailability) -> Self {
        MeasurementKind::ALL
            .into_iter()
            .map(|k| (k.key().to_string(), a.is_available(k)))
            .collect()
    }
}

/// Calculator parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureParams {
    /// Foreshortening correction applied to the 2D projection estimate.
    pub projection_correction: f64,
}

impl Default for MeasureParams {
    fn default() -> Self {
        Self {
            projection_correction: 0.8,
        }
    }
}

impl MeasureParams {
    pub fn validate(&self) -> Result<(), String> {
        let k = self.projection_correction;
        if !k.is_finite() || k < 0.0 {
            return Err(format!(
                "projection_correction must be finite and >= 0, got {k}"
            ));
        }
        Ok(())
    }
}

/// Measurement values plus their availability flags.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Measurements {
    pub values: MeasurementSet,
    pub availability: MeasurementAvailability,
}

/// Rounds to one decimal, half away from zero.
#[inline]
pub fn round_to_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Pixel length of `kind`, or `None` if a required landmark is missing.
pub fn pixel_length(
    kind: MeasurementKind,
    landmarks: &LandmarkMap,
    params: &MeasureParams,
) -> Option<f64> {
    use LandmarkRole::*;
    match kind {
        MeasurementKind::InterNippleDistance => {
            let l = landmarks.get(NippleLeft)?;
            let r = landmarks.get(NippleRight)?;
            Some(nalgebra::distance(&l.center, &r.center))
        }
        MeasurementKind::NippleToFoldHeight => {
            let n = landmarks.get(NippleRight)?;
            let f = landmarks.get(InframammaryFoldRight)?;
            Some((n.center.y - f.center.y).abs())
        }
        MeasurementKind::BreastProjection => {
            let n = landmarks.get(NippleRight)?;
            let m = landmarks.get(MidLine)?;
            Some((n.center.x - m.center.x).abs() * params.projection_correction)
        }
        MeasurementKind::BreastBaseWidth => {
            landmarks.get(BreastBaseRight).map(|b| b.size.width)
        }
        MeasurementKind::BreastHeight => {
            let n = landmarks.get(NippleRight)?;
            let b = landmarks.get(BreastBaseRight)?;
            Some((n.center.y - b.center.y).abs())
        }
    }
}

/// Computes all five measurements with availability flags.
#[derive(Clone, Debug, Default)]
pub struct MeasurementCalculator {
    params: MeasureParams,
}

impl MeasurementCalculator {
    pub fn new(params: MeasureParams) -> Self {
        Self { params }
    }

    pub fn compute(&self, landmarks: &LandmarkMap, scale: ScaleFactor) -> Measurements {
        let mut out = Measurements::default();
        for kind in MeasurementKind::ALL {
            let Some(px) = pixel_length(kind, landmarks, &self.params) else {
                let missing: Vec<_> = kind
                    .required_roles()
                    .iter()
                    .filter(|r| !landmarks.contains(**r))
                    .collect();
                debug!(
                    "MeasurementCalculator: {} unavailable (missing {missing:?}), emitting 0",
                    kind.key()
                );
                continue;
            };
            let cm = round_to_tenth(scale.to_cm(px));
            if !cm.is_finite() || cm < 0.0 {
                warn!(
                    "MeasurementCalculator: {} out of range ({px} px -> {cm} cm), emitting 0",
                    kind.key()
                );
                continue;
            }
            out.values.set(kind, cm);
            out.availability.flags[kind.index()] = true;
        }
        out
    }
}

/// Computes the measurement set with default parameters.
pub fn compute_measurements(landmarks: &LandmarkMap, scale: ScaleFactor) -> MeasurementSet {
    MeasurementCalculator::default().compute(landmarks, scale).values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Detection;
    use crate::landmarks::map_landmarks;
    use approx::assert_relative_eq;

    fn scale(v: f64) -> ScaleFactor {
        ScaleFactor::new(v).unwrap()
    }

    fn full_torso() -> Vec<Detection> {
        vec![
            Detection::new("mamilo_esquerdo", 100.0, 200.0, 10.0, 10.0, 0.9),
            Detection::new("mamilo_direito", 300.0, 210.0, 10.0, 10.0, 0.9),
            Detection::new("sulco_inframamario_direito", 305.0, 330.0, 80.0, 12.0, 0.8),
            Detection::new("base_mama_direita", 290.0, 150.0, 140.0, 160.0, 0.7),
            Detection::new("linha_media", 200.0, 250.0, 6.0, 300.0, 0.85),
        ]
    }

    #[test]
    fn computes_all_five_formulas() {
        let map = map_landmarks(&full_torso());
        let m = MeasurementCalculator::default().compute(&map, scale(0.1));
        let v = m.values;
        // sqrt(200^2 + 10^2) = 200.2498 px
        assert_relative_eq!(v.get(MeasurementKind::InterNippleDistance), 20.0);
        assert_relative_eq!(v.get(MeasurementKind::NippleToFoldHeight), 12.0);
        assert_relative_eq!(v.get(MeasurementKind::BreastProjection), 8.0);
        assert_relative_eq!(v.get(MeasurementKind::BreastBaseWidth), 14.0);
        assert_relative_eq!(v.get(MeasurementKind::BreastHeight), 6.0);
        assert_eq!(m.availability.available_count(), 5);
    }

    #[test]
    fn rounding_keeps_one_decimal() {
        assert_relative_eq!(round_to_tenth(117.3 * 0.1), 11.7);
        assert_relative_eq!(round_to_tenth(0.04), 0.0);
        assert_relative_eq!(round_to_tenth(2.25), 2.3);

        let dets = vec![Detection::new("base_mama_direita", 0.0, 0.0, 117.3, 1.0, 1.0)];
        let set = compute_measurements(&map_landmarks(&dets), scale(0.1));
        assert_eq!(set.get(MeasurementKind::BreastBaseWidth), 11.7);
    }

    #[test]
    fn missing_nipple_yields_zero_and_unavailable() {
        let dets: Vec<Detection> = full_torso()
            .into_iter()
            .filter(|d| d.label != "mamilo_esquerdo")
            .collect();
        let m = MeasurementCalculator::default().compute(&map_landmarks(&dets), scale(0.1));
        assert_eq!(m.values.get(MeasurementKind::InterNippleDistance), 0.0);
        assert!(!m.availability.is_available(MeasurementKind::InterNippleDistance));
        assert_eq!(
            m.availability.missing().collect::<Vec<_>>(),
            vec![MeasurementKind::InterNippleDistance]
        );
    }

    #[test]
    fn left_side_landmarks_alone_compute_nothing() {
        let dets = vec![
            Detection::new("mamilo_esquerdo", 100.0, 200.0, 10.0, 10.0, 0.9),
            Detection::new("sulco_inframamario_esquerdo", 100.0, 320.0, 10.0, 10.0, 0.9),
            Detection::new("base_mama_esquerda", 100.0, 150.0, 90.0, 10.0, 0.9),
        ];
        let m = MeasurementCalculator::default().compute(&map_landmarks(&dets), scale(0.1));
        assert_eq!(m.availability.available_count(), 0);
        assert!(m.values.iter().all(|(_, v)| v == 0.0));
    }

    #[test]
    fn projection_correction_is_configurable() {
        let calc = MeasurementCalculator::new(MeasureParams {
            projection_correction: 1.0,
        });
        let m = calc.compute(&map_landmarks(&full_torso()), scale(0.1));
        assert_relative_eq!(m.values.get(MeasurementKind::BreastProjection), 10.0);
    }

    #[test]
    fn overflowing_length_is_unavailable() {
        let dets = vec![
            Detection::new("mamilo_esquerdo", -1e308, 0.0, 10.0, 10.0, 0.9),
            Detection::new("mamilo_direito", 1e308, 0.0, 10.0, 10.0, 0.9),
            Detection::new("base_mama_direita", 0.0, 0.0, 1e10, 10.0, 0.9),
        ];
        let map = map_landmarks(&dets);
        let m = MeasurementCalculator::default().compute(&map, scale(0.1));
        assert_eq!(m.values.get(MeasurementKind::InterNippleDistance), 0.0);
        assert!(!m.availability.is_available(MeasurementKind::InterNippleDistance));
        assert!(m.availability.is_available(MeasurementKind::BreastBaseWidth));

        // 1e10 px at 1e301 cm/px
        let m = MeasurementCalculator::default().compute(&map, scale(1e301));
        assert_eq!(m.values.get(MeasurementKind::BreastBaseWidth), 0.0);
        assert!(!m.availability.is_available(MeasurementKind::BreastBaseWidth));

        let json = serde_json::to_string(&m.values).unwrap();
        let back: MeasurementSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m.values);
    }

    #[test]
    fn negative_projection_correction_is_rejected() {
        assert!(MeasureParams::default().validate().is_ok());
        assert!(MeasureParams { projection_correction: 0.0 }.validate().is_ok());
        for bad in [-0.8, f64::NAN, f64::INFINITY] {
            let err = MeasureParams {
                projection_correction: bad,
            }
            .validate()
            .unwrap_err();
            assert!(err.starts_with("projection_correction must be finite"), "{err}");
        }
    }

    #[test]
    fn serializes_as_flat_key_map() {
        let mut set = MeasurementSet::default();
        set.set(MeasurementKind::InterNippleDistance, 20.0);
        let json = serde_json::to_value(set).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        assert_eq!(obj["distancia_intermamilar"], 20.0);
        assert_eq!(obj["altura_mama"], 0.0);

        let back: MeasurementSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn deserialization_requires_known_complete_keys() {
        let partial = r#"{"distancia_intermamilar": 1.0}"#;
        assert!(serde_json::from_str::<MeasurementSet>(partial).is_err());
        let unknown = r#"{"distancia_intermamilar": 1.0, "altura_mamilo_sulco": 0,
            "projecao_mamaria": 0, "largura_base_mama": 0, "altura_mama": 0, "cup": 3}"#;
        assert!(serde_json::from_str::<MeasurementSet>(unknown).is_err());
    }
}
