//! Mapping of detector class names onto anatomical landmark roles.
//!
//! Upstream models label their classes freely (Portuguese class names, short
//! codes, English names). The mapper folds them into the closed
//! [`LandmarkRole`] vocabulary through a static synonym table and keeps the
//! most confident detection per role. Labels that are not in the table are
//! ignored here; ruler detections in particular are consumed by the scale
//! resolver instead.

use crate::detection::Detection;
use log::debug;
use serde::{Deserialize, Serialize};

/// Anatomical reference points understood by the measurement calculator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkRole {
    NippleLeft,
    NippleRight,
    BreastBaseLeft,
    BreastBaseRight,
    InframammaryFoldLeft,
    InframammaryFoldRight,
    MidLine,
}

impl LandmarkRole {
    pub const COUNT: usize = 7;

    pub const ALL: [LandmarkRole; Self::COUNT] = [
        LandmarkRole::NippleLeft,
        LandmarkRole::NippleRight,
        LandmarkRole::BreastBaseLeft,
        LandmarkRole::BreastBaseRight,
        LandmarkRole::InframammaryFoldLeft,
        LandmarkRole::InframammaryFoldRight,
        LandmarkRole::MidLine,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// Looks up the role for an upstream label, if it is a known synonym.
    pub fn from_label(label: &str) -> Option<Self> {
        let key = normalize_label(label);
        LABEL_TABLE
            .iter()
            .find(|(syn, _)| *syn == key)
            .map(|&(_, role)| role)
    }
}

/// Recognised synonyms, already in normalized form.
const LABEL_TABLE: &[(&str, LandmarkRole)] = &[
    ("mamilo_esquerdo", LandmarkRole::NippleLeft),
    ("mamilo_e", LandmarkRole::NippleLeft),
    ("nipple_left", LandmarkRole::NippleLeft),
    ("left_nipple", LandmarkRole::NippleLeft),
    ("mamilo_direito", LandmarkRole::NippleRight),
    ("mamilo_d", LandmarkRole::NippleRight),
    ("nipple_right", LandmarkRole::NippleRight),
    ("right_nipple", LandmarkRole::NippleRight),
    ("base_mama_esquerda", LandmarkRole::BreastBaseLeft),
    ("base_e", LandmarkRole::BreastBaseLeft),
    ("breast_base_left", LandmarkRole::BreastBaseLeft),
    ("left_breast_base", LandmarkRole::BreastBaseLeft),
    ("base_mama_direita", LandmarkRole::BreastBaseRight),
    ("base_d", LandmarkRole::BreastBaseRight),
    ("breast_base_right", LandmarkRole::BreastBaseRight),
    ("right_breast_base", LandmarkRole::BreastBaseRight),
    ("sulco_inframamario_esquerdo", LandmarkRole::InframammaryFoldLeft),
    ("sulco_e", LandmarkRole::InframammaryFoldLeft),
    ("inframammary_fold_left", LandmarkRole::InframammaryFoldLeft),
    ("left_inframammary_fold", LandmarkRole::InframammaryFoldLeft),
    ("sulco_inframamario_direito", LandmarkRole::InframammaryFoldRight),
    ("sulco_d", LandmarkRole::InframammaryFoldRight),
    ("inframammary_fold_right", LandmarkRole::InframammaryFoldRight),
    ("right_inframammary_fold", LandmarkRole::InframammaryFoldRight),
    ("linha_media", LandmarkRole::MidLine),
    ("midline", LandmarkRole::MidLine),
    ("mid_line", LandmarkRole::MidLine),
];

/// Trims, lowercases and folds spaces/hyphens to `_`.
fn normalize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Role → resolved detection for one image. Built once, read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkMap {
    slots: [Option<Resolved>; LandmarkRole::COUNT],
}

#[derive(Clone, Debug, PartialEq)]
struct Resolved {
    source_index: usize,
    detection: Detection,
}

impl LandmarkMap {
    pub fn get(&self, role: LandmarkRole) -> Option<&Detection> {
        self.slots[role.index()].as_ref().map(|r| &r.detection)
    }

    /// Index in the input batch of the detection chosen for `role`.
    pub fn source_index(&self, role: LandmarkRole) -> Option<usize> {
        self.slots[role.index()].as_ref().map(|r| r.source_index)
    }

    pub fn contains(&self, role: LandmarkRole) -> bool {
        self.slots[role.index()].is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolved roles in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (LandmarkRole, &Detection)> + '_ {
        LandmarkRole::ALL
            .iter()
            .filter_map(move |&role| self.get(role).map(|d| (role, d)))
    }
}

/// Builds the landmark map; highest confidence wins, ties keep the first seen.
pub fn map_landmarks(detections: &[Detection]) -> LandmarkMap {
    let mut map = LandmarkMap::default();
    for (i, det) in detections.iter().enumerate() {
        let Some(role) = LandmarkRole::from_label(&det.label) else {
            continue;
        };
        let slot = &mut map.slots[role.index()];
        let replace = match slot {
            Some(current) => det.confidence > current.detection.confidence,
            None => true,
        };
        if replace {
            *slot = Some(Resolved {
                source_index: i,
                detection: det.clone(),
            });
        }
    }
    debug!(
        "map_landmarks: {} of {} detections resolved to {} roles",
        detections
            .iter()
            .filter(|d| LandmarkRole::from_label(&d.label).is_some())
            .count(),
        detections.len(),
        map.len()
    );
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(label: &str, x: f64, confidence: f64) -> Detection {
        Detection::new(label, x, 0.0, 10.0, 10.0, confidence)
    }

    #[test]
    fn synonyms_resolve_to_roles() {
        assert_eq!(
            LandmarkRole::from_label("mamilo_direito"),
            Some(LandmarkRole::NippleRight)
        );
        assert_eq!(
            LandmarkRole::from_label("  Linha Media "),
            Some(LandmarkRole::MidLine)
        );
        assert_eq!(
            LandmarkRole::from_label("sulco-inframamario-esquerdo"),
            Some(LandmarkRole::InframammaryFoldLeft)
        );
        assert_eq!(
            LandmarkRole::from_label("base_d"),
            Some(LandmarkRole::BreastBaseRight)
        );
        assert_eq!(LandmarkRole::from_label("ruler"), None);
        assert_eq!(LandmarkRole::from_label(""), None);
    }

    #[test]
    fn every_role_has_a_synonym() {
        for role in LandmarkRole::ALL {
            assert!(
                LABEL_TABLE.iter().any(|&(_, r)| r == role),
                "no synonym for {role:?}"
            );
        }
    }

    #[test]
    fn highest_confidence_wins() {
        let dets = vec![
            det("mamilo_direito", 1.0, 0.4),
            det("nipple_right", 2.0, 0.9),
            det("mamilo_d", 3.0, 0.6),
        ];
        let map = map_landmarks(&dets);
        let chosen = map.get(LandmarkRole::NippleRight).unwrap();
        assert_eq!(chosen.center.x, 2.0);
        assert_eq!(map.source_index(LandmarkRole::NippleRight), Some(1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn ties_keep_first_seen() {
        let dets = vec![det("linha_media", 1.0, 0.5), det("midline", 2.0, 0.5)];
        let map = map_landmarks(&dets);
        assert_eq!(map.get(LandmarkRole::MidLine).unwrap().center.x, 1.0);
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let dets = vec![det("ruler", 1.0, 0.9), det("umbigo", 2.0, 0.9)];
        let map = map_landmarks(&dets);
        assert!(map.is_empty());
        assert_eq!(map.iter().count(), 0);
    }
}
