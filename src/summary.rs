//! Request payload for the external narrative summarization function.
//!
//! The hosted function accepts an image reference, a measurement set, or
//! both, plus optional patient metadata, and answers with free text in
//! Portuguese. When an image is present it is analysed instead of the
//! measurements. The call itself lives outside this crate; here we only build
//! the body and the prompt it is derived from.

use crate::measure::MeasurementSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SummaryRequestError {
    /// Neither an image nor measurements were supplied.
    MissingInput,
}

impl std::fmt::Display for SummaryRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingInput => write!(f, "an image or a measurement set is required"),
        }
    }
}

impl std::error::Error for SummaryRequestError {}

const PREAMBLE: &str = "You are a specialist in breast anthropometry. ";
const ANSWER_LANGUAGE: &str = "Answer in Portuguese.";

/// Which branch of the summarization function a request takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    ImageAnalysis,
    MeasurementAnalysis,
}

/// Body sent to the summarization function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<MeasurementSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_info: Option<Value>,
}

impl SummaryRequest {
    pub fn new(
        image_url: Option<String>,
        measurements: Option<MeasurementSet>,
        patient_info: Option<Value>,
    ) -> Result<Self, SummaryRequestError> {
        let image_url = image_url.filter(|u| !u.trim().is_empty());
        if image_url.is_none() && measurements.is_none() {
            return Err(SummaryRequestError::MissingInput);
        }
        Ok(Self {
            image_url,
            measurements,
            patient_info,
        })
    }

    pub fn for_measurements(measurements: MeasurementSet) -> Self {
        Self {
            image_url: None,
            measurements: Some(measurements),
            patient_info: None,
        }
    }

    pub fn with_patient_info(mut self, info: Value) -> Self {
        self.patient_info = Some(info);
        self
    }

    /// Prompt the function answers, image first.
    pub fn prompt(&self) -> Option<(SummaryKind, String)> {
        if let Some(prompt) = self.image_prompt() {
            return Some((SummaryKind::ImageAnalysis, prompt));
        }
        self.measurement_prompt()
            .map(|prompt| (SummaryKind::MeasurementAnalysis, prompt))
    }

    /// Prompt sent alongside the image, `None` without an image.
    pub fn image_prompt(&self) -> Option<String> {
        self.image_url.as_ref()?;
        let mut prompt = String::from(PREAMBLE);
        prompt.push_str(
            "Analyse this breast image and give detailed technical observations on:\n\
             1. Symmetry and proportions\n\
             2. Contours and shape\n\
             3. Technical aspects relevant to measurement\n\
             4. Professional recommendations\n\
             \nBe precise, technical and objective. ",
        );
        prompt.push_str(ANSWER_LANGUAGE);
        Some(prompt)
    }

    /// Prompt summarizing the measurement set, `None` without measurements.
    pub fn measurement_prompt(&self) -> Option<String> {
        let measurements = self.measurements.as_ref()?;
        let mut prompt = String::from(PREAMBLE);
        prompt.push_str(
            "Based on these measurements (centimeters), provide technical observations:\n",
        );
        prompt.push_str(&serde_json::to_string_pretty(measurements).ok()?);
        prompt.push('\n');
        if let Some(info) = &self.patient_info {
            prompt.push_str("\nPatient information: ");
            prompt.push_str(&serde_json::to_string_pretty(info).ok()?);
            prompt.push('\n');
        }
        prompt.push_str(
            "\nAnalyse:\n\
             1. Measured values and whether they are within normal ranges\n\
             2. Proportions and symmetry\n\
             3. Technical suggestions\n\
             4. Relevant clinical observations\n\
             \nBe technical and precise. ",
        );
        prompt.push_str(ANSWER_LANGUAGE);
        Some(prompt)
    }
}
