//! API request/response types for the analysis service
//!
//! Covers the three endpoints the client touches: job submission
//! (`POST /api/analyze`), the progress feed (`GET /api/progress/{job_id}`,
//! events defined in [`crate::events`]), and the result fetch
//! (`GET /api/result/{job_id}`).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Target grades selectable without full-grade search.
pub const BASE_GRADES: [f64; 6] = [0.5, 1.0, 2.0, 3.0, 4.0, 5.0];

/// Target grades selectable when full-grade search is enabled.
pub const FULL_GRADES: [f64; 10] = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];

/// A validated target grade.
///
/// The allowed set depends on whether full-grade search is enabled: the
/// half-grade steps (1.5, 2.5, ...) only exist in full-search mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetGrade(f64);

impl TargetGrade {
    pub fn new(value: f64, full_grade_analysis: bool) -> Result<Self> {
        let allowed: &[f64] = if full_grade_analysis {
            &FULL_GRADES
        } else {
            &BASE_GRADES
        };
        if allowed.iter().any(|g| *g == value) {
            Ok(TargetGrade(value))
        } else {
            Err(Error::InvalidInput(format!(
                "target grade {} is not selectable (full grade search: {})",
                value, full_grade_analysis
            )))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// String-encoded wire form: whole grades without a decimal point
    /// ("2"), half grades with one ("0.5", "4.5").
    pub fn wire_value(&self) -> String {
        if self.0.fract() == 0.0 {
            format!("{}", self.0 as i64)
        } else {
            format!("{}", self.0)
        }
    }
}

/// Options accompanying one job submission.
///
/// Constructed once per submission from caller input; immutable afterwards.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub target_only: bool,
    pub strings_only: bool,
    pub full_grade_analysis: bool,
    pub target_grade: TargetGrade,
}

impl AnalysisOptions {
    pub fn new(
        target_only: bool,
        strings_only: bool,
        full_grade_analysis: bool,
        target_grade: f64,
    ) -> Result<Self> {
        Ok(AnalysisOptions {
            target_only,
            strings_only,
            full_grade_analysis,
            target_grade: TargetGrade::new(target_grade, full_grade_analysis)?,
        })
    }

    /// Text form fields posted alongside the score file, in wire encoding
    /// (booleans as "true"/"false", grade as its string form).
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("target_only", self.target_only.to_string()),
            ("strings_only", self.strings_only.to_string()),
            ("full_grade_analysis", self.full_grade_analysis.to_string()),
            ("target_grade", self.target_grade.wire_value()),
        ]
    }
}

/// Successful submission response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub job_id: Option<String>,
}

/// Error payload returned by the service on a rejected request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub error: Option<String>,
}

/// Envelope of the result fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub result: AnalysisResult,
}

/// Full analysis payload, fetched exactly once after the feed completes.
///
/// `confidences` maps channel wire names to certainty scores; an absent or
/// null entry means "not computed". `analysis_notes` is heterogeneous
/// (the service encodes zero/one/many observations differently per feature)
/// and is normalized downstream, so it stays an untyped value here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub total_measures: Option<f64>,
    #[serde(default)]
    pub confidences: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    pub analysis_notes: serde_json::Value,
}
