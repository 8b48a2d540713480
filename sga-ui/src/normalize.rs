//! Result normalization
//!
//! The service encodes "zero, one, or many observations" inconsistently
//! depending on analysis type: a feature payload may be null, a single
//! record, an array of records, or a keyed map of records. The pure
//! functions here erase that inconsistency, and turn the per-channel
//! confidence map into clamped marker positions ready for layout.

use serde_json::Value;
use sga_common::AnalysisChannel;
use std::collections::BTreeMap;

/// Default text shown where a marker has no computed confidence.
pub const EMPTY_SCORE_LABEL: &str = "--";

/// Upper bound for marker fractions. A marker at 1.0 would sit outside the
/// bar row, so full confidence renders at 0.99 of the width.
pub const MAX_MARKER_FRACTION: f64 = 0.99;

/// Horizontal marker position for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerPosition {
    /// Confidence not computed for this channel.
    Absent,
    /// Fraction of the bar width, clamped to [0, [`MAX_MARKER_FRACTION`]].
    At(f64),
}

impl MarkerPosition {
    pub fn fraction(&self) -> Option<f64> {
        match self {
            MarkerPosition::Absent => None,
            MarkerPosition::At(fraction) => Some(*fraction),
        }
    }

    /// Percent text for the score readout ("87%"), or the empty label.
    ///
    /// The label rounds to whole percent; the fraction itself keeps full
    /// precision for layout.
    pub fn score_label(&self, empty_label: &str) -> String {
        match self {
            MarkerPosition::Absent => empty_label.to_string(),
            MarkerPosition::At(fraction) => format!("{}%", (fraction * 100.0).round() as i64),
        }
    }
}

/// Measure numbers at which each timeline feature was observed to change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineMarks {
    pub key: Vec<f64>,
    pub tempo: Vec<f64>,
    pub meter: Vec<f64>,
}

/// A point on the normalized timeline where some attribute changes.
///
/// Each source feature contributes its own ticks; ticks sharing a measure
/// number are intentionally not merged.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineTick {
    pub measure: f64,
    pub tempo: Option<String>,
    pub meter: Option<String>,
    pub key: Option<String>,
}

impl TimelineTick {
    /// Text shown above/below the tick mark, if the source record had any.
    pub fn text(&self) -> Option<&str> {
        self.tempo
            .as_deref()
            .or(self.meter.as_deref())
            .or(self.key.as_deref())
    }
}

/// Normalize a feature payload into its finite `measure` values.
///
/// Accepts null (no observations), a single record carrying a `measure`
/// field, an array of records, or a keyed map of records. Records whose
/// `measure` is missing, non-numeric, or non-finite are dropped. Order
/// follows the payload: element order for arrays, iteration order for maps.
pub fn extract_measures(payload: &Value) -> Vec<f64> {
    feature_records(Some(payload))
        .into_iter()
        .filter_map(measure_of)
        .collect()
}

/// Marker positions for every recognized channel in a confidence map.
///
/// Identifiers outside the registry vocabulary are skipped. A null
/// confidence maps to `Absent`; anything else is clamped into
/// [0, [`MAX_MARKER_FRACTION`]] — out-of-range values from upstream are
/// clamped, never rejected.
pub fn marker_positions(
    confidences: &BTreeMap<String, Option<f64>>,
) -> BTreeMap<AnalysisChannel, MarkerPosition> {
    let mut positions = BTreeMap::new();
    for (name, value) in confidences {
        let Some(channel) = AnalysisChannel::parse(name) else {
            continue;
        };
        let position = match value {
            None => MarkerPosition::Absent,
            Some(v) => MarkerPosition::At(v.clamp(0.0, MAX_MARKER_FRACTION)),
        };
        positions.insert(channel, position);
    }
    positions
}

/// Per-feature measure lists from the result's `analysis_notes`.
///
/// Key and tempo observations sit directly under their feature name; meter
/// observations are nested one level down under `meter_data`.
pub fn timeline_marks(notes: &Value) -> TimelineMarks {
    TimelineMarks {
        key: measures_of(notes.get("key")),
        tempo: measures_of(notes.get("tempo")),
        meter: measures_of(notes.get("meter").and_then(|meter| meter.get("meter_data"))),
    }
}

/// Derive display ticks from the result's `analysis_notes`.
///
/// One tick per feature observation with a finite measure; tick text is
/// taken from the record when present (a tempo record's `bpm`, a meter
/// record's `time_signature`, a key record's `key`).
pub fn timeline_ticks(notes: &Value) -> Vec<TimelineTick> {
    let mut ticks = Vec::new();

    for record in feature_records(notes.get("key")) {
        if let Some(measure) = measure_of(record) {
            ticks.push(TimelineTick {
                measure,
                tempo: None,
                meter: None,
                key: text_field(record, "key"),
            });
        }
    }

    for record in feature_records(notes.get("tempo")) {
        if let Some(measure) = measure_of(record) {
            ticks.push(TimelineTick {
                measure,
                tempo: text_field(record, "bpm"),
                meter: None,
                key: None,
            });
        }
    }

    let meter_data = notes.get("meter").and_then(|meter| meter.get("meter_data"));
    for record in feature_records(meter_data) {
        if let Some(measure) = measure_of(record) {
            ticks.push(TimelineTick {
                measure,
                tempo: None,
                meter: text_field(record, "time_signature"),
                key: None,
            });
        }
    }

    ticks
}

/// The record sequence behind a feature payload's container shapes.
fn feature_records(payload: Option<&Value>) -> Vec<&Value> {
    match payload {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(record @ Value::Object(map)) if map.contains_key("measure") => vec![record],
        Some(Value::Object(map)) => map.values().collect(),
        _ => Vec::new(),
    }
}

fn measures_of(payload: Option<&Value>) -> Vec<f64> {
    feature_records(payload).into_iter().filter_map(measure_of).collect()
}

fn measure_of(record: &Value) -> Option<f64> {
    record.get("measure")?.as_f64().filter(|m| m.is_finite())
}

fn text_field(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
