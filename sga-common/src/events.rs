//! Event types for the analysis progress feed
//!
//! The remote service delivers one JSON object per feed event, discriminated
//! by a `type` field. Events are modeled as a single tagged union so every
//! consumer matches exhaustively; a new event kind is a compile error at the
//! match site, never a silent drop.
//!
//! Ordering contract of the feed: `Done` is always the last event. Events
//! for different channels carry no cross-channel ordering guarantee, but a
//! single channel's `Observed` percentages are non-decreasing.

use serde::{Deserialize, Serialize};

/// Progress feed event for one analysis job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// A specific checkpoint within one channel's evaluation was reached.
    ///
    /// `analyzer` names the pass; composite passes ("key_range",
    /// "tempo_duration") report the specific channel they are currently on
    /// via `label`. `idx`/`total` locate the checkpoint within the pass and
    /// `grade` is the grade level being evaluated at that checkpoint.
    Observed {
        analyzer: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default)]
        idx: u32,
        #[serde(default)]
        total: u32,
        #[serde(default)]
        grade: f64,
    },

    /// A channel-level pass finished. Composite analyzer names conflate two
    /// logical channels; the interpreter owns that fan-out.
    Analyzer { analyzer: String },

    /// The whole job finished; no further events follow.
    Done,
}

impl ProgressEvent {
    /// Get event type as string for logging and filtering
    pub fn event_type(&self) -> &str {
        match self {
            ProgressEvent::Observed { .. } => "observed",
            ProgressEvent::Analyzer { .. } => "analyzer",
            ProgressEvent::Done => "done",
        }
    }
}
