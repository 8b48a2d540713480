//! Analysis channel vocabulary
//!
//! One channel per analyzable musical dimension. The set is closed at
//! process start; the progress feed and the result payload both key their
//! per-channel data by the lowercase wire names defined here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One analyzable musical dimension, tracked independently through a job's
/// progress feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisChannel {
    Range,
    Key,
    Articulation,
    Rhythm,
    Dynamics,
    Availability,
    Tempo,
    Duration,
    Meter,
}

impl AnalysisChannel {
    /// Every channel, in display order.
    pub const ALL: [AnalysisChannel; 9] = [
        AnalysisChannel::Range,
        AnalysisChannel::Key,
        AnalysisChannel::Articulation,
        AnalysisChannel::Rhythm,
        AnalysisChannel::Dynamics,
        AnalysisChannel::Availability,
        AnalysisChannel::Tempo,
        AnalysisChannel::Duration,
        AnalysisChannel::Meter,
    ];

    /// Lowercase wire name, as used by the progress feed and the
    /// `confidences` map of the result payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisChannel::Range => "range",
            AnalysisChannel::Key => "key",
            AnalysisChannel::Articulation => "articulation",
            AnalysisChannel::Rhythm => "rhythm",
            AnalysisChannel::Dynamics => "dynamics",
            AnalysisChannel::Availability => "availability",
            AnalysisChannel::Tempo => "tempo",
            AnalysisChannel::Duration => "duration",
            AnalysisChannel::Meter => "meter",
        }
    }

    /// Parse a wire name. Returns `None` for identifiers outside the
    /// closed set (the service's vocabulary may evolve independently).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "range" => Some(AnalysisChannel::Range),
            "key" => Some(AnalysisChannel::Key),
            "articulation" => Some(AnalysisChannel::Articulation),
            "rhythm" => Some(AnalysisChannel::Rhythm),
            "dynamics" => Some(AnalysisChannel::Dynamics),
            "availability" => Some(AnalysisChannel::Availability),
            "tempo" => Some(AnalysisChannel::Tempo),
            "duration" => Some(AnalysisChannel::Duration),
            "meter" => Some(AnalysisChannel::Meter),
            _ => None,
        }
    }

    /// Human label shown next to the channel's progress bar and marker row.
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisChannel::Range => "Range",
            AnalysisChannel::Key => "Key",
            AnalysisChannel::Articulation => "Articulation",
            AnalysisChannel::Rhythm => "Rhythm",
            AnalysisChannel::Dynamics => "Dynamics",
            AnalysisChannel::Availability => "Availability",
            AnalysisChannel::Tempo => "Tempo",
            AnalysisChannel::Duration => "Duration",
            AnalysisChannel::Meter => "Meter",
        }
    }

    /// Progress bar color class for the channel.
    pub fn color(&self) -> &'static str {
        match self {
            AnalysisChannel::Range => "orange",
            AnalysisChannel::Key => "pink",
            AnalysisChannel::Articulation => "green",
            AnalysisChannel::Rhythm => "blue",
            AnalysisChannel::Dynamics => "red",
            AnalysisChannel::Availability => "brown",
            AnalysisChannel::Tempo => "yellow",
            AnalysisChannel::Duration => "light-green",
            AnalysisChannel::Meter => "indigo",
        }
    }
}

impl fmt::Display for AnalysisChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
