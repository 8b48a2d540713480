//! Display surface contract
//!
//! The set of visual slots the progress interpreter writes into: one
//! progress row per channel (bar, percent readout, label), a status line,
//! the elapsed timer, and one confidence marker per channel row. The
//! surface is owned by the surrounding UI; the core only requires every
//! operation to be idempotent.

use crate::normalize::{MarkerPosition, EMPTY_SCORE_LABEL};

/// Visual surface receiving per-channel progress and marker updates.
///
/// Channels are addressed by their wire identifier. Implementations must
/// tolerate identifiers outside the known set (no bound slots) by doing
/// nothing, and repeating any call with the same arguments must leave the
/// surface unchanged.
pub trait DisplaySurface {
    fn set_channel_percent(&mut self, channel: &str, pct: u8);
    fn set_channel_label(&mut self, channel: &str, text: &str);
    fn mark_complete(&mut self, channel: &str);
    fn mark_all_complete(&mut self);
    fn set_status_text(&mut self, text: &str);
    fn set_elapsed(&mut self, minutes: u64, seconds: u64);
    fn set_marker(&mut self, channel: &str, position: MarkerPosition);
}

/// Reset every channel's confidence marker to its empty state.
///
/// This is the clear-score behavior: the marker rows stay visible but show
/// the empty label until the next acknowledged result repaints them.
pub fn clear_markers(surface: &mut dyn DisplaySurface) {
    for channel in sga_common::AnalysisChannel::ALL {
        surface.set_marker(channel.as_str(), MarkerPosition::Absent);
    }
}

/// Console-backed surface for the command-line front end.
///
/// Progress lands in the log stream rather than a widget tree. Per-channel
/// percent and timer updates log at debug level to keep the info feed
/// readable; the status line is deduplicated so repeated identical updates
/// stay quiet.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    last_status: Option<String>,
}

impl DisplaySurface for ConsoleSurface {
    fn set_channel_percent(&mut self, channel: &str, pct: u8) {
        tracing::debug!(channel = channel, pct = pct, "channel progress");
    }

    fn set_channel_label(&mut self, channel: &str, text: &str) {
        tracing::debug!(channel = channel, label = text, "channel label");
    }

    fn mark_complete(&mut self, channel: &str) {
        tracing::debug!(channel = channel, "channel complete");
    }

    fn mark_all_complete(&mut self) {
        tracing::info!("All channels complete");
    }

    fn set_status_text(&mut self, text: &str) {
        if self.last_status.as_deref() != Some(text) {
            tracing::info!("{}", text);
            self.last_status = Some(text.to_string());
        }
    }

    fn set_elapsed(&mut self, minutes: u64, seconds: u64) {
        tracing::debug!("elapsed {:02}m{:02}s", minutes, seconds);
    }

    fn set_marker(&mut self, channel: &str, position: MarkerPosition) {
        tracing::info!(
            channel = channel,
            score = %position.score_label(EMPTY_SCORE_LABEL),
            "confidence marker"
        );
    }
}
