//! Progress stream interpreter
//!
//! Consumes the ordered event feed for one job, classifies each event, and
//! reconciles it into stable per-channel progress state, driving the
//! display surface as it goes. Events for different channels arrive in no
//! particular order; a given channel's own reported percentages are
//! non-decreasing, but that is upstream's promise — every update here is
//! applied last-write-wins.

use crate::registry::ChannelRegistry;
use crate::surface::DisplaySurface;
use sga_common::{AnalysisChannel, ProgressEvent};
use std::collections::HashMap;

/// Interpreter lifecycle for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Idle,
    Streaming,
    /// Terminal: the feed delivered `Done`.
    Completed,
    /// Terminal: transport failed before `Done`.
    Errored,
}

/// Per-channel progress, live for the duration of one job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelProgressState {
    pub percent: u8,
    pub label: String,
    pub complete: bool,
}

/// State machine reconciling feed events into per-channel display state.
pub struct ProgressInterpreter {
    registry: ChannelRegistry,
    phase: StreamPhase,
    channels: HashMap<AnalysisChannel, ChannelProgressState>,
}

impl ProgressInterpreter {
    pub fn new(registry: ChannelRegistry) -> Self {
        ProgressInterpreter {
            registry,
            phase: StreamPhase::Idle,
            channels: HashMap::new(),
        }
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    pub fn channel(&self, channel: AnalysisChannel) -> Option<&ChannelProgressState> {
        self.channels.get(&channel)
    }

    /// Reset every registered channel to its initial 0% state and enter
    /// `Streaming`.
    pub fn begin(&mut self, surface: &mut dyn DisplaySurface) {
        self.channels.clear();
        for channel in AnalysisChannel::ALL {
            let entry = self.registry.entry(channel);
            self.channels.insert(
                channel,
                ChannelProgressState {
                    percent: 0,
                    label: entry.label.clone(),
                    complete: false,
                },
            );
            surface.set_channel_percent(channel.as_str(), 0);
            surface.set_channel_label(channel.as_str(), &entry.label);
        }
        surface.set_status_text("Starting analysis...");
        self.phase = StreamPhase::Streaming;
    }

    /// Apply one feed event. Returns the phase after the event.
    pub fn apply(
        &mut self,
        event: &ProgressEvent,
        surface: &mut dyn DisplaySurface,
    ) -> StreamPhase {
        if self.phase != StreamPhase::Streaming {
            // Nothing follows Done; a late event from the feed is dropped
            tracing::debug!(
                "Ignoring {} event in phase {:?}",
                event.event_type(),
                self.phase
            );
            return self.phase;
        }

        match event {
            ProgressEvent::Observed {
                analyzer,
                label,
                idx,
                total,
                grade,
            } => self.on_observed(analyzer, label.as_deref(), *idx, *total, *grade, surface),
            ProgressEvent::Analyzer { analyzer } => self.on_analyzer_complete(analyzer, surface),
            ProgressEvent::Done => self.on_done(surface),
        }
        self.phase
    }

    /// Transport failure before `Done`: report it and freeze displayed
    /// percentages exactly as last observed.
    pub fn fail(&mut self, surface: &mut dyn DisplaySurface) {
        surface.set_status_text("Connection lost.");
        self.phase = StreamPhase::Errored;
    }

    fn on_observed(
        &mut self,
        analyzer: &str,
        label: Option<&str>,
        idx: u32,
        total: u32,
        grade: f64,
        surface: &mut dyn DisplaySurface,
    ) {
        // Composite passes report the specific channel via `label`
        let ident = label.unwrap_or(analyzer);
        let entry = self.registry.lookup(ident);

        let percent = if total > 0 {
            ((idx as f64 / total as f64) * 100.0).round() as u8
        } else {
            0
        };

        surface.set_status_text(&format!("{} grade {} - {}%", entry.label, grade, percent));

        let Some(channel) = entry.channel else {
            // Unrecognized channel: status line only, no bound slots
            return;
        };

        let state = self.channels.entry(channel).or_default();
        state.percent = percent;
        state.label = entry.label.clone();

        surface.set_channel_percent(channel.as_str(), percent);
        surface.set_channel_label(channel.as_str(), &entry.label);
    }

    fn on_analyzer_complete(&mut self, analyzer: &str, surface: &mut dyn DisplaySurface) {
        for channel in implied_channels(analyzer) {
            let entry = self.registry.entry(channel);
            let label = entry.label.clone();
            let state = self.channels.entry(channel).or_default();

            // Snap only from the untouched 0% state; fine-grained progress
            // already painted by Observed events stays as-is
            if state.percent == 0 {
                state.percent = 100;
                surface.set_channel_percent(channel.as_str(), 100);
            }
            state.complete = true;
            state.label = label.clone();

            surface.set_channel_label(channel.as_str(), &label);
            surface.mark_complete(channel.as_str());
        }
    }

    fn on_done(&mut self, surface: &mut dyn DisplaySurface) {
        for channel in AnalysisChannel::ALL {
            let state = self.channels.entry(channel).or_default();
            state.percent = 100;
            state.complete = true;
            surface.set_channel_percent(channel.as_str(), 100);
        }
        surface.mark_all_complete();
        surface.set_status_text("Done.");
        self.phase = StreamPhase::Completed;
    }
}

/// Channels implied complete by an analyzer-level completion.
///
/// A completing `key_range` pass reports for the range channel; a
/// completing `tempo_duration` pass covers both of its channels. Anything
/// else maps to itself, and unknown analyzers imply nothing.
fn implied_channels(analyzer: &str) -> Vec<AnalysisChannel> {
    match analyzer {
        "key_range" => vec![AnalysisChannel::Range],
        "tempo_duration" => vec![AnalysisChannel::Tempo, AnalysisChannel::Duration],
        other => AnalysisChannel::parse(other).into_iter().collect(),
    }
}
