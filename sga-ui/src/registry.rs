//! Channel registry
//!
//! Static mapping from analysis-channel identifiers to display metadata:
//! human label, bar color, and the visual slot ids of the channel's
//! progress row. Lookup is total over any identifier string: names outside
//! the known set degrade to a raw-label entry with no bound slots, since
//! the service's channel vocabulary may evolve independently of the client.

use sga_common::AnalysisChannel;
use std::collections::HashMap;

/// Visual slot identifiers for one channel's progress row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotIds {
    /// Progress bar slot
    pub bar: String,
    /// Percent readout slot
    pub pct: String,
    /// Channel label slot
    pub label: String,
}

impl SlotIds {
    fn for_channel(channel: AnalysisChannel) -> Self {
        let key = channel.as_str();
        SlotIds {
            bar: format!("progress-{}", key),
            pct: format!("progress-{}-pct", key),
            label: format!("progress-{}-label", key),
        }
    }
}

/// Display metadata for one channel identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEntry {
    /// The recognized channel, when the identifier is in the closed set.
    pub channel: Option<AnalysisChannel>,
    pub label: String,
    pub color: Option<&'static str>,
    /// Bound progress slots; `None` for unknown identifiers.
    pub slots: Option<SlotIds>,
}

/// Registry of per-channel display metadata.
///
/// Entries are resolved once at construction; event handling reads from
/// this table instead of re-deriving slot ids per event.
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    entries: HashMap<AnalysisChannel, ChannelEntry>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        let entries = AnalysisChannel::ALL
            .into_iter()
            .map(|channel| {
                (
                    channel,
                    ChannelEntry {
                        channel: Some(channel),
                        label: channel.label().to_string(),
                        color: Some(channel.color()),
                        slots: Some(SlotIds::for_channel(channel)),
                    },
                )
            })
            .collect();
        ChannelRegistry { entries }
    }

    /// Metadata for a known channel.
    pub fn entry(&self, channel: AnalysisChannel) -> &ChannelEntry {
        &self.entries[&channel]
    }

    /// Total lookup by identifier string.
    ///
    /// Unknown identifiers yield a degraded-but-safe entry: the raw
    /// identifier as its label, no color, no bound slots.
    pub fn lookup(&self, ident: &str) -> ChannelEntry {
        match AnalysisChannel::parse(ident) {
            Some(channel) => self.entries[&channel].clone(),
            None => ChannelEntry {
                channel: None,
                label: ident.to_string(),
                color: None,
                slots: None,
            },
        }
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
