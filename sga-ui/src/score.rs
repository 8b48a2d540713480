//! Score widget contract and score-text helpers
//!
//! The rendering widget receives raw score text and renders it; beyond
//! `load` and `reset` it is opaque to this crate. The helpers here work on
//! the raw text the same way the widget's host does: pull a display title
//! out of MusicXML metadata and sniff the overall format.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sga_common::Result;

/// Score rendering widget contract.
#[async_trait]
pub trait ScoreWidget {
    /// Load score text into the widget. May suspend while rendering.
    async fn load(&mut self, text: &str) -> Result<()>;

    /// Reset the widget to its empty state.
    fn reset(&mut self);
}

/// Widget stand-in for the console front end: records that a score is
/// loaded and logs its size.
#[derive(Debug, Default)]
pub struct LogScoreWidget {
    loaded_bytes: Option<usize>,
}

impl LogScoreWidget {
    pub fn has_score(&self) -> bool {
        self.loaded_bytes.is_some()
    }
}

#[async_trait]
impl ScoreWidget for LogScoreWidget {
    async fn load(&mut self, text: &str) -> Result<()> {
        self.loaded_bytes = Some(text.len());
        tracing::info!("Score loaded ({} bytes)", text.len());
        Ok(())
    }

    fn reset(&mut self) {
        self.loaded_bytes = None;
        tracing::info!("Score widget reset");
    }
}

/// Recognized score text formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFormat {
    Mei,
    MusicXml,
    Unknown,
}

/// Title-bearing MusicXML elements, in preference order.
const TITLE_TAGS: [&str; 4] = ["work-title", "movement-title", "credit-words", "title"];

static TITLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    TITLE_TAGS
        .iter()
        .map(|tag| {
            // Tags may carry a namespace prefix and attributes
            Regex::new(&format!(
                r"(?s)<(?:[A-Za-z0-9_.-]+:)?{}(?:\s[^>]*)?>([^<]*)<",
                tag
            ))
            .expect("title pattern must compile")
        })
        .collect()
});

/// Extract a display title from score text.
///
/// Checks `work-title`, `movement-title`, `credit-words`, then `title`
/// (namespace-prefixed forms included) and returns the first non-empty
/// text, trimmed. Returns `None` when no tag yields text.
pub fn extract_score_title(text: &str) -> Option<String> {
    for pattern in TITLE_PATTERNS.iter() {
        for capture in pattern.captures_iter(text) {
            let value = capture[1].trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Sniff the score format from the head of the file.
///
/// Only the first 300 characters are examined; that is where both MEI and
/// MusicXML declare their root elements.
pub fn sniff_score_format(text: &str) -> ScoreFormat {
    let head_len = text
        .char_indices()
        .nth(300)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let head = text[..head_len].to_lowercase();

    if head.contains("<mei") {
        ScoreFormat::Mei
    } else if head.contains("<score-partwise") || head.contains("<score-timewise") {
        ScoreFormat::MusicXml
    } else {
        ScoreFormat::Unknown
    }
}
