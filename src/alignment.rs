use serde::{Deserialize, Serialize};

use crate::text::LyricsText;

/// One row of the side-by-side display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePair {
    pub index: usize,
    pub source_line: String,
    pub target_line: String,
}

impl LinePair {
    pub fn new(index: usize, source_line: impl Into<String>, target_line: impl Into<String>) -> Self {
        Self {
            index,
            source_line: source_line.into(),
            target_line: target_line.into(),
        }
    }
}

/// Builds the rows to render. Pairs supplied by the translator are used as
/// they are; otherwise lines are paired by position and the shorter side is
/// padded with empty strings so both columns have the same row count.
pub fn build_line_pairs(
    source: &LyricsText,
    target: &LyricsText,
    explicit: Option<&[LinePair]>,
) -> Vec<LinePair> {
    if let Some(pairs) = explicit {
        return pairs.to_vec();
    }
    positional_pairs(&source.lines, &target.lines)
}

fn positional_pairs(source: &[String], target: &[String]) -> Vec<LinePair> {
    let count = source.len().max(target.len());
    (0..count)
        .map(|index| {
            LinePair::new(
                index,
                source.get(index).map(String::as_str).unwrap_or_default(),
                target.get(index).map(String::as_str).unwrap_or_default(),
            )
        })
        .collect()
}
