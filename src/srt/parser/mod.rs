use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::error::SrtError;

static BLOCK_SEPARATOR: OnceLock<Regex> = OnceLock::new();
static TIMECODE: OnceLock<Regex> = OnceLock::new();

fn block_separator() -> &'static Regex {
    BLOCK_SEPARATOR.get_or_init(|| Regex::new(r"\n\s*\n").expect("block separator pattern"))
}

fn timecode() -> &'static Regex {
    TIMECODE.get_or_init(|| {
        Regex::new(r"(\d{2}:\d{2}:\d{2},\d{3}) --> (\d{2}:\d{2}:\d{2},\d{3})")
            .expect("timecode pattern")
    })
}

/// One subtitle cue. Timecodes are kept as written (`HH:MM:SS,mmm`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrtEntry {
    pub id: usize,
    pub start_time: String,
    pub end_time: String,
    pub text: String,
}

/// Parses SRT content into cues, renumbering them from 1.
///
/// Each block needs an index line, a `start --> end` timecode line and at
/// least one text line. Blank-only input yields no cues.
pub fn parse_srt(content: &str) -> Result<Vec<SrtEntry>, SrtError> {
    let normalized = content.replace("\r\n", "\n");

    block_separator()
        .split(normalized.trim())
        .filter(|block| !block.trim().is_empty())
        .enumerate()
        .map(|(index, block)| parse_block(index + 1, block))
        .collect()
}

fn parse_block(block_number: usize, block: &str) -> Result<SrtEntry, SrtError> {
    let lines: Vec<&str> = block.trim().split('\n').collect();
    if lines.len() < 3 {
        return Err(SrtError::InvalidBlock {
            block: block_number,
        });
    }

    let captures = timecode()
        .captures(lines[1])
        .ok_or(SrtError::InvalidTimecode {
            block: block_number,
        })?;

    Ok(SrtEntry {
        id: block_number,
        start_time: captures[1].to_string(),
        end_time: captures[2].to_string(),
        text: lines[2..].join("\n").trim().to_string(),
    })
}

pub fn format_srt(entries: &[SrtEntry]) -> String {
    let mut rendered = entries
        .iter()
        .map(|entry| {
            format!(
                "{}\n{} --> {}\n{}",
                entry.id, entry.start_time, entry.end_time, entry.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    rendered.push('\n');
    rendered
}

#[cfg(test)]
mod tests;
