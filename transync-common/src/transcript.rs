//! Transcript segments and the on-disk storage format
//!
//! One segment per line: `start_time,end_time,text,modified`.
//!
//! - `start_time` / `end_time` are integer seconds
//! - `text` may contain the delimiter; the trailing flag is split from the right
//! - `modified` is `0` or `1`
//! - Files where no row has a trailing flag are legacy: `text` runs to the end
//!   of the line and every segment loads with `modified = false`
//! - In a flagged file every row must carry the flag
//!
//! Loading is all-or-nothing: a single malformed row aborts the load, since a
//! skipped row would shift every index after it.

use crate::{Error, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Field delimiter of the storage format
pub const DELIMITER: char = ',';

/// One timestamped span of transcript text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Offset of the first word within the media
    pub start_time: Duration,

    /// Offset where the segment stops being current
    pub end_time: Duration,

    /// Segment text (may contain the delimiter)
    pub text: String,

    /// Set whenever `text` is edited after load
    pub modified: bool,
}

impl Segment {
    pub fn new(start_time: Duration, end_time: Duration, text: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
            modified: false,
        }
    }

    /// Replace the text and mark the segment modified
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.modified = true;
    }
}

/// Parse transcript content into an ordered segment list
///
/// Blank lines are ignored. Line numbers in errors are 1-based. The format is
/// decided once per file: when no row carries a trailing `0`/`1` flag the file
/// is legacy and every row's text runs verbatim to the end of the line.
pub fn parse_transcript(content: &str) -> Result<Vec<Segment>> {
    let rows: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .filter(|(_, row)| !row.trim().is_empty())
        .map(|(idx, row)| (idx + 1, row))
        .collect();

    let legacy = !rows.is_empty() && !rows.iter().any(|(_, row)| has_flag(row));
    if legacy {
        debug!("Legacy transcript without modified flags ({} rows)", rows.len());
    }

    rows.into_iter()
        .map(|(line, row)| parse_row(line, row, legacy))
        .collect()
}

/// Whether a row ends in a `,0` / `,1` modified flag after its text
fn has_flag(row: &str) -> bool {
    row.splitn(3, DELIMITER)
        .nth(2)
        .and_then(|rest| rest.rsplit_once(DELIMITER))
        .is_some_and(|(_, flag)| matches!(flag.trim(), "0" | "1"))
}

fn parse_row(line: usize, row: &str, legacy: bool) -> Result<Segment> {
    let mut fields = row.splitn(3, DELIMITER);

    // splitn always yields at least one field
    let start = fields.next().unwrap_or_default();
    let end = fields
        .next()
        .ok_or_else(|| Error::parse(line, "expected at least 3 fields, found 1"))?;
    let rest = fields
        .next()
        .ok_or_else(|| Error::parse(line, "expected at least 3 fields, found 2"))?;

    let start_time = parse_seconds(line, "start_time", start)?;
    let end_time = parse_seconds(line, "end_time", end)?;

    let (text, modified) = if legacy {
        (rest, false)
    } else {
        let (text, flag) = rest
            .rsplit_once(DELIMITER)
            .ok_or_else(|| Error::parse(line, "missing modified flag"))?;
        (text, parse_flag(line, flag)?)
    };

    if end_time <= start_time {
        warn!(
            "Segment at line {} ends at {}s but starts at {}s",
            line,
            end_time.as_secs(),
            start_time.as_secs()
        );
    }

    Ok(Segment {
        start_time,
        end_time,
        text: text.to_string(),
        modified,
    })
}

fn parse_seconds(line: usize, field: &str, raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| Error::parse(line, format!("non-numeric {}: {:?}", field, raw)))
}

fn parse_flag(line: usize, raw: &str) -> Result<bool> {
    match raw.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(Error::parse(
            line,
            format!("unparsable modified flag: {:?}", other),
        )),
    }
}

/// Serialize segments to the storage format (one row per segment)
///
/// Timestamps are written as whole seconds.
pub fn serialize_transcript(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push_str(&format!(
            "{}{d}{}{d}{}{d}{}\n",
            segment.start_time.as_secs(),
            segment.end_time.as_secs(),
            segment.text,
            u8::from(segment.modified),
            d = DELIMITER,
        ));
    }
    out
}

/// Load a transcript file
pub fn load(path: &Path) -> Result<Vec<Segment>> {
    let content = std::fs::read_to_string(path)?;
    let segments = parse_transcript(&content)?;
    info!("Loaded {} segments from {}", segments.len(), path.display());
    Ok(segments)
}

/// Write a transcript file (destination may equal the source)
///
/// Text containing a line break cannot be stored in a row and is rejected
/// before anything is written.
pub fn save(segments: &[Segment], path: &Path) -> Result<()> {
    if let Some(index) = segments
        .iter()
        .position(|s| s.text.contains(['\n', '\r']))
    {
        return Err(Error::InvalidInput(format!(
            "segment {} text contains a line break",
            index
        )));
    }
    std::fs::write(path, serialize_transcript(segments))?;
    info!("Saved {} segments to {}", segments.len(), path.display());
    Ok(())
}

/// Index range of the sliding display window around `current`
///
/// - Near the start: the first `size` segments
/// - Near the end: the last `size` segments
/// - Otherwise: `size / 2` segments before `current`, the rest from `current` on
///
/// The range is clamped to `0..len`, so short transcripts show everything.
pub fn window_bounds(len: usize, current: usize, size: usize) -> std::ops::Range<usize> {
    if len <= size {
        return 0..len;
    }

    let before = size / 2;
    let start = current.saturating_sub(before).min(len - size);
    debug!("Display window {}..{} (current={})", start, start + size, current);
    start..start + size
}
