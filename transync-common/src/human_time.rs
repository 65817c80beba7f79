//! Human-readable time formatting
//!
//! Provides the `[MM:SS]` labels shown next to transcript segments.

use crate::transcript::Segment;
use std::time::Duration;

/// Format a media offset as `MM:SS`.
///
/// Fractional seconds are truncated. Minutes are not wrapped into hours, so
/// long recordings show e.g. `125:03`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use transync_common::human_time::format_timestamp;
///
/// assert_eq!(format_timestamp(Duration::from_secs(0)), "00:00");
/// assert_eq!(format_timestamp(Duration::from_secs(75)), "01:15");
/// assert_eq!(format_timestamp(Duration::from_millis(59_999)), "00:59");
/// ```
pub fn format_timestamp(offset: Duration) -> String {
    let seconds = offset.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Render one segment as a display line: `[MM:SS] text`
///
/// Modified segments are prefixed with `*`.
pub fn format_segment_line(segment: &Segment) -> String {
    let marker = if segment.modified { "*" } else { "" };
    format!(
        "{}[{}] {}",
        marker,
        format_timestamp(segment.start_time),
        segment.text
    )
}
