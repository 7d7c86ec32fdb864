//! Conversion between the native timestamps of the subtitle formats and fractional seconds.

use crate::core::subtitles::SubtitleParseError;

/// The timestamp used when a value can't be represented within a WebVTT document.
pub const VTT_ZERO_TIMESTAMP: &str = "00:00:00.000";

const SRT_FRACTION_SEPARATOR: char = ',';
const VTT_FRACTION_SEPARATOR: char = '.';
const ASS_FRACTION_SEPARATOR: char = '.';
const MILLIS_SCALE: f64 = 1000.0;
const CENTIS_SCALE: f64 = 100.0;

type Result<T> = std::result::Result<T, SubtitleParseError>;

/// Parse a SubRip timestamp `H:MM:SS,mmm` into seconds.
/// The hours may consist of one or more digits and a missing millisecond group is treated as 0.
pub fn parse_srt_timestamp(value: &str) -> Result<f64> {
    parse_clock(value, SRT_FRACTION_SEPARATOR, MILLIS_SCALE, false)
}

/// Parse an ASS timestamp `H:MM:SS.cc` into seconds.
/// The fraction of ASS timestamps are centiseconds, not milliseconds.
pub fn parse_ass_timestamp(value: &str) -> Result<f64> {
    parse_clock(value, ASS_FRACTION_SEPARATOR, CENTIS_SCALE, false)
}

/// Parse a WebVTT timestamp `HH:MM:SS.mmm` or `MM:SS.mmm` into seconds.
pub fn parse_vtt_timestamp(value: &str) -> Result<f64> {
    parse_clock(value, VTT_FRACTION_SEPARATOR, MILLIS_SCALE, true)
}

/// Format the given seconds as a WebVTT timestamp `HH:MM:SS.mmm`.
///
/// The seconds are rounded to whole milliseconds. Negative or non-finite values result in
/// [VTT_ZERO_TIMESTAMP] as formatting never fails.
pub fn format_vtt_timestamp(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return VTT_ZERO_TIMESTAMP.to_string();
    }

    let total_millis = (seconds * MILLIS_SCALE).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

fn parse_clock(value: &str, separator: char, scale: f64, hours_optional: bool) -> Result<f64> {
    let value = value.trim();
    let (clock, fraction) = match value.split_once(separator) {
        Some((clock, fraction)) => (clock, fraction),
        None => (value, ""),
    };
    let parts = clock.split(':').collect::<Vec<&str>>();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [hours, minutes, seconds] => (parse_component(value, hours)?, minutes, seconds),
        [minutes, seconds] if hours_optional => (0, minutes, seconds),
        _ => return Err(SubtitleParseError::InvalidTime(value.to_string())),
    };
    let minutes = parse_component(value, minutes)?;
    let seconds = parse_component(value, seconds)?;
    let fraction = parse_component(value, fraction)?;

    let total_seconds = hours
        .checked_mul(3600)
        .and_then(|e| minutes.checked_mul(60).and_then(|m| e.checked_add(m)))
        .and_then(|e| e.checked_add(seconds))
        .ok_or_else(|| SubtitleParseError::InvalidTime(format!("{}, value is out of range", value)))?;

    Ok(total_seconds as f64 + fraction as f64 / scale)
}

/// Parse a single numeric component of a timestamp, an empty component is treated as 0.
fn parse_component(value: &str, component: &str) -> Result<u64> {
    let component = component.trim();
    if component.is_empty() {
        return Ok(0);
    }

    component
        .parse::<u64>()
        .map_err(|e| SubtitleParseError::InvalidTime(format!("{}, {}", value, e)))
}
