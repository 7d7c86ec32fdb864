//! Derives the subtitle format and display name from a source location.
//! The detection is based on the location only, the content is never inspected.

use log::trace;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::core::subtitles::{Result, SubtitleError, SubtitleType};

/// The display name used when no filename can be extracted from a location.
pub const UNKNOWN_SUBTITLE_NAME: &str = "unknown_subtitle";
const UNKNOWN_EXTENSION: &str = "unknown";

/// Classify the subtitle format of the given location based on its filename extension.
///
/// It returns [SubtitleError::UnsupportedFormat] with the detected extension, or `unknown`,
/// when the extension is not a supported subtitle format.
pub fn classify(location: &str) -> Result<SubtitleType> {
    let extension = extension(location);
    trace!("Detected extension {:?} for {}", extension, location);

    extension
        .as_deref()
        .and_then(SubtitleType::from_extension)
        .ok_or_else(|| {
            SubtitleError::UnsupportedFormat(
                extension.unwrap_or_else(|| UNKNOWN_EXTENSION.to_string()),
            )
        })
}

/// Retrieve the display name of the given location.
/// This is the decoded filename of the location, or [UNKNOWN_SUBTITLE_NAME] when none is present.
pub fn display_name(location: &str) -> String {
    filename(location).unwrap_or_else(|| UNKNOWN_SUBTITLE_NAME.to_string())
}

/// Retrieve the lower-cased extension of the filename within the given location.
/// A leading dot, such as `.srt`, is not considered to be an extension.
pub fn extension(location: &str) -> Option<String> {
    let filename = filename(location)?;

    match filename.rfind('.') {
        Some(index) if index > 0 => Some(filename[index + 1..].to_lowercase()),
        _ => None,
    }
}

fn filename(location: &str) -> Option<String> {
    if location.is_empty() {
        return None;
    }

    let name = match Url::parse(location) {
        Ok(url) => {
            let segment = trailing_segment(url.path());
            decode(segment).unwrap_or_else(|| segment.to_string())
        }
        Err(_) => {
            let segment = trailing_segment(location);
            let segment = segment
                .split(|c: char| c == '?' || c == '#')
                .next()
                .unwrap_or(segment);
            decode(segment).unwrap_or_else(|| segment.to_string())
        }
    };

    Some(name).filter(|e| !e.is_empty())
}

fn trailing_segment(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

fn decode(value: &str) -> Option<String> {
    percent_decode_str(value)
        .decode_utf8()
        .map(|e| e.to_string())
        .ok()
}
