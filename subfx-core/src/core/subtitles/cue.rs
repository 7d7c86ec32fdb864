use derive_more::Display;
use thiserror::Error;

use crate::core::subtitles::SubtitleParseError;

/// The outcome of a single candidate cue while normalizing a subtitle document.
/// A rejected candidate is dropped without failing the remainder of the document.
pub type CueOutcome = std::result::Result<SubtitleCue, CueRejection>;

/// The reason why a candidate cue has been dropped from the output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CueRejection {
    /// The candidate doesn't match the expected structure of the format.
    #[error("cue is malformed, {0}")]
    Malformed(String),
    /// One of the timestamps couldn't be parsed.
    #[error("cue has an invalid timestamp, {0}")]
    InvalidTime(#[from] SubtitleParseError),
    /// The end of the cue is not after its start.
    #[error("cue ends at {end} which is not after its start {start}")]
    NotIncreasing { start: f64, end: f64 },
    /// The cue has no text left after cleanup.
    #[error("cue has no text")]
    EmptyText,
}

/// A single timed caption entry.
#[derive(Debug, Display, Clone, PartialEq)]
#[display("start_time: {}, end_time: {}, text: {:?}", start_time, end_time, text)]
pub struct SubtitleCue {
    start_time: f64,
    end_time: f64,
    text: String,
}

impl SubtitleCue {
    /// Validate the candidate cue values.
    ///
    /// The `text` is trimmed and both timestamps need to be finite with the end after the start.
    /// It returns the cue on success, else the [CueRejection] describing why it's dropped.
    pub fn validate(start_time: f64, end_time: f64, text: &str) -> CueOutcome {
        if !start_time.is_finite() || !end_time.is_finite() || end_time <= start_time {
            return Err(CueRejection::NotIncreasing {
                start: start_time,
                end: end_time,
            });
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(CueRejection::EmptyText);
        }

        Ok(Self {
            start_time,
            end_time,
            text: text.to_string(),
        })
    }

    /// The start of the cue in seconds.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// The end of the cue in seconds.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// The text of the cue, which might span multiple lines.
    pub fn text(&self) -> &str {
        self.text.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let result = SubtitleCue::validate(1.0, 3.5, "  Hello world\n");

        let cue = result.expect("expected the cue to be valid");
        assert_eq!(1.0, cue.start_time());
        assert_eq!(3.5, cue.end_time());
        assert_eq!("Hello world", cue.text());
    }

    #[test]
    fn test_validate_end_before_start() {
        assert_eq!(
            Err(CueRejection::NotIncreasing { start: 3.0, end: 3.0 }),
            SubtitleCue::validate(3.0, 3.0, "lorem")
        );
        assert_eq!(
            Err(CueRejection::NotIncreasing { start: 3.0, end: 1.0 }),
            SubtitleCue::validate(3.0, 1.0, "lorem")
        );
    }

    #[test]
    fn test_validate_non_finite() {
        let result = SubtitleCue::validate(f64::NAN, 1.0, "lorem");

        assert!(matches!(result, Err(CueRejection::NotIncreasing { .. })));
    }

    #[test]
    fn test_validate_empty_text() {
        assert_eq!(Err(CueRejection::EmptyText), SubtitleCue::validate(0.0, 1.0, " \n "));
    }
}
