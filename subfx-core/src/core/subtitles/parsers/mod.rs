use std::fmt::Debug;

use log::debug;

pub use crate::core::subtitles::parsers::ass::AssParser;
pub use crate::core::subtitles::parsers::srt::SrtParser;
pub use crate::core::subtitles::parsers::vtt::VttParser;
use crate::core::subtitles::cue::{CueOutcome, SubtitleCue};
use crate::core::subtitles::SubtitleType;

pub mod time;

mod ass;
mod srt;
mod vtt;

const NEWLINE: &str = "\n";
/// The separator between the start and end timestamp of a cue timing line.
pub const TIME_INDICATOR: &str = "-->";

/// A subtitle parser which is able to normalize the raw text of a subtitle format into a WebVTT document.
pub trait Parser: Debug + Send + Sync {
    /// The subtitle format handled by this parser.
    fn subtitle_type(&self) -> SubtitleType;

    /// Normalize the given raw subtitle text into a WebVTT document.
    /// Invalid cues within the given text are dropped by the parser and logged.
    fn normalize(&self, value: &str) -> String;
}

/// Retrieve the default parsers for all supported subtitle formats.
pub fn default_parsers() -> Vec<Box<dyn Parser>> {
    vec![
        Box::new(VttParser::new()),
        Box::new(SrtParser::new()),
        Box::new(AssParser::new()),
    ]
}

/// Collect the accepted cues of the given candidates, logging the rejected ones.
/// Each candidate is identified by its position within the source document.
fn collect_cues<I>(subtitle_type: SubtitleType, outcomes: I) -> Vec<SubtitleCue>
where
    I: IntoIterator<Item = (usize, CueOutcome)>,
{
    outcomes
        .into_iter()
        .filter_map(|(position, outcome)| match outcome {
            Ok(cue) => Some(cue),
            Err(e) => {
                debug!("Dropping {} cue at {}, {}", subtitle_type, position, e);
                None
            }
        })
        .collect()
}

/// Normalize the line endings of the given text to `\n`.
fn normalize_line_endings(value: &str) -> String {
    value.replace("\r\n", NEWLINE).replace('\r', NEWLINE)
}

#[cfg(test)]
mod tests {
    use crate::core::subtitles::cue::CueRejection;

    use super::*;

    #[test]
    fn test_default_parsers() {
        let result = default_parsers()
            .iter()
            .map(|e| e.subtitle_type())
            .collect::<Vec<_>>();

        assert_eq!(vec![SubtitleType::Vtt, SubtitleType::Srt, SubtitleType::Ass], result);
    }

    #[test]
    fn test_collect_cues() {
        let cue = SubtitleCue::validate(1.0, 2.0, "lorem").unwrap();
        let outcomes = vec![
            (0, Ok(cue.clone())),
            (1, Err(CueRejection::EmptyText)),
        ];

        let result = collect_cues(SubtitleType::Srt, outcomes);

        assert_eq!(vec![cue], result);
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!("a\nb\nc\n", normalize_line_endings("a\r\nb\rc\n"));
    }
}
