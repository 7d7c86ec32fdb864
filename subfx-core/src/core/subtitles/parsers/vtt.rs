use log::{debug, trace};

use crate::core::subtitles::cue::SubtitleCue;
use crate::core::subtitles::parsers::time::format_vtt_timestamp;
use crate::core::subtitles::parsers::{Parser, NEWLINE, TIME_INDICATOR};
use crate::core::subtitles::SubtitleType;

/// The mandatory header token of a WebVTT document.
pub const HEADER: &str = "WEBVTT";
const BYTE_ORDER_MARK: char = '\u{feff}';

/// The WebVTT parser which repairs the header framing of documents which are already in the target format.
/// The cues of the document are passed through as-is and are never validated.
#[derive(Debug, Default)]
pub struct VttParser;

impl VttParser {
    pub fn new() -> Self {
        Self
    }

    /// Convert the given cues into a WebVTT document.
    /// Each cue is written as `<start> --> <end>` followed by its text, separated by a blank line.
    pub fn convert(cues: &[SubtitleCue]) -> String {
        let mut output = format!("{}{}", HEADER, NEWLINE);

        for cue in cues {
            output.push_str(NEWLINE);
            output.push_str(
                format!(
                    "{} {} {}",
                    format_vtt_timestamp(cue.start_time()),
                    TIME_INDICATOR,
                    format_vtt_timestamp(cue.end_time())
                )
                .as_str(),
            );
            output.push_str(NEWLINE);
            output.push_str(cue.text());
            output.push_str(NEWLINE);
        }

        output
    }

    /// Insert the blank line after a bare header line when it's missing.
    fn repair_header(value: &str) -> String {
        let remainder = &value[HEADER.len()..];
        let line_break = if remainder.starts_with("\r\n") {
            "\r\n"
        } else if remainder.starts_with('\n') {
            NEWLINE
        } else {
            trace!("WebVTT header is not a bare header line, leaving it untouched");
            return value.to_string();
        };
        let body = &remainder[line_break.len()..];

        if body.starts_with('\n') || body.starts_with("\r\n") {
            value.to_string()
        } else {
            debug!("Inserting missing blank line after the WebVTT header");
            format!("{}{}{}{}", HEADER, line_break, line_break, body)
        }
    }
}

impl Parser for VttParser {
    fn subtitle_type(&self) -> SubtitleType {
        SubtitleType::Vtt
    }

    fn normalize(&self, value: &str) -> String {
        let value = value.strip_prefix(BYTE_ORDER_MARK).unwrap_or(value);

        if value.starts_with(HEADER) {
            Self::repair_header(value)
        } else {
            debug!("WebVTT header is missing, prepending it");
            format!("{}{}{}{}", HEADER, NEWLINE, NEWLINE, value)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::init_logger;
    use crate::testing::read_test_file_to_string;

    use super::*;

    #[test]
    fn test_normalize_missing_header() {
        init_logger!();
        let parser = VttParser::new();

        let result = parser.normalize("00:00:00.000 --> 00:00:01.000\nHi\n");

        assert_eq!("WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nHi\n", result);
    }

    #[test]
    fn test_normalize_byte_order_mark() {
        init_logger!();
        let parser = VttParser::new();

        let result = parser.normalize("\u{feff}WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nHi\n");

        assert_eq!("WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nHi\n", result);
    }

    #[test]
    fn test_normalize_keeps_surrounding_whitespace() {
        init_logger!();
        let parser = VttParser::new();

        let result = parser.normalize("\u{feff}WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nHi\n\n  ");

        assert_eq!("WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nHi\n\n  ", result);
    }

    #[test]
    fn test_normalize_missing_blank_line() {
        init_logger!();
        let parser = VttParser::new();

        let result = parser.normalize("WEBVTT\n00:00:00.000 --> 00:00:01.000\nHi\n");

        assert_eq!("WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nHi\n", result);
    }

    #[test]
    fn test_normalize_missing_blank_line_crlf() {
        init_logger!();
        let parser = VttParser::new();

        let result = parser.normalize("WEBVTT\r\n00:00:00.000 --> 00:00:01.000\r\nHi\r\n");

        assert_eq!("WEBVTT\r\n\r\n00:00:00.000 --> 00:00:01.000\r\nHi\r\n", result);
    }

    #[test]
    fn test_normalize_conformant_document() {
        init_logger!();
        let parser = VttParser::new();
        let value = read_test_file_to_string("example.vtt");

        let result = parser.normalize(value.as_str());

        assert_eq!(value, result);
    }

    #[test]
    fn test_normalize_does_not_validate_cues() {
        init_logger!();
        let parser = VttParser::new();
        let value = "WEBVTT\n\n00:00:05.000 --> 00:00:01.000\n\n";

        let result = parser.normalize(value);

        assert_eq!(value, result);
    }

    #[test]
    fn test_convert() {
        let cues = vec![
            SubtitleCue::validate(30.0, 48.1, "lorem").unwrap(),
            SubtitleCue::validate(50.0, 51.0, "ipsum\ndolor").unwrap(),
        ];
        let expected_result = "WEBVTT

00:00:30.000 --> 00:00:48.100
lorem

00:00:50.000 --> 00:00:51.000
ipsum
dolor
";

        let result = VttParser::convert(&cues);

        assert_eq!(expected_result, result);
    }

    #[test]
    fn test_convert_no_cues() {
        assert_eq!("WEBVTT\n", VttParser::convert(&[]));
    }
}
