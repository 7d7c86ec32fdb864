use log::trace;
use regex::Regex;

use crate::core::subtitles::cue::{CueOutcome, CueRejection, SubtitleCue};
use crate::core::subtitles::parsers::time::parse_srt_timestamp;
use crate::core::subtitles::parsers::{
    collect_cues, normalize_line_endings, Parser, VttParser, NEWLINE, TIME_INDICATOR,
};
use crate::core::subtitles::SubtitleType;

const TIME_PATTERN: &str = r"(\d+:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d+:\d{2}:\d{2}[,.]\d{3})";
const BLOCK_SEPARATOR_PATTERN: &str = r"\n(?:[ \t]*\n)+";
const TAG_PATTERN: &str = r"<[^>]*>";

/// The SubRip parser which converts numbered cue blocks into WebVTT cues.
/// Inline markup tags are stripped from the cue text.
#[derive(Debug)]
pub struct SrtParser {
    time_regex: Regex,
    block_regex: Regex,
    tag_regex: Regex,
}

impl SrtParser {
    /// Create a new srt parser instance.
    pub fn new() -> Self {
        Self {
            time_regex: Regex::new(TIME_PATTERN).expect("time pattern should be valid"),
            block_regex: Regex::new(BLOCK_SEPARATOR_PATTERN)
                .expect("block separator pattern should be valid"),
            tag_regex: Regex::new(TAG_PATTERN).expect("tag pattern should be valid"),
        }
    }

    /// Parse the given srt text into the valid cues it contains.
    pub fn parse(&self, value: &str) -> Vec<SubtitleCue> {
        let value = normalize_line_endings(value);
        let outcomes = self
            .block_regex
            .split(value.trim())
            .map(|block| self.parse_block(block))
            .enumerate();

        collect_cues(SubtitleType::Srt, outcomes)
    }

    fn parse_block(&self, block: &str) -> CueOutcome {
        let lines = block.split(NEWLINE).collect::<Vec<&str>>();
        if lines.len() < 2 {
            return Err(CueRejection::Malformed("block has too few lines".to_string()));
        }

        let time_line_index = if Self::is_index(lines[0]) && lines[1].contains(TIME_INDICATOR) {
            1
        } else if lines[0].contains(TIME_INDICATOR) {
            0
        } else {
            return Err(CueRejection::Malformed("block has no timing line".to_string()));
        };
        let time_line = lines[time_line_index];
        let captures = self.time_regex.captures(time_line).ok_or_else(|| {
            CueRejection::Malformed(format!("invalid timing line \"{}\"", time_line))
        })?;

        trace!("Parsing srt timing line {}", time_line);
        let start_time = parse_srt_timestamp(captures[1].replace('.', ",").as_str())?;
        let end_time = parse_srt_timestamp(captures[2].replace('.', ",").as_str())?;
        let text = lines[time_line_index + 1..].join(NEWLINE);
        let text = self.tag_regex.replace_all(text.as_str(), "");

        SubtitleCue::validate(start_time, end_time, text.as_ref())
    }

    fn is_index(line: &str) -> bool {
        let line = line.trim();
        !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
    }
}

impl Default for SrtParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for SrtParser {
    fn subtitle_type(&self) -> SubtitleType {
        SubtitleType::Srt
    }

    fn normalize(&self, value: &str) -> String {
        VttParser::convert(&self.parse(value))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::subtitles::parsers::time::format_vtt_timestamp;
    use crate::init_logger;
    use crate::testing::read_test_file_to_string;

    use super::*;

    fn describe(cues: &[SubtitleCue]) -> Vec<String> {
        cues.iter()
            .map(|e| {
                format!(
                    "{} --> {}|{}",
                    format_vtt_timestamp(e.start_time()),
                    format_vtt_timestamp(e.end_time()),
                    e.text()
                )
            })
            .collect()
    }

    #[test]
    fn test_normalize_single_cue() {
        init_logger!();
        let parser = SrtParser::new();

        let result = parser.normalize("1\n00:00:01,000 --> 00:00:03,500\nHello <b>world</b>\n\n");

        assert_eq!("WEBVTT\n\n00:00:01.000 --> 00:00:03.500\nHello world\n", result);
    }

    #[test]
    fn test_parse_multiple_cues() {
        init_logger!();
        let parser = SrtParser::new();
        let value = "1526
02:12:21,051 --> 02:12:22,951
This is the path
you've chosen, is it?

1527
02:12:26,757 --> 02:12:28,952
The <i>Black Pearl</i> is yours.";

        let result = parser.parse(value);

        assert_eq!(
            vec![
                "02:12:21.051 --> 02:12:22.951|This is the path\nyou've chosen, is it?".to_string(),
                "02:12:26.757 --> 02:12:28.952|The Black Pearl is yours.".to_string(),
            ],
            describe(&result)
        );
    }

    #[test]
    fn test_parse_without_index_and_dot_separator() {
        init_logger!();
        let parser = SrtParser::new();

        let result = parser.parse("00:00:30.296 --> 00:00:34.790\r\nDrink up, me hearties\r\n");

        assert_eq!(
            vec!["00:00:30.296 --> 00:00:34.790|Drink up, me hearties".to_string()],
            describe(&result)
        );
    }

    #[test]
    fn test_parse_skips_malformed_blocks() {
        init_logger!();
        let parser = SrtParser::new();
        let value = "1
00:00:01,000 --> 00:00:02,000
lorem

lorem ipsum
dolor

3
00:00:0x,000 --> 00:00:04,000
ipsum

4
00:00:05,000 --> 00:00:06,000
dolor";

        let result = parser.parse(value);

        assert_eq!(
            vec![
                SubtitleCue::validate(1.0, 2.0, "lorem").unwrap(),
                SubtitleCue::validate(5.0, 6.0, "dolor").unwrap(),
            ],
            result
        );
    }

    #[test]
    fn test_parse_drops_invalid_cues() {
        init_logger!();
        let parser = SrtParser::new();
        let value = "1
00:00:03,000 --> 00:00:03,000
same time

2
00:00:05,000 --> 00:00:04,000
reversed

3
00:00:06,000 --> 00:00:07,000
<i></i>

4
00:00:08,000 --> 00:00:09,000
valid";

        let result = parser.parse(value);

        assert_eq!(vec![SubtitleCue::validate(8.0, 9.0, "valid").unwrap()], result);
    }

    #[test]
    fn test_normalize_only_invalid_cue() {
        init_logger!();
        let parser = SrtParser::new();

        let result = parser.normalize("1\n00:00:03,500 --> 00:00:01,000\nlorem\n");

        assert_eq!("WEBVTT\n", result);
        assert!(!result.contains(TIME_INDICATOR));
    }

    #[test]
    fn test_normalize_drops_out_of_range_hours() {
        init_logger!();
        let parser = SrtParser::new();
        let value = "1\n99999999999999999:00:00,000 --> 99999999999999999:00:01,000\nlorem\n\n2\n00:00:01,000 --> 00:00:02,000\nipsum\n";

        let result = parser.normalize(value);

        assert_eq!("WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nipsum\n", result);
    }

    #[test]
    fn test_normalize_file() {
        init_logger!();
        let parser = SrtParser::new();
        let value = read_test_file_to_string("example.srt");
        let expected_result = read_test_file_to_string("example-srt.vtt");

        let result = parser.normalize(value.as_str());

        assert_eq!(expected_result, result);
    }
}
