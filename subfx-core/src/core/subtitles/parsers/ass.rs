use log::trace;
use regex::Regex;

use crate::core::subtitles::cue::{CueOutcome, CueRejection, SubtitleCue};
use crate::core::subtitles::parsers::time::parse_ass_timestamp;
use crate::core::subtitles::parsers::{
    collect_cues, normalize_line_endings, Parser, VttParser, NEWLINE,
};
use crate::core::subtitles::SubtitleType;

const EVENTS_SECTION: &str = "[events]";
const SECTION_PREFIX: char = '[';
const FORMAT_PREFIX: &str = "format:";
const DIALOGUE_PREFIX: &str = "dialogue:";
const FIELD_SEPARATOR: char = ',';
const START_FIELD: &str = "start";
const END_FIELD: &str = "end";
const TEXT_FIELD: &str = "text";
const OVERRIDE_PATTERN: &str = r"\{[^}]*\}";
const LINE_BREAK_PATTERN: &str = r"\\[Nn]";

/// The Advanced SubStation Alpha parser which converts the dialogue events into WebVTT cues.
///
/// The column order of the dialogue lines is taken from the `Format:` line of the `[Events]` section,
/// where the `Text` column consumes the remainder of the line as it may contain the field separator.
#[derive(Debug)]
pub struct AssParser {
    override_regex: Regex,
    line_break_regex: Regex,
}

impl AssParser {
    /// Create a new ass parser instance.
    pub fn new() -> Self {
        Self {
            override_regex: Regex::new(OVERRIDE_PATTERN).expect("override pattern should be valid"),
            line_break_regex: Regex::new(LINE_BREAK_PATTERN)
                .expect("line break pattern should be valid"),
        }
    }

    /// Parse the given ass text into the valid cues of its `[Events]` section.
    pub fn parse(&self, value: &str) -> Vec<SubtitleCue> {
        let value = normalize_line_endings(value);
        let mut in_events_section = false;
        let mut format: Option<Vec<String>> = None;
        let mut outcomes = vec![];

        for (line_index, line) in value.split(NEWLINE).enumerate() {
            let line = line.trim();

            if line.starts_with(SECTION_PREFIX) {
                in_events_section = line.eq_ignore_ascii_case(EVENTS_SECTION);
                format = None;
                trace!("Entering ass section {}", line);
                continue;
            }
            if !in_events_section || line.is_empty() {
                continue;
            }

            if let Some(fields) = strip_prefix_ignore_case(line, FORMAT_PREFIX) {
                let fields = fields
                    .split(FIELD_SEPARATOR)
                    .map(|e| e.trim().to_lowercase())
                    .collect::<Vec<String>>();
                trace!("Using ass event format {:?}", fields);
                format = Some(fields);
            } else if let Some(values) = strip_prefix_ignore_case(line, DIALOGUE_PREFIX) {
                match format.as_ref() {
                    Some(format) => outcomes.push((line_index, self.parse_dialogue(format, values))),
                    None => trace!("Ignoring ass dialogue on line {} without format", line_index),
                }
            }
        }

        collect_cues(SubtitleType::Ass, outcomes)
    }

    fn parse_dialogue(&self, format: &[String], values: &str) -> CueOutcome {
        let values = values.trim().split(FIELD_SEPARATOR).collect::<Vec<&str>>();
        let mut start_time = None;
        let mut end_time = None;
        let mut text = None;

        for (index, field) in format.iter().enumerate().take(values.len()) {
            match field.as_str() {
                TEXT_FIELD => text = Some(values[index..].join(",")),
                START_FIELD => start_time = Some(values[index]),
                END_FIELD => end_time = Some(values[index]),
                _ => {}
            }
        }

        let (start_time, end_time, text) = match (start_time, end_time, text) {
            (Some(start), Some(end), Some(text)) => (start, end, text),
            _ => {
                return Err(CueRejection::Malformed(
                    "dialogue is missing the start, end or text field".to_string(),
                ))
            }
        };
        let text = self.override_regex.replace_all(text.as_str(), "");
        let text = self.line_break_regex.replace_all(text.as_ref(), NEWLINE);
        let start_time = parse_ass_timestamp(start_time)?;
        let end_time = parse_ass_timestamp(end_time)?;

        SubtitleCue::validate(start_time, end_time, text.as_ref())
    }
}

impl Default for AssParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for AssParser {
    fn subtitle_type(&self) -> SubtitleType {
        SubtitleType::Ass
    }

    fn normalize(&self, value: &str) -> String {
        VttParser::convert(&self.parse(value))
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let len = prefix.len();
    if value.len() >= len
        && value.is_char_boundary(len)
        && value[..len].eq_ignore_ascii_case(prefix)
    {
        Some(&value[len..])
    } else {
        None
    }
}
