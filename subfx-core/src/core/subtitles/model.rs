use derive_more::Display;
use log::trace;

const VTT_EXTENSION: &str = "vtt";
const SRT_EXTENSION: &str = "srt";
const ASS_EXTENSION: &str = "ass";

const SUBTITLE_TYPES: [SubtitleType; 3] = [SubtitleType::Vtt, SubtitleType::Srt, SubtitleType::Ass];

/// The subtitle formats which can be normalized into WebVTT.
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SubtitleType {
    #[display("vtt")]
    Vtt,
    #[display("srt")]
    Srt,
    #[display("ass")]
    Ass,
}

impl SubtitleType {
    /// Retrieve the subtitle type for the given (lower-cased) extension.
    ///
    /// It returns [None] when the extension is not a supported subtitle format.
    pub fn from_extension(extension: &str) -> Option<SubtitleType> {
        SUBTITLE_TYPES
            .into_iter()
            .find(|e| e.extension() == extension)
    }

    /// The file extension of this subtitle type.
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleType::Vtt => VTT_EXTENSION,
            SubtitleType::Srt => SRT_EXTENSION,
            SubtitleType::Ass => ASS_EXTENSION,
        }
    }
}

/// A subtitle which has been fetched and converted into a canonical WebVTT document.
/// Instances are immutable once created and are shared through the subtitle cache.
#[derive(Debug, Display, Clone, PartialEq)]
#[display("name: {}, type: {}, location: {}", name, subtitle_type, location)]
pub struct NormalizedSubtitle {
    content: String,
    name: String,
    subtitle_type: SubtitleType,
    location: String,
}

impl NormalizedSubtitle {
    pub fn new(content: String, name: String, subtitle_type: SubtitleType, location: String) -> Self {
        trace!("Creating normalized subtitle {} for {}", name, location);
        Self {
            content,
            name,
            subtitle_type,
            location,
        }
    }

    /// The canonical WebVTT document.
    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// The display name of the subtitle, derived from the source location.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The original format of the subtitle.
    pub fn subtitle_type(&self) -> SubtitleType {
        self.subtitle_type
    }

    /// The source location the subtitle has been fetched from.
    pub fn location(&self) -> &str {
        self.location.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Some(SubtitleType::Vtt), SubtitleType::from_extension("vtt"));
        assert_eq!(Some(SubtitleType::Srt), SubtitleType::from_extension("srt"));
        assert_eq!(Some(SubtitleType::Ass), SubtitleType::from_extension("ass"));
        assert_eq!(None, SubtitleType::from_extension("ssa"));
        assert_eq!(None, SubtitleType::from_extension(""));
    }

    #[test]
    fn test_display() {
        let subtitle = NormalizedSubtitle::new(
            "WEBVTT\n".to_string(),
            "lorem.srt".to_string(),
            SubtitleType::Srt,
            "http://localhost/lorem.srt".to_string(),
        );

        assert_eq!(
            "name: lorem.srt, type: srt, location: http://localhost/lorem.srt",
            subtitle.to_string()
        );
    }
}
