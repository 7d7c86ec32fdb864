use thiserror::Error;

/// The specialized subtitle result.
pub type Result<T> = std::result::Result<T, SubtitleError>;

/// Represents errors that fail a subtitle normalization request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubtitleError {
    /// The extension of the subtitle location is not one of the supported formats.
    #[error("Unsupported subtitle file type: {0}")]
    UnsupportedFormat(String),
    /// The raw subtitle text couldn't be fetched.
    #[error("{reason} fetching subtitle \"{name}\"")]
    FetchFailed { name: String, reason: FetchError },
    /// The normalized output didn't contain any usable cue.
    #[error("Failed to parse subtitle \"{0}\": Empty or invalid VTT content.")]
    ParseFailed(String),
}

/// Represents a failure of the network collaborator while fetching the raw subtitle text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The remote responded with a non-success status code.
    #[error("HTTP error {0}")]
    Status(u16),
    /// The request failed at the transport level (DNS, timeout, refused connection, ...).
    #[error("Transport error ({0})")]
    Transport(String),
}

/// Represents errors of the subtitle format codecs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubtitleParseError {
    #[error("File contains invalid time, {0}")]
    InvalidTime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitle_error_display() {
        assert_eq!(
            "Unsupported subtitle file type: txt".to_string(),
            SubtitleError::UnsupportedFormat("txt".to_string()).to_string()
        );
        assert_eq!(
            "HTTP error 404 fetching subtitle \"movie.srt\"".to_string(),
            SubtitleError::FetchFailed {
                name: "movie.srt".to_string(),
                reason: FetchError::Status(404),
            }
            .to_string()
        );
        assert_eq!(
            "Failed to parse subtitle \"movie.ass\": Empty or invalid VTT content.".to_string(),
            SubtitleError::ParseFailed("movie.ass".to_string()).to_string()
        );
    }

    #[test]
    fn test_subtitle_parse_error_display() {
        assert_eq!(
            "File contains invalid time, 13".to_string(),
            SubtitleParseError::InvalidTime("13".to_string()).to_string()
        );
    }
}
