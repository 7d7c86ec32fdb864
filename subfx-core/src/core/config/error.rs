use thiserror::Error;

/// The specialized config result.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Represents errors that occur while loading the application properties.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The config file couldn't be read.
    #[error("failed to read config file {0}, {1}")]
    Io(String, String),
    /// The config data is not valid yaml for the properties.
    #[error("config data is invalid, {0}")]
    Parse(String),
}
