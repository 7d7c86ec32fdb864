use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use derive_more::Display;
use log::{debug, trace, warn};
use serde::Deserialize;

use crate::core::config::{ConfigError, Result};

const DEFAULT_USER_AGENT: fn() -> String = || format!("subfx/{}", crate::VERSION);
const DEFAULT_CONFIG_FILENAME: &str = "application";
const CONFIG_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// In-between wrapper for serde so the properties live under the `subfx` root key.
#[derive(Debug, Default, Deserialize)]
struct PropertiesWrapper {
    #[serde(default)]
    pub subfx: SubfxProperties,
}

/// The static properties of the application which don't change during its lifetime.
#[derive(Debug, Display, Clone, Default, Deserialize, PartialEq)]
#[display("subtitle: {:?}, loggers: {:?}", subtitle, loggers)]
pub struct SubfxProperties {
    #[serde(default)]
    subtitle: SubtitleProperties,
    /// The log level per log target, e.g. `subfx_core: debug`.
    #[serde(default)]
    loggers: HashMap<String, String>,
}

impl SubfxProperties {
    /// Look for the `application.yml` or `application.yaml` file within the working directory.
    /// The defaults are used when no config file could be found or read.
    pub fn new_auto() -> Self {
        match Self::find_existing_file(DEFAULT_CONFIG_FILENAME) {
            Some(path) => Self::from_path(&path).unwrap_or_else(|e| {
                warn!("Failed to load config file {:?}, {}", path, e);
                Self::default()
            }),
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load the properties from the given config file.
    ///
    /// It returns an error when the file couldn't be read or contains invalid data.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config file {:?}", path);
        let data = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_string_lossy().to_string(), e.to_string()))?;

        Self::parse(data.as_str())
    }

    /// The subtitle related properties.
    pub fn subtitle(&self) -> &SubtitleProperties {
        &self.subtitle
    }

    /// The configured log levels per target.
    pub fn loggers(&self) -> &HashMap<String, String> {
        &self.loggers
    }

    fn parse(value: &str) -> Result<Self> {
        trace!("Parsing config data {}", value);
        if value.trim().is_empty() {
            return Ok(Self::default());
        }

        let wrapper: PropertiesWrapper =
            serde_yaml::from_str(value).map_err(|e| ConfigError::Parse(e.to_string()))?;
        debug!("Parsed config data {:?}", &wrapper);
        Ok(wrapper.subfx)
    }

    fn find_existing_file(filename: &str) -> Option<PathBuf> {
        let directory = env::current_dir().ok()?;

        CONFIG_EXTENSIONS
            .iter()
            .map(|extension| directory.join(format!("{}.{}", filename, extension)))
            .find(|path| {
                let exists = path.is_file();
                if !exists {
                    trace!("Config file location {:?} doesn't exist", path);
                }
                exists
            })
    }
}

/// The properties of the subtitle fetcher.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SubtitleProperties {
    #[serde(alias = "user-agent")]
    #[serde(alias = "userAgent")]
    #[serde(default = "DEFAULT_USER_AGENT")]
    user_agent: String,
    /// Accept invalid TLS certificates of subtitle hosts.
    #[serde(default)]
    insecure: bool,
}

impl SubtitleProperties {
    /// Create new subtitle properties.
    ///
    /// * `user_agent` - The user agent to communicate to the subtitle host.
    /// * `insecure`   - Accept invalid TLS certificates.
    pub fn new(user_agent: String, insecure: bool) -> Self {
        Self {
            user_agent,
            insecure,
        }
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_str()
    }

    pub fn insecure(&self) -> bool {
        self.insecure
    }
}

impl Default for SubtitleProperties {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT(),
            insecure: false,
        }
    }
}
