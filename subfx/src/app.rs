use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use derive_more::Display;
use log::{debug, error, info};
use thiserror::Error;

use subfx_core::core::config::{ConfigError, SubfxProperties, SubtitleProperties};
use subfx_core::core::subtitles::{
    DefaultSubtitleManager, FetchError, HttpSubtitleFetcher, NormalizedSubtitle, SubtitleManager,
};
use subfx_logging::{parse_level, FxLogger};

/// The errors which prevent the application from starting or writing its output.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load the config, {0}")]
    Config(#[from] ConfigError),
    #[error("failed to initialize the logger, {0}")]
    Logging(#[from] subfx_logging::Error),
    #[error("failed to create the subtitle fetcher, {0}")]
    Fetcher(#[from] FetchError),
    #[error("failed to write {0}, {1}")]
    Io(String, std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Display, Parser)]
#[command(name = "subfx", version, about = "Fetch remote subtitles and normalize them into WebVTT")]
#[display("locations: {:?}, output_dir: {:?}", locations, output_dir)]
pub struct SubfxArgs {
    /// The subtitle locations to fetch, the format is detected from the file extension.
    #[arg(required = true)]
    pub locations: Vec<String>,
    /// The yaml config file to load, `application.yml` of the working directory is used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// The root log level.
    #[arg(long, default_value = "info")]
    pub log_level: String,
    /// Additionally write the log output to the given file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Load the given `log4rs` yaml config, this replaces all other logging options.
    #[arg(long)]
    pub log_config: Option<PathBuf>,
    /// Disable the default `log4rs` logger.
    #[arg(long, default_value_t = false)]
    pub disable_logger: bool,
    /// Accept invalid TLS certificates of the subtitle servers.
    #[arg(long, default_value_t = false)]
    pub insecure: bool,
    /// The user agent to send with each subtitle request.
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Write each subtitle as `<name>.vtt` into the given directory instead of stdout.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

/// The outcome of a [Subfx::run].
#[derive(Debug, Display, Default, Clone, PartialEq)]
#[display("{} subtitle(s) normalized, {} skipped, {} failed", normalized, skipped, failed)]
pub struct Summary {
    pub normalized: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// The command line application which owns the subtitle manager for its lifetime.
#[derive(Debug)]
pub struct Subfx {
    args: SubfxArgs,
    manager: Box<dyn SubtitleManager>,
    _logger: Option<FxLogger>,
}

impl Subfx {
    /// Create a new application instance from the given arguments.
    pub fn new(args: SubfxArgs) -> Result<Self> {
        let properties = match args.config.as_ref() {
            Some(path) => SubfxProperties::from_path(path)?,
            None => SubfxProperties::new_auto(),
        };
        let logger = if args.disable_logger {
            None
        } else {
            Some(Self::initialize_logger(&args, &properties)?)
        };
        debug!("Creating subfx with {}", args);

        let subtitle_properties = Self::subtitle_properties(&args, properties.subtitle());
        let fetcher = HttpSubtitleFetcher::builder()
            .properties(&subtitle_properties)
            .build()?;
        let manager = DefaultSubtitleManager::builder()
            .fetcher(Box::new(fetcher))
            .build();

        Ok(Self {
            args,
            manager: Box::new(manager),
            _logger: logger,
        })
    }

    /// Normalize all locations of the application arguments.
    /// The documents are written into the output directory when set, else into the given writer.
    ///
    /// A location which fails to load is logged and counted in the returned [Summary],
    /// only output failures abort the run.
    pub async fn run<W: Write>(&self, writer: &mut W) -> Result<Summary> {
        let mut summary = Summary::default();

        for location in self.args.locations.iter() {
            match self.manager.fetch_and_cache_subtitle(location).await {
                Ok(Some(subtitle)) => {
                    self.write(&subtitle, writer).await?;
                    summary.normalized += 1;
                }
                Ok(None) => {
                    debug!("Skipping empty subtitle location");
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("{}", e);
                    summary.failed += 1;
                }
            }
        }

        info!("{}", summary);
        Ok(summary)
    }

    async fn write<W: Write>(&self, subtitle: &NormalizedSubtitle, writer: &mut W) -> Result<()> {
        match self.args.output_dir.as_ref() {
            Some(directory) => {
                let path = directory.join(output_filename(subtitle));
                tokio::fs::create_dir_all(directory)
                    .await
                    .map_err(|e| AppError::Io(directory.to_string_lossy().to_string(), e))?;
                tokio::fs::write(&path, subtitle.content())
                    .await
                    .map_err(|e| AppError::Io(path.to_string_lossy().to_string(), e))?;
                info!("Subtitle {} has been written to {:?}", subtitle.name(), path);
            }
            None => {
                writer
                    .write_all(subtitle.content().as_bytes())
                    .and_then(|_| writer.flush())
                    .map_err(|e| AppError::Io("stdout".to_string(), e))?;
            }
        }

        Ok(())
    }

    fn initialize_logger(args: &SubfxArgs, properties: &SubfxProperties) -> Result<FxLogger> {
        let mut builder = FxLogger::builder();
        builder
            .root_level(parse_level(args.log_level.as_str())?)
            .loggers(properties.loggers())?;
        if let Some(path) = args.log_file.as_ref() {
            builder.log_path(path);
        }
        if let Some(path) = args.log_config.as_ref() {
            builder.config_path(path);
        }

        Ok(builder.build()?)
    }

    /// Apply the command line overrides on top of the configured subtitle properties.
    fn subtitle_properties(args: &SubfxArgs, properties: &SubtitleProperties) -> SubtitleProperties {
        let user_agent = args
            .user_agent
            .clone()
            .unwrap_or_else(|| properties.user_agent().to_string());

        SubtitleProperties::new(user_agent, args.insecure || properties.insecure())
    }
}

/// Returns the filename of the normalized document, e.g. `lorem.srt` becomes `lorem.vtt`.
fn output_filename(subtitle: &NormalizedSubtitle) -> String {
    let stem = Path::new(subtitle.name())
        .file_stem()
        .map(|e| e.to_string_lossy().to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| subtitle.name().to_string());
    let stem = stem.replace(['/', '\\'], "_");

    format!("{}.vtt", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    use httpmock::Method::GET;
    use httpmock::MockServer;
    use subfx_core::core::subtitles::SubtitleType;
    use subfx_core::init_logger;
    use subfx_core::testing::read_test_file_to_string;
    use tempfile::tempdir;

    /// The default set of [SubfxArgs] for testing purposes.
    fn default_args(locations: Vec<String>) -> SubfxArgs {
        SubfxArgs {
            locations,
            config: None,
            log_level: "info".to_string(),
            log_file: None,
            log_config: None,
            disable_logger: true,
            insecure: false,
            user_agent: Some("subfx-test".to_string()),
            output_dir: None,
        }
    }

    #[test]
    fn test_args_parse() {
        let args = SubfxArgs::try_parse_from([
            "subfx",
            "--insecure",
            "--output-dir",
            "out",
            "--log-level",
            "debug",
            "--log-config",
            "log4rs.yml",
            "http://localhost/lorem.srt",
            "http://localhost/ipsum.ass",
        ])
        .expect("expected the arguments to be valid");

        assert_eq!(
            vec![
                "http://localhost/lorem.srt".to_string(),
                "http://localhost/ipsum.ass".to_string()
            ],
            args.locations
        );
        assert!(args.insecure);
        assert_eq!(Some(PathBuf::from("out")), args.output_dir);
        assert_eq!("debug", args.log_level);
        assert_eq!(Some(PathBuf::from("log4rs.yml")), args.log_config);
        assert!(!args.disable_logger);
    }

    #[test]
    fn test_args_parse_missing_location() {
        let result = SubfxArgs::try_parse_from(["subfx", "--insecure"]);

        assert!(result.is_err(), "expected the location to be required");
    }

    #[tokio::test]
    async fn test_run_stdout() {
        init_logger!();
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/subtitles/lorem.srt")
                    .header("user-agent", "subfx-test");
                then.status(200)
                    .body("1\n00:00:01,000 --> 00:00:03,500\nHello <i>world</i>\n");
            })
            .await;
        let location = server.url("/subtitles/lorem.srt");
        let subfx = Subfx::new(default_args(vec![location.clone(), location])).unwrap();
        let mut output = Vec::new();

        let result = subfx.run(&mut output).await.unwrap();

        assert_eq!(
            Summary {
                normalized: 2,
                skipped: 0,
                failed: 0
            },
            result
        );
        mock.assert_hits_async(1).await;
        assert_eq!(
            "WEBVTT\n\n00:00:01.000 --> 00:00:03.500\nHello world\n".repeat(2),
            String::from_utf8(output).unwrap()
        );
    }

    #[tokio::test]
    async fn test_run_output_dir() {
        init_logger!();
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("out");
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/example.ass");
                then.status(200).body(read_test_file_to_string("example.ass"));
            })
            .await;
        let mut args = default_args(vec![server.url("/example.ass")]);
        args.output_dir = Some(output_dir.clone());
        let subfx = Subfx::new(args).unwrap();
        let mut output = Vec::new();

        let result = subfx.run(&mut output).await.unwrap();

        assert_eq!(1, result.normalized);
        assert!(output.is_empty(), "expected nothing to be written to stdout");
        let content = std::fs::read_to_string(output_dir.join("example.vtt"))
            .expect("expected the subtitle file to have been written");
        assert_eq!(read_test_file_to_string("example-ass.vtt"), content);
    }

    #[tokio::test]
    async fn test_run_failures() {
        init_logger!();
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.vtt");
                then.status(404);
            })
            .await;
        let txt_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/lorem.txt");
                then.status(200).body("lorem");
            })
            .await;
        let subfx = Subfx::new(default_args(vec![
            server.url("/missing.vtt"),
            server.url("/lorem.txt"),
            String::new(),
        ]))
        .unwrap();
        let mut output = Vec::new();

        let result = subfx.run(&mut output).await.unwrap();

        assert_eq!(
            Summary {
                normalized: 0,
                skipped: 1,
                failed: 2
            },
            result
        );
        txt_mock.assert_hits_async(0).await;
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_run_empty_location() {
        init_logger!();
        let subfx = Subfx::new(default_args(vec![String::new()])).unwrap();
        let mut output = Vec::new();

        let result = subfx.run(&mut output).await.unwrap();

        assert_eq!(
            Summary {
                normalized: 0,
                skipped: 1,
                failed: 0
            },
            result
        );
        assert!(output.is_empty());
    }

    #[test]
    fn test_new_missing_log_config() {
        let temp_dir = tempdir().unwrap();
        let mut args = default_args(vec!["http://localhost/lorem.srt".to_string()]);
        args.disable_logger = false;
        args.log_config = Some(temp_dir.path().join("log4rs.yml"));

        let result = Subfx::new(args);

        assert!(
            matches!(
                result,
                Err(AppError::Logging(subfx_logging::Error::Io(ref e))) if e.kind() == std::io::ErrorKind::NotFound
            ),
            "expected the log config to have been loaded, got {:?}",
            result
        );
    }

    #[test]
    fn test_new_invalid_config_path() {
        let temp_dir = tempdir().unwrap();
        let mut args = default_args(vec!["http://localhost/lorem.srt".to_string()]);
        args.config = Some(temp_dir.path().join("unknown.yml"));

        let result = Subfx::new(args);

        assert!(
            matches!(result, Err(AppError::Config(ConfigError::Io(_, _)))),
            "expected a config io error, got {:?}",
            result
        );
    }

    #[test]
    fn test_subtitle_properties() {
        let mut args = default_args(vec![]);
        args.insecure = true;
        let properties = SubtitleProperties::new("lorem/1.0".to_string(), false);

        let result = Subfx::subtitle_properties(&args, &properties);
        assert_eq!(SubtitleProperties::new("subfx-test".to_string(), true), result);

        args.user_agent = None;
        args.insecure = false;
        let result = Subfx::subtitle_properties(&args, &properties);
        assert_eq!(properties, result);
    }

    #[test]
    fn test_output_filename() {
        let subtitle = NormalizedSubtitle::new(
            String::new(),
            "Some Show S01E01.srt".to_string(),
            SubtitleType::Srt,
            "http://localhost/Some%20Show%20S01E01.srt".to_string(),
        );
        assert_eq!("Some Show S01E01.vtt", output_filename(&subtitle));

        let subtitle = NormalizedSubtitle::new(
            String::new(),
            "a/b.vtt".to_string(),
            SubtitleType::Vtt,
            "http://localhost/a%2Fb.vtt".to_string(),
        );
        assert_eq!("b.vtt", output_filename(&subtitle));
    }
}
