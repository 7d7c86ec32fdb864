use crate::{Error, Result};
use log::{debug, info, LevelFilter};
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::{Config, Handle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

const LOG_FORMAT_CONSOLE: &str = "\x1B[37m{d(%Y-%m-%d %H:%M:%S%.3f)}\x1B[0m {h({l:>5.5})} \x1B[37m---\x1B[0m \x1B[37m[{T:>15.15}]\x1B[0m \x1B[36m{t:<40.40}\x1B[0m \x1B[37m:\x1B[0m {m}{n}";
const LOG_FORMAT_FILE: &str =
    "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:>5.5} --- [{T:>15.15}] {t:<40.40} : {m}{n}";
const CONSOLE_APPENDER: &str = "stderr";
const FILE_APPENDER: &str = "file";
const LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;
const LOG_FILE_WINDOW: u32 = 3;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// The process wide logger of the subtitle tooling.
///
/// The console output is written to `stderr` so it never mixes with subtitle documents
/// written to `stdout`.
#[derive(Debug)]
pub struct FxLogger {
    handle: Handle,
}

impl FxLogger {
    /// Returns a builder instance for the logger.
    pub fn builder() -> FxLoggerBuilder {
        FxLoggerBuilder::default()
    }

    /// Returns the maximum log level of the logger.
    pub fn root_log_level(&self) -> LevelFilter {
        self.handle.max_log_level()
    }

    fn init(config: Config) -> Result<Self> {
        if INITIALIZED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyInitialized);
        }

        match log4rs::init_config(config) {
            Ok(handle) => {
                info!("Subfx logger has been initialized");
                Ok(Self { handle })
            }
            Err(e) => {
                // another logger implementation has claimed the log facade
                Err(Error::InvalidConfig(e.to_string()))
            }
        }
    }

    fn load_from_config(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(Error::from(std::io::Error::from(
                std::io::ErrorKind::NotFound,
            )));
        }

        log4rs::config::load_config_file(path, Default::default())
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    fn create_config(
        root_level: LevelFilter,
        log_path: Option<&Path>,
        loggers: Vec<(String, LevelFilter)>,
    ) -> Result<Config> {
        let mut root = Root::builder().appender(CONSOLE_APPENDER);
        let mut config_builder = Config::builder().appender(
            Appender::builder().build(
                CONSOLE_APPENDER,
                Box::new(
                    ConsoleAppender::builder()
                        .target(Target::Stderr)
                        .encoder(Box::new(PatternEncoder::new(LOG_FORMAT_CONSOLE)))
                        .build(),
                ),
            ),
        );

        if let Some(path) = log_path {
            config_builder = config_builder.appender(Self::create_file_appender(path)?);
            root = root.appender(FILE_APPENDER);
        }

        for (logger, level) in loggers.into_iter() {
            config_builder = config_builder.logger(Logger::builder().build(logger, level));
        }

        config_builder
            .build(root.build(root_level))
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    fn create_file_appender(path: &Path) -> Result<Appender> {
        if let Some(parent) = path.parent().filter(|e| !e.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let policy = CompoundPolicy::new(
            Box::new(SizeTrigger::new(LOG_FILE_SIZE)),
            Box::new(
                FixedWindowRoller::builder()
                    .base(1)
                    .build(Self::roll_pattern(path).as_str(), LOG_FILE_WINDOW)
                    .map_err(|e| Error::InvalidConfig(e.to_string()))?,
            ),
        );

        Ok(Appender::builder().build(
            FILE_APPENDER,
            Box::new(
                RollingFileAppender::builder()
                    .encoder(Box::new(PatternEncoder::new(LOG_FORMAT_FILE)))
                    .append(false)
                    .build(path, Box::new(policy))
                    .map_err(|e| Error::InvalidConfig(e.to_string()))?,
            ),
        ))
    }

    /// Returns the archive pattern of the given log file, e.g. `logs/subfx.{}.log`.
    fn roll_pattern(path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "subfx".to_string());
        let filename = format!("{}.{{}}.log", stem);

        match path.parent() {
            Some(parent) => parent.join(filename).to_string_lossy().to_string(),
            None => filename,
        }
    }
}

/// Parse the given level name into a [LevelFilter], ignoring case.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level.trim()).map_err(|_| Error::InvalidLevel(level.to_string()))
}

#[derive(Debug, Default)]
pub struct FxLoggerBuilder {
    root_level: Option<LevelFilter>,
    config_path: Option<PathBuf>,
    log_path: Option<PathBuf>,
    loggers: HashMap<String, LevelFilter>,
}

impl FxLoggerBuilder {
    /// Set the root level of the logger.
    pub fn root_level(&mut self, level: LevelFilter) -> &mut Self {
        self.root_level = Some(level);
        self
    }

    /// Set the path of a `log4rs` yaml config to load.
    /// When set, all other options of the builder are ignored.
    pub fn config_path<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the log file path of the logger.
    pub fn log_path<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.log_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add a log level filter for the given target.
    pub fn logger<S: AsRef<str>>(&mut self, target: S, level: LevelFilter) -> &mut Self {
        self.loggers.insert(target.as_ref().to_string(), level);
        self
    }

    /// Add the log level filters of the given targets, where each level is given by its name.
    ///
    /// It returns an error when one of the level names is invalid.
    pub fn loggers<'a, I>(&mut self, loggers: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (target, level) in loggers {
            let level = parse_level(level)?;
            self.loggers.insert(target.clone(), level);
        }
        Ok(self)
    }

    /// Consumes the builder state and creates the logging configuration.
    fn config(&mut self) -> Result<Config> {
        if let Some(path) = self.config_path.take() {
            debug!("Loading logging config from {:?}", path);
            return FxLogger::load_from_config(path.as_path());
        }

        let root_level = self.root_level.take().unwrap_or(LevelFilter::Info);
        let log_path = self.log_path.take();
        let loggers = self.loggers.drain().collect::<Vec<_>>();

        FxLogger::create_config(root_level, log_path.as_deref(), loggers)
    }

    /// Consumes the [FxLoggerBuilder] and creates a new logging instance.
    pub fn build(&mut self) -> Result<FxLogger> {
        let config = self.config()?;
        FxLogger::init(config)
    }
}
