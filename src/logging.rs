use std::path::PathBuf;

use compact_str::format_compact;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::result::{Result, WatchError};

/// Environment variable holding an `EnvFilter` directive for the console
pub const LOG_ENV: &str = "JOBWATCH_LOG";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub console_level: LevelFilter,
    pub file_level: LevelFilter,
    /// Daily-rolling log files are written here when set
    pub log_dir: Option<PathBuf>,
    /// Emit file logs as JSON lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::INFO,
            file_level: LevelFilter::DEBUG,
            log_dir: None,
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let log_dir = std::env::var_os("JOBWATCH_LOG_DIR").map(PathBuf::from);
        let json = std::env::var("JOBWATCH_LOG_JSON")
            .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        Self { log_dir, json, ..Self::default() }
    }

    /// Applies a level name such as `debug` or `off` from the config file
    pub fn with_level_name(mut self, level: &str) -> Self {
        if let Ok(level) = level.parse::<LevelFilter>() {
            self.console_level = level;
            self.file_level = level;
        }
        self
    }
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the program.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let console_filter = EnvFilter::builder()
        .with_default_directive(config.console_level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let (file, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "jobwatch.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = if config.json {
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed()
            } else {
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .boxed()
            };
            (Some(layer.with_filter(config.file_level)), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| {
            WatchError::GeneralError(format_compact!("Failed to initialize logging: {e}"))
        })?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_name_overrides_both_levels() {
        let config = LoggingConfig::default().with_level_name("warn");

        assert_eq!(config.console_level, LevelFilter::WARN);
        assert_eq!(config.file_level, LevelFilter::WARN);
    }

    #[test]
    fn off_disables_logging() {
        let config = LoggingConfig::default().with_level_name("off");
        assert_eq!(config.console_level, LevelFilter::OFF);
        assert_eq!(config.file_level, LevelFilter::OFF);
    }

    #[test]
    fn unknown_level_name_is_ignored() {
        let config = LoggingConfig::default().with_level_name("chatty");
        assert_eq!(config.console_level, LevelFilter::INFO);
    }
}
