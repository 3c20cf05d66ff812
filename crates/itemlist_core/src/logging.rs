//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Start size-rotated file logging once per process.
//! - Capture panics into the log with a sanitized payload.
//!
//! # Invariants
//! - Re-initializing with the same config is a no-op.
//! - Re-initializing with a different level or directory is rejected.
//! - Initialization never panics.
//! - Core log lines carry metadata only, never item names.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "itemlist";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    config: LoggingConfig,
    _handle: LoggerHandle,
}

/// Supported log verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// `debug` for debug builds, `info` for release builds.
    pub fn build_default() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Info
        }
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(LoggingError::UnsupportedLevel(other.to_string())),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging destination and verbosity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Absolute directory receiving rolling log files.
    pub log_dir: PathBuf,
}

impl LoggingConfig {
    pub fn new(level: LogLevel, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level,
            log_dir: log_dir.into(),
        }
    }
}

/// Logging bootstrap failure.
#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(String),
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    Backend(flexi_logger::FlexiLoggerError),
    Conflict {
        active: String,
        requested: String,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(message) => write!(f, "{message}"),
            Self::CreateDirectory { path, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                path.display()
            ),
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already initialized with {active}; refusing to switch to {requested}"
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Initializes core logging.
///
/// # Errors
/// - `InvalidDirectory` when `log_dir` is empty or relative.
/// - `CreateDirectory` / `Backend` when the file logger cannot start.
/// - `Conflict` when logging is already active with another config.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let requested = LoggingConfig {
        level: config.level,
        log_dir: normalize_log_dir(&config.log_dir)?,
    };

    let active = ACTIVE.get_or_try_init(|| start_logger(&requested))?;
    ensure_same_config(&active.config, &requested)
}

/// Returns the active logging config, if logging was initialized.
pub fn logging_status() -> Option<LoggingConfig> {
    ACTIVE.get().map(|active| active.config.clone())
}

fn start_logger(config: &LoggingConfig) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&config.log_dir).map_err(|source| LoggingError::CreateDirectory {
        path: config.log_dir.clone(),
        source,
    })?;

    let handle = Logger::try_with_str(config.level.as_str())
        .map_err(LoggingError::Backend)?
        .log_to_file(
            FileSpec::default()
                .directory(config.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Backend)?;

    install_panic_hook_once();

    info!(
        "event=logging_init module=core status=ok level={} log_dir={} platform={} version={}",
        config.level,
        config.log_dir.display(),
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        config: config.clone(),
        _handle: handle,
    })
}

fn ensure_same_config(
    active: &LoggingConfig,
    requested: &LoggingConfig,
) -> Result<(), LoggingError> {
    if active.log_dir != requested.log_dir {
        return Err(LoggingError::Conflict {
            active: format!("directory `{}`", active.log_dir.display()),
            requested: format!("`{}`", requested.log_dir.display()),
        });
    }
    if active.level != requested.level {
        return Err(LoggingError::Conflict {
            active: format!("level `{}`", active.level),
            requested: format!("`{}`", requested.level),
        });
    }
    Ok(())
}

fn normalize_log_dir(log_dir: &Path) -> Result<PathBuf, LoggingError> {
    let text = log_dir.to_string_lossy();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LoggingError::InvalidDirectory(
            "log_dir cannot be empty".to_string(),
        ));
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(LoggingError::InvalidDirectory(format!(
            "log_dir must be an absolute path, got `{trimmed}`"
        )));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!("event=panic_captured module=core status=error location={location} payload={payload}");
        previous_hook(panic_info);
    }));
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, logging_status, normalize_log_dir, sanitize_message, LogLevel,
        LoggingConfig, LoggingError,
    };
    use std::path::Path;

    #[test]
    fn log_level_parses_case_insensitively() {
        assert_eq!(" INFO ".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!(matches!(
            "verbose".parse::<LogLevel>(),
            Err(LoggingError::UnsupportedLevel(level)) if level == "verbose"
        ));
    }

    #[test]
    fn normalize_log_dir_rejects_relative_and_empty_paths() {
        let err = normalize_log_dir(Path::new("logs/dev")).unwrap_err();
        assert!(err.to_string().contains("absolute"));

        let err = normalize_log_dir(Path::new("  ")).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_conflicts() {
        let log_dir = tempfile::tempdir().unwrap();
        let other_dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig::new(LogLevel::Info, log_dir.path());

        init_logging(&config).unwrap();
        init_logging(&config).unwrap();

        let level_err = init_logging(&LoggingConfig::new(LogLevel::Debug, log_dir.path()))
            .unwrap_err();
        assert!(matches!(level_err, LoggingError::Conflict { .. }));

        let dir_err =
            init_logging(&LoggingConfig::new(LogLevel::Info, other_dir.path())).unwrap_err();
        assert!(matches!(dir_err, LoggingError::Conflict { .. }));

        assert_eq!(logging_status(), Some(config));
    }
}
