//! Logging bootstrap for the trip store.
//!
//! # Responsibility
//! - Initialize file-based rolling logs exactly once per process.
//! - Keep log events metadata-only: ids, counts and sizes, never trip text.
//!
//! # Invariants
//! - Init is idempotent for the same level and directory.
//! - Re-initialization with a different level or directory is rejected.
//! - Initialization never panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "tripstore";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

/// Errors from logging initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidLogDir(String),
    CreateLogDir { log_dir: PathBuf, message: String },
    Backend(String),
    /// Logging is already running with a different level or directory.
    Conflict {
        active_level: &'static str,
        active_dir: PathBuf,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidLogDir(message) => write!(f, "{message}"),
            Self::CreateLogDir { log_dir, message } => write!(
                f,
                "failed to create log directory `{}`: {message}",
                log_dir.display()
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
            Self::Conflict {
                active_level,
                active_dir,
            } => write!(
                f,
                "logging already initialized with level `{active_level}` at `{}`; refusing to switch",
                active_dir.display()
            ),
        }
    }
}

impl Error for LoggingError {}

/// Starts rolling file logs under `log_dir` at `level`.
///
/// # Errors
/// - `level` is not one of trace|debug|info|warn|error.
/// - `log_dir` is blank, relative, or cannot be created.
/// - Logging already runs with a different level or directory.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;
    let log_dir = normalize_log_dir(log_dir)?;

    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(level, &log_dir))?;
    if active.level != level || active.log_dir != log_dir {
        return Err(LoggingError::Conflict {
            active_level: active.level,
            active_dir: active.log_dir.clone(),
        });
    }
    Ok(())
}

/// Returns `(level, log_dir)` of the running logger, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_LOGGER
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: &'static str, log_dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(log_dir).map_err(|err| LoggingError::CreateLogDir {
        log_dir: log_dir.to_path_buf(),
        message: err.to_string(),
    })?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        // [YYYY-MM-DD HH:MM:SS.ffffff TZ] LEVEL [module] file:line: message
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook_once();
    info!(
        "event=logging_init module=logging status=ok platform={} build_mode={} version={} level={} log_dir={}",
        std::env::consts::OS,
        if cfg!(debug_assertions) { "debug" } else { "release" },
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );

    Ok(ActiveLogger {
        level,
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    })
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err(LoggingError::InvalidLogDir(
            "log_dir cannot be empty".to_string(),
        ));
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(LoggingError::InvalidLogDir(format!(
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
        let payload = if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        // Payload may carry trip text: flatten and cap it.
        error!(
            "event=panic_captured module=logging status=error location={} payload={}",
            location,
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous_hook(panic_info);
    }));
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    let mut truncated: String = flattened.chars().take(max_chars).collect();
    if flattened.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
