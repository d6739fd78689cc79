//! Core logging bootstrap and safety policy.
//!
//! # Responsibility
//! - Initialize file-based rolling logs exactly once per process.
//! - Emit stable, metadata-only diagnostic events from core.
//!
//! # Invariants
//! - Logging init is idempotent for the same level and directory.
//! - Re-initialization with a different level or directory is rejected.
//! - Logging initialization must not panic.
//! - Draft contents and comment text never reach the log; events carry ids,
//!   versions and counts only.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "draftbox";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

impl LoggingState {
    fn ensure_same_config(&self, level: &str, log_dir: &Path) -> Result<(), String> {
        if self.log_dir.as_path() != log_dir {
            return Err(format!(
                "logging already initialized at `{}`; refusing to switch to `{}`",
                self.log_dir.display(),
                log_dir.display()
            ));
        }
        if self.level != level {
            return Err(format!(
                "logging already initialized with level `{}`; refusing to switch to `{}`",
                self.level, level
            ));
        }
        Ok(())
    }
}

/// Initializes core logging with level and directory.
///
/// # Errors
/// - `level` is not one of `trace|debug|info|warn|error`.
/// - `log_dir` is empty, relative, or cannot be created.
/// - Logging is already active with a different level or directory.
/// - The logger backend fails to start.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let normalized_level = normalize_level(level)?;
    let normalized_dir = normalize_log_dir(log_dir)?;

    if let Some(state) = LOGGING_STATE.get() {
        return state.ensure_same_config(normalized_level, &normalized_dir);
    }

    let init_dir = normalized_dir.clone();
    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, String> {
        std::fs::create_dir_all(&init_dir).map_err(|err| {
            format!(
                "failed to create log directory `{}`: {err}",
                init_dir.display()
            )
        })?;

        let logger = Logger::try_with_str(normalized_level)
            .map_err(|err| format!("invalid log level `{normalized_level}`: {err}"))?
            .log_to_file(
                FileSpec::default()
                    .directory(init_dir.as_path())
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
            .map_err(|err| format!("failed to start logger: {err}"))?;

        install_panic_hook_once();

        info!(
            "event=core_init module=core status=ok level={} log_dir={} build_mode={} version={}",
            normalized_level,
            init_dir.display(),
            build_mode(),
            env!("CARGO_PKG_VERSION")
        );

        Ok(LoggingState {
            level: normalized_level,
            log_dir: init_dir,
            _logger: logger,
        })
    })?;

    // Another thread may have won the init race with a different config.
    state.ensure_same_config(normalized_level, &normalized_dir)
}

/// Returns `(level, log_dir)` when logging is active.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}

fn build_mode() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.get().is_some() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Payload may echo draft text; cap and flatten it.
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));

    let _ = PANIC_HOOK_INSTALLED.set(());
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
        init_logging, logging_status, normalize_level, normalize_log_dir, sanitize_message,
    };

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(normalize_level("verbose").is_err());
    }

    #[test]
    fn normalize_log_dir_rejects_relative_and_empty_paths() {
        let error = normalize_log_dir("logs/dev").unwrap_err();
        assert!(error.contains("absolute"));
        assert!(normalize_log_dir("  ").is_err());
    }

    #[test]
    fn sanitize_message_flattens_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_reconfiguration() {
        let log_dir = tempfile::tempdir().unwrap();
        let other_dir = tempfile::tempdir().unwrap();
        let log_dir_str = log_dir.path().to_str().unwrap().to_string();
        let other_dir_str = other_dir.path().to_str().unwrap().to_string();

        init_logging("info", &log_dir_str).unwrap();
        init_logging("info", &log_dir_str).unwrap();

        let level_error = init_logging("debug", &log_dir_str).unwrap_err();
        assert!(level_error.contains("refusing to switch"));

        let dir_error = init_logging("info", &other_dir_str).unwrap_err();
        assert!(dir_error.contains("refusing to switch"));

        let (active_level, active_dir) = logging_status().unwrap();
        assert_eq!(active_level, "info");
        assert_eq!(active_dir.as_path(), log_dir.path());
    }
}
