//! Logging bootstrap for embedders and the integration tests.
//!
//! The fetch pipeline only emits `tracing` events (under `fetch.*` and
//! `store.*` targets); it never installs a subscriber on its own. Hosts
//! that want those events on disk call [`init_logging`] once near
//! process start to get a daily-rolling file sink plus an optional
//! stderr mirror. Additional calls are no-ops that hand back the path
//! resolved by the first.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// `ANYFETCH_LOG_FORMAT=json` selects JSON; anything else is text.
    pub fn from_env() -> Self {
        match std::env::var("ANYFETCH_LOG_FORMAT") {
            Ok(raw) if raw.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Logical name of the component (used for defaults and file names).
    pub app_name: &'static str,
    /// Explicit directory for log output. If `None`, `ANYFETCH_LOG_DIR`
    /// is consulted, then the platform data dir plus `<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Duplicate events to `stderr` in addition to the file sink.
    pub emit_stderr: bool,
    /// Preferred log encoding; defaults from `ANYFETCH_LOG_FORMAT`.
    pub format: LogFormat,
    /// Filter applied when `RUST_LOG` is unset. The selection and cache
    /// events are emitted at debug.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "anyfetch",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::from_env(),
            default_filter: "info",
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// Returns the path of today's log file. Once a subscriber is in
/// place, later calls ignore their config and report the location the
/// first call resolved.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    // rolling::daily names files "<prefix>.<YYYY-MM-DD>" inside dir.
    let prefix = format!("{}.log", config.app_name);
    let today = Local::now().format("%Y-%m-%d");
    let full_path = dir.join(format!("{prefix}.{today}"));

    let appender = rolling::daily(&dir, &prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_filter));
    let base = tracing_subscriber::registry().with(env_filter);
    match config.format {
        LogFormat::Text => base
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .with(
                config
                    .emit_stderr
                    .then(|| fmt::layer().with_writer(std::io::stderr)),
            )
            .try_init(),
        LogFormat::Json => base
            .with(fmt::layer().json().with_writer(writer))
            .with(
                config
                    .emit_stderr
                    .then(|| fmt::layer().with_writer(std::io::stderr)),
            )
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = LOG_PATH.set(full_path.clone());
    Ok(full_path)
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(expand_home)
        .or_else(|| {
            let env_dir = std::env::var("ANYFETCH_LOG_DIR").ok()?;
            Some(expand_home(Path::new(&env_dir)))
        })
        .unwrap_or_else(|| default_data_dir(app_name))
}

/// Expand a leading `~/` against `$HOME`; other paths pass through.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

fn default_data_dir(app_name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(app_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_env_selection() {
        temp_env::with_var("ANYFETCH_LOG_FORMAT", Some(" JSON "), || {
            assert!(matches!(LogFormat::from_env(), LogFormat::Json));
        });
        temp_env::with_var("ANYFETCH_LOG_FORMAT", Some("plain"), || {
            assert!(matches!(LogFormat::from_env(), LogFormat::Text));
        });
        temp_env::with_var("ANYFETCH_LOG_FORMAT", None::<&str>, || {
            assert!(matches!(LogFormat::from_env(), LogFormat::Text));
        });
    }

    #[test]
    fn expand_home_rewrites_tilde() {
        temp_env::with_var("HOME", Some("/home/someone"), || {
            assert_eq!(
                expand_home(Path::new("~/logs")),
                PathBuf::from("/home/someone/logs")
            );
            assert_eq!(expand_home(Path::new("/var/log")), PathBuf::from("/var/log"));
        });
    }
}
