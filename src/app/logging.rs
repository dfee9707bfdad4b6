//! Usage: Process-wide tracing setup (console + optional daily rolling file, `log` bridge).

use crate::shared::error::OperationResult;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Default level for this crate; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Directory for the daily rolling log file; console only when `None`.
    pub log_dir: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            file_prefix: "login-sdk.log".to_string(),
        }
    }
}

fn default_directives(level: &str) -> String {
    let level = match level.trim() {
        "" => "info",
        other => other,
    };
    format!("warn,login_sdk={level},reqwest=warn,hyper=warn")
}

/// Install the global subscriber once.
///
/// Returns the file writer guard on the first successful call (keep it alive for the process
/// lifetime) and `None` when logging was already initialized.
pub fn init(config: &LogConfig) -> OperationResult<Option<WorkerGuard>> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(None);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                INITIALIZED.store(false, Ordering::SeqCst);
                format!("STORAGE_ERROR: failed to create log dir {}: {e}", dir.display())
            })?;
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).compact())
        .with(file_layer);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Another subscriber was installed by the host; keep it.
        return Ok(None);
    }
    if let Err(err) = tracing_log::LogTracer::init() {
        tracing::debug!("log bridge already installed: {}", err);
    }

    tracing::debug!(level = %config.level, file = config.log_dir.is_some(), "logging initialized");
    Ok(guard)
}
