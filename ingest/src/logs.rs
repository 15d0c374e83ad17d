//! Pipeline log helpers.
//!
//! Thin wrappers that emit `tracing` events under the `edustats` target, so
//! the binary decides where they go (and at which level) through `RUST_LOG`.

use tracing_subscriber::{fmt, EnvFilter};

/// Log level of a pipeline message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Debug | LogLevel::Info => "",
            LogLevel::Success => "✓ ",
            LogLevel::Warning => "⚠️ ",
            LogLevel::Error => "❌ ",
        }
    }
}

/// Emit one pipeline message at `level`.
pub fn log(level: LogLevel, msg: impl Into<String>) {
    let msg = msg.into();
    let prefix = level.prefix();
    match level {
        LogLevel::Debug => tracing::debug!(target: "edustats", "{}", msg),
        LogLevel::Info | LogLevel::Success => {
            tracing::info!(target: "edustats", "{}{}", prefix, msg)
        }
        LogLevel::Warning => tracing::warn!(target: "edustats", "{}{}", prefix, msg),
        LogLevel::Error => tracing::error!(target: "edustats", "{}{}", prefix, msg),
    }
}

pub fn log_debug(msg: impl Into<String>) {
    log(LogLevel::Debug, msg);
}

pub fn log_info(msg: impl Into<String>) {
    log(LogLevel::Info, msg);
}

pub fn log_success(msg: impl Into<String>) {
    log(LogLevel::Success, msg);
}

pub fn log_warning(msg: impl Into<String>) {
    log(LogLevel::Warning, msg);
}

pub fn log_error(msg: impl Into<String>) {
    log(LogLevel::Error, msg);
}

/// Install the process-wide subscriber, writing to stderr.
///
/// `RUST_LOG` wins; otherwise `default_filter` is used (e.g. `edustats=info`).
/// Calling it twice is harmless: the second install is ignored.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
