//! Log output setup.
//!
//! The terminal UI owns stdout, so every log line goes to a file.

use crate::config::LoggingConfig;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("taskboard").join("taskboard.log"))
        .unwrap_or_else(|| PathBuf::from("./taskboard.log"))
}

/// `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("taskboard={}", config.level)))
}

/// Installs the global subscriber and returns the log file path.
pub fn init(config: &LoggingConfig) -> io::Result<PathBuf> {
    let path = config
        .file
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(default_log_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(path)
}
