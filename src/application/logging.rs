//! # Logging
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (overridable through
//! `RUST_LOG`), an optional plain-text file sink and an optional stdout sink.

use anyhow::{Context, Result};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::config::LoggingConfig;

/// `RUST_LOG` if set, the configured directive otherwise.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Sets up logging. Keep the returned guard alive, dropping it flushes and closes the file sink.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            fs::create_dir_all(directory)
                .with_context(|| format!("Failed to create log directory {directory}"))?;
            let appender = tracing_appender::rolling::never(directory, &config.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_timer(LocalTime::rfc_3339())
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = config.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_timer(LocalTime::rfc_3339())
    });

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_with_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let directory = dir.path().join("logs");
        let config = LoggingConfig {
            directory: Some(directory.to_string_lossy().into_owned()),
            console: false,
            ..LoggingConfig::default()
        };

        let guard = init(&config).unwrap();
        assert!(guard.is_some());
        assert!(directory.is_dir());

        tracing::info!("logging initialised");
        // A second global subscriber is refused.
        assert!(init(&LoggingConfig::default()).is_err());
    }
}
