use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::domain::PTError;

/// Sends all tracing output to `log_file`; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides `default_level`.
pub fn init_tracing(log_file: &Path, default_level: LevelFilter) -> Result<(), PTError> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| PTError::LoggingFailed(e.to_string()))
}
