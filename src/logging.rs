//! Tracing setup.
//!
//! The terminal is owned by the UI, so log lines only go to a file, and only
//! when one is configured.

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;

/// Install the global subscriber. Returns `Ok(false)` when logging is off.
///
/// `RUST_LOG` wins over `log.level` when set.
pub fn init(settings: &LogSettings) -> Result<bool, Box<dyn Error>> {
    let Some(path) = settings.file.as_ref() else {
        return Ok(false);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&settings.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| e as Box<dyn Error>)?;
    Ok(true)
}
