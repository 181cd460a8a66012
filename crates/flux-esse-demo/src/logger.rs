//! File-based logging using simplelog
//!
//! Log file location depends on build type:
//! - Debug builds: current working directory (for development convenience)
//! - Release builds: cache directory (~/.cache/flux-esse-demo/ on Linux)
//!
//! The terminal belongs to the UI, so nothing is logged to stdout or stderr.

use anyhow::Context;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::any::Any;
use std::fs::File;
use std::panic::{self, Location};
use std::path::PathBuf;

fn log_file_path() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let filename = format!("flux-esse-demo-{}.log", timestamp);

    if cfg!(debug_assertions) {
        PathBuf::from(filename)
    } else {
        crate::config::cache_dir()
            .map(|dir| dir.join(&filename))
            .unwrap_or_else(|_| PathBuf::from(filename))
    }
}

fn level_from_env(value: Option<&str>) -> LevelFilter {
    match value.map(str::to_lowercase).as_deref() {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        Some(_) => LevelFilter::Info,
        None => LevelFilter::Debug,
    }
}

/// Initialize file-based logging
///
/// Returns the path of the log file.
pub fn init() -> anyhow::Result<PathBuf> {
    let log_file = log_file_path();
    let level = level_from_env(std::env::var("RUST_LOG").ok().as_deref());

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|c| c) // Fallback if local time offset fails
        .build();

    let file = File::create(&log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;
    WriteLogger::init(level, config, file).context("Failed to initialize logger")?;

    Ok(log_file)
}

/// Send panic messages to the log file instead of stderr
///
/// Store handler panics are caught and reported, but the default hook would
/// still print over the alternate screen.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        log::error!("{}", panic_line(info.payload(), info.location()));
    }));
}

fn panic_line(payload: &(dyn Any + Send), location: Option<&Location<'_>>) -> String {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    match location {
        Some(location) => format!(
            "Panic at {}:{}: {}",
            location.file(),
            location.line(),
            message
        ),
        None => format!("Panic: {}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_env() {
        assert_eq!(level_from_env(None), LevelFilter::Debug);
        assert_eq!(level_from_env(Some("WARN")), LevelFilter::Warn);
        assert_eq!(level_from_env(Some("trace")), LevelFilter::Trace);
        assert_eq!(level_from_env(Some("verbose")), LevelFilter::Info);
    }

    #[test]
    fn test_panic_line() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let line = panic_line(payload.as_ref(), Some(Location::caller()));
        assert!(line.starts_with("Panic at "));
        assert!(line.contains("logger.rs"));
        assert!(line.ends_with(": boom"));

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(
            panic_line(payload.as_ref(), None),
            "Panic: non-string panic payload"
        );
    }

    #[test]
    fn test_panics_stay_catchable_with_hook() {
        install_panic_hook();
        let result = panic::catch_unwind(|| panic!("handler failure"));
        let _ = panic::take_hook();
        assert!(result.is_err());
    }
}
