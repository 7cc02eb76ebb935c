#![deny(missing_docs)]
//! Shared logging utilities for the relay workspace.
//!
//! This crate provides the `relay_*` logging macros used across the codebase,
//! logger setup for the app binary, and a minimal test initializer for the
//! global logger.
//!
//! Every line is prefixed with the label of the execution context that emitted
//! it (`page`, `privileged`, ...), so interleaved output from the two sides of
//! the relay channel stays readable.

use std::cell::Cell;
use std::fs::File;
use std::path::PathBuf;

#[doc(hidden)]
pub use log;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

thread_local! {
    /// Thread-local label of the execution context running on this thread.
    static CONTEXT_LABEL: Cell<&'static str> = const { Cell::new("main") };
}

/// Sets the execution context label for the current thread.
/// Called once by each context's thread at startup.
pub fn set_context_label(label: &'static str) {
    CONTEXT_LABEL.with(|v| v.set(label));
}

/// Retrieves the execution context label for the current thread.
/// Returns `"main"` if the label has not been set.
pub fn context_label() -> &'static str {
    CONTEXT_LABEL.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current context label.
#[macro_export]
macro_rules! relay_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("[{}] {}", $crate::context_label(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current context label.
#[macro_export]
macro_rules! relay_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("[{}] {}", $crate::context_label(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current context label.
#[macro_export]
macro_rules! relay_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("[{}] {}", $crate::context_label(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current context label.
#[macro_export]
macro_rules! relay_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("[{}] {}", $crate::context_label(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current context label.
#[macro_export]
macro_rules! relay_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("[{}] {}", $crate::context_label(), format_args!($($arg)*));
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to the given file, truncating it.
    File(PathBuf),
    /// Write to terminal (stdout).
    Terminal,
    /// Write to both the given file and the terminal.
    Both(PathBuf),
}

/// Initializes the global logger with the specified destination and level.
///
/// A file that cannot be created is reported on stderr and skipped; if no
/// logger remains, nothing is installed.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File(path) => match create_file_logger(path, level, config) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => {
            vec![TermLogger::new(
                level,
                config,
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )]
        }
        LogDestination::Both(path) => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
                level,
                config.clone(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )];
            if let Some(file_logger) = create_file_logger(path, level, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    path: PathBuf,
    level: LevelFilter,
    config: Config,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(&path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}
