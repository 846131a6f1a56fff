#![deny(missing_docs)]
//! Shared logging utilities for the link watcher workspace.
//!
//! This crate provides the `monitor_*` logging macros used across the engine
//! and the app, plus a minimal test initializer for the global logger.
//! Every record is prefixed with the tag of the session that emitted it, so
//! a log spanning several page loads can be read one session at a time.

use std::sync::atomic::{AtomicU64, Ordering};

#[doc(hidden)]
pub use log;

/// Tag of the session currently driving the engine. 0 means "no session".
static SESSION_TAG: AtomicU64 = AtomicU64::new(0);

/// Sets the session tag attached to subsequent log records.
/// The session runtime calls this once per page load.
pub fn set_session_tag(tag: u64) {
    SESSION_TAG.store(tag, Ordering::Relaxed);
}

/// Retrieves the current session tag. Returns 0 before any session started.
pub fn session_tag() -> u64 {
    SESSION_TAG.load(Ordering::Relaxed)
}

/// Logs a trace-level message tagged with the current session.
#[macro_export]
macro_rules! monitor_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("[s{}] {}", $crate::session_tag(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current session.
#[macro_export]
macro_rules! monitor_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("[s{}] {}", $crate::session_tag(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current session.
#[macro_export]
macro_rules! monitor_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("[s{}] {}", $crate::session_tag(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current session.
#[macro_export]
macro_rules! monitor_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("[s{}] {}", $crate::session_tag(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current session.
#[macro_export]
macro_rules! monitor_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("[s{}] {}", $crate::session_tag(), format_args!($($arg)*));
    }};
}

/// Installs a stderr logger for tests.
///
/// Safe to call from every test: when a logger is already installed the call
/// leaves it in place.
pub fn initialize_for_tests() {
    use log::LevelFilter;
    use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();

    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Never);
}
