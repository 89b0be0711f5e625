//! Leveled file logging for the assistant core.
//!
//! Log levels:
//! - ERROR: Capability faults and other failures that end an operation
//! - WARN: Recoverable surprises (dropped messages, halted workflows)
//! - INFO: Registry changes and decisions
//! - DEBUG: Per-call traces (capability execution, memory writes)
//! - TRACE: Very detailed traces (params, message contents)
//!
//! Nothing is written until one of the `init` functions has chosen a target
//! file, so library users and tests can call the macros freely.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::OnceLock;

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static PANICS_LOGGED: AtomicUsize = AtomicUsize::new(0);

/// Log levels for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Initialize logging to ~/.aide/aide.log, at DEBUG when `debug` is set.
pub fn init_with_debug(debug: bool) {
    let level = if debug { LogLevel::Debug } else { LogLevel::Info };
    if let Some(dir) = dirs::home_dir().map(|h| h.join(".aide")) {
        let _ = std::fs::create_dir_all(&dir);
        init_at(&dir.join("aide.log"), level);
    } else {
        set_level(level);
    }
}

/// Initialize logging to an explicit file, truncating it.
///
/// The target can only be chosen once per process; later calls only
/// change the level.
pub fn init_at(path: &Path, level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
    if LOG_PATH.get().is_none() {
        let _ = std::fs::write(path, "");
        LOG_PATH.set(path.to_path_buf()).ok();
    }
}

/// Set the minimum log level for output.
pub fn set_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Get the current log level.
pub fn get_level() -> LogLevel {
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Log a message at the specified level.
pub fn log_at(level: LogLevel, msg: &str) {
    if level > get_level() {
        return;
    }

    if let Some(path) = LOG_PATH.get() {
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] [{}] {}", timestamp, level.as_str(), msg);
        }
    }
}

/// Send panic reports to the log at ERROR instead of stderr.
///
/// Capability panics are already turned into `EXECUTION_ERROR` outcomes;
/// this keeps the default hook from also printing them.
pub fn capture_panics() {
    std::panic::set_hook(Box::new(|info| {
        PANICS_LOGGED.fetch_add(1, Ordering::SeqCst);
        error(&format!("panic: {}", info));
    }));
}

/// Panics reported through `capture_panics` so far.
pub fn panics_logged() -> usize {
    PANICS_LOGGED.load(Ordering::SeqCst)
}

pub fn error(msg: &str) {
    log_at(LogLevel::Error, msg);
}

pub fn warn(msg: &str) {
    log_at(LogLevel::Warn, msg);
}

pub fn info(msg: &str) {
    log_at(LogLevel::Info, msg);
}

pub fn debug(msg: &str) {
    log_at(LogLevel::Debug, msg);
}

pub fn trace(msg: &str) {
    log_at(LogLevel::Trace, msg);
}

/// Log macro for INFO level.
#[macro_export]
macro_rules! alog {
    ($($arg:tt)*) => {
        $crate::log::info(&format!($($arg)*))
    };
}

/// Log macro for ERROR level.
#[macro_export]
macro_rules! alog_error {
    ($($arg:tt)*) => {
        $crate::log::error(&format!($($arg)*))
    };
}

/// Log macro for WARN level.
#[macro_export]
macro_rules! alog_warn {
    ($($arg:tt)*) => {
        $crate::log::warn(&format!($($arg)*))
    };
}

/// Log macro for DEBUG level.
#[macro_export]
macro_rules! alog_debug {
    ($($arg:tt)*) => {
        $crate::log::debug(&format!($($arg)*))
    };
}

/// Log macro for TRACE level.
#[macro_export]
macro_rules! alog_trace {
    ($($arg:tt)*) => {
        $crate::log::trace(&format!($($arg)*))
    };
}
