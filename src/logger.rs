//! Session logger for PixelForge.
//!
//! One log file per run, truncated at startup so it only holds the latest
//! session. Nothing is written until [`init`] (or [`init_at`]) has been
//! called, so library code and unit tests can log freely without a file.
//!
//! Default location:
//!   Windows:  `%APPDATA%\PixelForge\pixelforge.log`
//!   Linux:    `$XDG_DATA_HOME/PixelForge/pixelforge.log` (or `~/.local/share/...`)
//!   macOS:    `~/Library/Application Support/PixelForge/pixelforge.log`
//!
//! Use the `log_info!` / `log_warn!` / `log_err!` macros from anywhere in the
//! crate. Panics are mirrored into the log before the default hook runs.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        })
    }
}

/// Append a raw line. I/O failures are swallowed.
pub fn write_line(line: &str) {
    if let Some(mutex) = LOG_FILE.get()
        && let Ok(mut file) = mutex.lock()
    {
        let _ = writeln!(file, "{}", line);
    }
}

/// Append a timestamped, level-tagged line.
pub fn write(level: Level, msg: &str) {
    if LOG_FILE.get().is_none() {
        return;
    }
    write_line(&format_line(&timestamp(), level, msg));
}

fn format_line(ts: &str, level: Level, msg: &str) -> String {
    format!("[{}] [{}] {}", ts, level, msg)
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Error, &format!($($arg)*))
    };
}

/// Open the log in the platform data directory and install the panic hook.
pub fn init() {
    init_at(&log_file_path());
}

/// Same as [`init`] with an explicit file. Only the first call in a process
/// takes effect.
pub fn init_at(path: &Path) {
    if LOG_FILE.get().is_some() {
        return;
    }
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
    {
        Ok(f) => f,
        Err(e) => {
            // Not fatal: the app runs without a log file.
            eprintln!("[logger] Failed to open log file {:?}: {}", path, e);
            return;
        }
    };
    let _ = LOG_FILE.set(Mutex::new(file));

    write_line(&format!("=== PixelForge {} session (unix {}) ===", env!("CARGO_PKG_VERSION"), unix_secs()));
    write_line(&format!("Log file: {}", path.display()));

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write_line(&format!("[{}] [PANIC] {}", timestamp(), info));
        prev(info);
    }));
}

fn log_file_path() -> PathBuf {
    data_dir().join("PixelForge").join("pixelforge.log")
}

/// Platform data directory (without the app sub-folder).
fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join("Library").join("Application Support");
        }
    }
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from(".")
}

fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// `HH:MM:SS` (UTC) within the current day.
fn timestamp() -> String {
    let secs = unix_secs();
    format!("{:02}:{:02}:{:02}", (secs % 86_400) / 3600, (secs % 3600) / 60, secs % 60)
}
