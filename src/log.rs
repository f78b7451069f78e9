//! Run log with two sinks: an append-only file and the console.
//!
//! One `RunLog` is opened at process start and handed down by reference, nothing
//! reaches for a global logger. Lines look like
//! `2024-03-01 12:00:00,123 - INFO - message`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Local};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

#[derive(Debug)]
pub struct RunLog {
    file: Option<Mutex<File>>,
    console: bool,
}

impl RunLog {
    /// File at `path` (created or appended to) plus console.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            file: Some(Mutex::new(open_append(path.as_ref())?)),
            console: true,
        })
    }

    /// File only, used where console noise is unwanted.
    pub fn file_only(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            file: Some(Mutex::new(open_append(path.as_ref())?)),
            console: false,
        })
    }

    /// Discards everything.
    pub fn silent() -> Self {
        Self {
            file: None,
            console: false,
        }
    }

    pub fn write(&self, level: Level, message: &str) {
        let line = format_line(Local::now(), level, message);

        if self.console {
            match level {
                Level::Info => println!("{line}"),
                Level::Warn | Level::Error => eprintln!("{line}"),
            }
        }

        // A poisoned lock or a failed write must never take the run down with it.
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{line}");
            }
        }
    }
}

fn open_append(path: &Path) -> Result<File> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

pub(crate) fn format_line(at: DateTime<Local>, level: Level, message: &str) -> String {
    format!(
        "{} - {} - {}",
        at.format("%Y-%m-%d %H:%M:%S,%3f"),
        level.as_str(),
        message
    )
}

/// Seconds elapsed since `start`, used by `info_time!`.
pub fn runtime_secs(start: DateTime<Local>) -> f64 {
    (Local::now() - start)
        .num_microseconds()
        .map(|n| n as f64 / 1_000_000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn line_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap();
        assert_eq!(
            format_line(at, Level::Warn, "careful"),
            "2024-03-01 12:00:05,000 - WARNING - careful"
        );
    }

    #[test]
    fn file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");

        let log = RunLog::file_only(&path).unwrap();
        log.write(Level::Info, "first");
        log.write(Level::Error, "second");
        drop(log);
        let log = RunLog::file_only(&path).unwrap();
        log.write(Level::Info, "third");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(" - INFO - first"));
        assert!(lines[1].ends_with(" - ERROR - second"));
        assert!(lines[2].ends_with(" - INFO - third"));
    }

    #[test]
    fn level_ordering() {
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }
}
