use chrono::Local;
use once_cell::sync::Lazy;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

/// Global log file path protected by Mutex
///
/// Thread-safe storage for optional log file path.
/// When None, logs go to stderr so they never mix with command output.
pub static LOG_FILE: Lazy<Mutex<Option<String>>> = Lazy::new(|| Mutex::new(None));

/// Minimum level that gets written, stored as `Level as u8`
static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// Severity of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Error = 2,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Error => "ERROR",
        };
        f.write_str(name)
    }
}

impl Level {
    fn from_u8(value: u8) -> Level {
        match value {
            0 => Level::Debug,
            1 => Level::Info,
            _ => Level::Error,
        }
    }
}

/// Per-module logger
///
/// Create one per module with `module_path!()` so every line names
/// where it came from:
///
/// ```text
/// // const LOG: Logger = Logger::new(module_path!());
/// // let _ = LOG.debug("basePath: /tmp");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    target: &'static str,
}

impl Logger {
    pub const fn new(target: &'static str) -> Logger {
        Logger { target }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Whether a debug line would actually be written
    pub fn is_debug_enabled(&self) -> bool {
        is_enabled(Level::Debug)
    }

    pub fn debug(&self, message: &str) -> io::Result<()> {
        log_at(Level::Debug, self.target, message)
    }

    pub fn info(&self, message: &str) -> io::Result<()> {
        log_at(Level::Info, self.target, message)
    }

    pub fn error(&self, message: &str) -> io::Result<()> {
        log_at(Level::Error, self.target, message)
    }
}

/// Logs an INFO message without a module target
///
/// # Arguments
/// * `message` - The message to log
///
/// # Returns
/// * `io::Result<()>` - Ok on success, Err if writing fails
pub fn log(message: &str) -> io::Result<()> {
    log_at(Level::Info, "", message)
}

/// Logs a message with timestamp, level and target to the configured output
///
/// Messages below the current threshold (see `set_log_level`) are dropped.
/// If a log file has been set (using set_log_file), the line is appended to
/// that file. Otherwise it is printed to stderr.
///
/// # Arguments
/// * `level` - Severity of the message
/// * `target` - Module path of the caller, may be empty
/// * `message` - The message to log
///
/// # Returns
/// * `io::Result<()>` - Ok on success, Err if writing fails
pub fn log_at(level: Level, target: &str, message: &str) -> io::Result<()> {
    if !is_enabled(level) {
        return Ok(());
    }

    let log_message = format_line(level, target, message);

    match destination()? {
        Destination::File(log_file) => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?;
            file.write_all(log_message.as_bytes())?;
        }
        Destination::Stderr => {
            io::stderr().write_all(log_message.as_bytes())?;
        }
    }

    Ok(())
}

/// Where log lines currently go
#[derive(Debug, Clone, PartialEq, Eq)]
enum Destination {
    File(String),
    Stderr,
}

fn destination() -> io::Result<Destination> {
    let log_file = LOG_FILE
        .lock()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
    Ok(match &*log_file {
        Some(path) => Destination::File(path.clone()),
        None => Destination::Stderr,
    })
}

fn format_line(level: Level, target: &str, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    if target.is_empty() {
        format!("{} {} {}\n", timestamp, level, message)
    } else {
        format!("{} {} [{}] {}\n", timestamp, level, target, message)
    }
}

/// Returns true when messages of `level` pass the current threshold
pub fn is_enabled(level: Level) -> bool {
    level >= Level::from_u8(LOG_LEVEL.load(Ordering::SeqCst))
}

/// Sets the minimum level that gets written
pub fn set_log_level(level: Level) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Sets the path for the log file
///
/// Subsequent log lines are appended to this file instead of stderr.
/// Paths that are not valid UTF-8 are stored lossily.
///
/// # Arguments
///
/// * `path` - A path-like object representing the location of the log file
pub fn set_log_file<P: AsRef<Path>>(path: P) {
    let path_str = path.as_ref().to_string_lossy().into_owned();
    if let Ok(mut log_file) = LOG_FILE.lock() {
        *log_file = Some(path_str);
    }
}

/// Switches logging back to stderr
pub fn clear_log_file() {
    if let Ok(mut log_file) = LOG_FILE.lock() {
        *log_file = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    const LOG: Logger = Logger::new("awtools::logging::tests");

    #[test]
    #[serial]
    fn test_log_to_file() {
        clear_log_file();
        set_log_level(Level::Info);

        let dir = tempdir().unwrap();
        let log_file_path = dir.path().join("test.log");

        set_log_file(&log_file_path);
        log("test message 1").unwrap();
        LOG.info("test message 2").unwrap();
        LOG.error("test message 3").unwrap();

        let log_contents = fs::read_to_string(&log_file_path).unwrap();
        assert!(log_contents.contains("INFO test message 1"));
        assert!(log_contents.contains("INFO [awtools::logging::tests] test message 2"));
        assert!(log_contents.contains("ERROR [awtools::logging::tests] test message 3"));

        clear_log_file();
    }

    #[test]
    #[serial]
    fn test_debug_filtered_by_level() {
        clear_log_file();
        let dir = tempdir().unwrap();
        let log_file_path = dir.path().join("level.log");
        set_log_file(&log_file_path);

        set_log_level(Level::Info);
        assert!(!LOG.is_debug_enabled());
        LOG.debug("hidden").unwrap();

        set_log_level(Level::Debug);
        assert!(LOG.is_debug_enabled());
        LOG.debug("shown").unwrap();

        let log_contents = fs::read_to_string(&log_file_path).unwrap();
        assert!(!log_contents.contains("hidden"));
        assert!(log_contents.contains("DEBUG [awtools::logging::tests] shown"));

        set_log_level(Level::Info);
        clear_log_file();
    }

    #[test]
    #[serial]
    fn test_log_without_file_goes_to_stderr() {
        clear_log_file();
        assert_eq!(destination().unwrap(), Destination::Stderr);
        log("test stderr message 1").unwrap();
        LOG.info("test stderr message 2").unwrap();

        set_log_file("/tmp/awtools-destination.log");
        assert_eq!(
            destination().unwrap(),
            Destination::File("/tmp/awtools-destination.log".to_string())
        );
        clear_log_file();
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Error);
        assert_eq!(Level::Error.to_string(), "ERROR");
    }
}
