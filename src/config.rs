use crate::numbers::{Locale, DEFAULT_DECIMAL_FORMAT};
use crate::text::{string_to_date_with, DEFAULT_DATE_FORMAT};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable with extra resource directories (platform path list)
pub const RESOURCE_PATH_ENV: &str = "AWTOOLS_RESOURCE_PATH";

/// Environment variable overriding the temp directory root
pub const TMPDIR_ENV: &str = "AWTOOLS_TMPDIR";

/// Default FTP connect timeout in seconds
pub const DEFAULT_FTP_TIMEOUT_SECS: u64 = 30;

/// Library settings
///
/// Every field is optional in the JSON file:
/// ```text
/// {"resource_dirs": ["conf", "/etc/awtools"], "locale": "de_DE",
///  "number_pattern": "##,##0.00", "ftp_connect_timeout_secs": 10}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directories searched for resources, in order
    pub resource_dirs: Vec<PathBuf>,
    /// Locale tag such as `de_DE`
    pub locale: String,
    /// Decimal pattern for number formatting
    pub number_pattern: String,
    /// Date pattern for date parsing
    pub date_format: String,
    /// Root for temporary directories (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,
    /// FTP connect timeout (seconds)
    pub ftp_connect_timeout_secs: u64,
    /// Log file (stderr when unset)
    pub log_file: Option<PathBuf>,
    /// Enables debug logging
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            resource_dirs: vec![PathBuf::from(".")],
            locale: "en".to_string(),
            number_pattern: DEFAULT_DECIMAL_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            temp_dir: None,
            ftp_connect_timeout_secs: DEFAULT_FTP_TIMEOUT_SECS,
            log_file: None,
            debug: false,
        }
    }
}

impl Settings {
    /// Locale for the configured tag, English when the tag is unknown
    pub fn locale(&self) -> Locale {
        Locale::from_tag(&self.locale).unwrap_or_default()
    }

    /// Parses a date with the configured `date_format`
    pub fn parse_date(&self, text: &str) -> Result<NaiveDateTime, Error> {
        string_to_date_with(text, &self.date_format)
    }

    pub fn ftp_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.ftp_connect_timeout_secs)
    }

    /// Root for temporary directories
    ///
    /// Priority order:
    /// 1. $AWTOOLS_TMPDIR
    /// 2. `temp_dir` from the settings file
    /// 3. the system temp directory
    pub fn temp_root(&self) -> PathBuf {
        if let Some(dir) = env::var_os(TMPDIR_ENV) {
            return PathBuf::from(dir);
        }
        self.temp_dir.clone().unwrap_or_else(env::temp_dir)
    }

    /// Resource directories: $AWTOOLS_RESOURCE_PATH entries first, then
    /// the configured ones
    pub fn resource_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = match env::var_os(RESOURCE_PATH_ENV) {
            Some(paths) => env::split_paths(&paths).collect(),
            None => Vec::new(),
        };
        roots.extend(self.resource_dirs.iter().cloned());
        roots
    }
}

/// Loads settings from a JSON file
///
/// # Errors
/// - File not found or unreadable
/// - Invalid JSON or a field of the wrong type (`InvalidInput`)
pub fn load_settings(filename: &str) -> Result<Settings, Error> {
    let contents = fs::read_to_string(filename)?;
    parse_settings(&contents)
}

/// Parses settings from JSON text; blank text yields the defaults
pub fn parse_settings(contents: &str) -> Result<Settings, Error> {
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_json::from_str(contents).map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("invalid settings JSON: {}", e),
        )
    })
}
