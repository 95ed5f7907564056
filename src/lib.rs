//! Path, file and formatting helpers
//!
//! The library behind the `awtools` command: path normalization and
//! level arithmetic, finding files along a directory path, temporary
//! directories, locale-aware number formatting, date parsing, property
//! files, resource lookup and a small FTP client wrapper.

pub mod cli;
pub mod config;
pub mod finder;
pub mod fs_utils;
pub mod ftp;
pub mod logging;
pub mod numbers;
pub mod paths;
pub mod properties;
pub mod resources;
pub mod text;

pub use config::{load_settings, Settings};
pub use finder::{find_files, find_files_by_path};
pub use ftp::FtpWrapper;
pub use logging::{log, set_log_file, Logger};
pub use numbers::{Locale, NumberUtils};
pub use paths::normalize_path;
pub use resources::ResourceLoader;

/// Name of the program
pub const PROGRAM_NAME: &str = "awtools";

/// Current version of the program (from Cargo.toml)
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");
