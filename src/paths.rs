//! Path normalization
//!
//! Rewrites Windows and Unix style path strings into one rooted,
//! slash-separated form so they can be compared, counted and split
//! without touching the filesystem.

use once_cell::sync::Lazy;
use regex::Regex;

/// Separator used by normalized paths
pub const SEPARATOR: char = '/';

/// One directory up
pub const UP: &str = "../";

/// Matches a Windows drive prefix such as `C:` at the start of a path
pub static WINDOWS_ROOT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[a-zA-Z]:").expect("drive letter pattern is valid"));

/// Normalizes a path expression
///
/// Backslashes become slashes, `//` and `///` are replaced once each,
/// `/./` becomes `/`, a leading `.` of `./` and a drive prefix are removed,
/// a leading `/` is guaranteed and one trailing `/` is dropped.
///
/// Doubled slashes are collapsed with two literal passes only, so runs of
/// three or four slashes both end up as `//`. URLs like `file://c:/temp`
/// are mangled for the same reason.
///
/// # Example
/// ```
/// use awtools::paths::normalize_path;
/// assert_eq!(normalize_path("C:\\test\\andre\\"), "/test/andre");
/// assert_eq!(normalize_path("test/ab/./ab/test.xml"), "/test/ab/ab/test.xml");
/// ```
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");

    normalized = normalized.replace("//", "/");
    normalized = normalized.replace("///", "/");
    normalized = normalized.replace("/./", "/");

    if normalized.starts_with("./") {
        normalized = normalized.replacen('.', "", 1);
    }

    if WINDOWS_ROOT_PATTERN.is_match(&normalized) {
        // Both characters of the match are ASCII
        normalized = normalized[2..].to_string();
    }

    if !normalized.starts_with(SEPARATOR) {
        normalized.insert(0, SEPARATOR);
    }

    if normalized.ends_with(SEPARATOR) {
        normalized.pop();
    }

    normalized
}

/// Counts the directory levels in front of the file name
///
/// The path does not need to exist. `./www/dir/dir1/index.html` yields 3,
/// a bare file name yields 0.
pub fn count_dir_level(file_name: &str) -> usize {
    normalize_path(file_name)
        .matches(SEPARATOR)
        .count()
        .saturating_sub(1)
}

/// Builds a relative path climbing `level` directories, e.g. `./../../`
pub fn path_to_root(level: usize) -> String {
    let mut path = String::from("./");
    for _ in 0..level {
        path.push_str(UP);
    }
    path
}

/// Builds the relative path from `file_name` back to its root
///
/// `test/winkler/andre.txt` yields `./../../`.
pub fn path_to_root_of(file_name: &str) -> String {
    path_to_root(count_dir_level(file_name))
}

/// Returns the directory part of a normalized path
///
/// `temp/ab/db/text.txt` yields `/temp/ab/db`. Unlike `Path::parent`
/// this treats `temp/test.txt` and `/temp/test.txt` as the same thing.
pub fn get_parent(file_name: &str) -> String {
    let normalized = normalize_path(file_name);
    match normalized.rfind(SEPARATOR) {
        Some(idx) => normalized[..idx].to_string(),
        None => String::new(),
    }
}

/// Strips every directory from a path
pub fn get_file_name(file_name: &str) -> String {
    let normalized = normalize_path(file_name);
    match normalized.rfind(SEPARATOR) {
        Some(idx) => normalized[idx + 1..].to_string(),
        None => normalized,
    }
}
