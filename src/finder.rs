use crate::logging::Logger;
use crate::paths::{normalize_path, SEPARATOR};
use std::path::{Path, PathBuf};

const LOG: Logger = Logger::new(module_path!());

/// Finds every file called `file_name` on the way from `base_path` down
/// to `relative_path`
///
/// Given
/// ```text
/// /temp/readme.txt
/// /temp/dir11/readme.txt
/// /temp/dir11/dir121/readme.txt
/// ```
/// a search for `readme.txt` along `dir11/dir121` below `/temp` returns all
/// three, shallowest first.
///
/// # Arguments
/// * `base_path` - Directory the search starts in
/// * `relative_path` - Directory path below `base_path`, any separator style
/// * `file_name` - Name of the file to look for
///
/// # Returns
/// The existing candidates in discovery order. Paths that cannot be
/// stat'ed count as missing.
pub fn find_files(base_path: &Path, relative_path: &str, file_name: &str) -> Vec<PathBuf> {
    let mut files_with_same_name = Vec::new();

    let file_in_base = base_path.join(file_name);
    if file_in_base.exists() {
        files_with_same_name.push(file_in_base);
    }

    let normalized = normalize_path(relative_path);
    let mut intermediate_dir = PathBuf::new();
    for segment in normalized.split(SEPARATOR).filter(|s| !s.is_empty()) {
        intermediate_dir.push(segment);

        let candidate = base_path.join(&intermediate_dir).join(file_name);
        if candidate.exists() {
            files_with_same_name.push(candidate);
        }
    }

    files_with_same_name
}

/// Same as [`find_files`], with directory and file name given as one
/// relative path such as `test/winkler/arbeit/findmy.txt`
///
/// Without a `/` the whole input is taken as the file name and only
/// `base_path` itself is probed.
pub fn find_files_by_path(base_path: &Path, file_name: &str) -> Vec<PathBuf> {
    let (relative_path, real_file_name) = match file_name.rfind(SEPARATOR) {
        Some(idx) => (&file_name[..idx], &file_name[idx + 1..]),
        None => ("", file_name),
    };

    if LOG.is_debug_enabled() {
        let _ = LOG.debug(&format!("basePath ......: {}", base_path.display()));
        let _ = LOG.debug(&format!("relativePath ..: {}", relative_path));
        let _ = LOG.debug(&format!("realFileName ..: {}", real_file_name));
    }

    find_files(base_path, relative_path, real_file_name)
}
