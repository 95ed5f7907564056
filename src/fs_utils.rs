use crate::config::Settings;
use crate::logging::Logger;
use once_cell::sync::Lazy;
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use std::fs;
use std::io::{self, Error, ErrorKind};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

const LOG: Logger = Logger::new(module_path!());

/// Attempts to find an unused temp directory name
const MAX_TEMP_DIR_ATTEMPTS: usize = 9;

/// Length of the random part of a temp directory name
const TEMP_DIR_NAME_LEN: usize = 32;

static URL_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Za-z][A-Za-z0-9+.-]*:").expect("URL scheme pattern is valid"));

/// Creates the directories below `base_path` needed to store
/// `relative_file_name`
///
/// The last segment is the file itself and is never created, so
/// `www/web.xml` only creates `www`. The separator is taken from the input,
/// backslash first, then slash. Input without any separator needs no
/// directory and is a no-op.
///
/// Concurrent calls for overlapping paths are not coordinated.
///
/// # Errors
/// Whatever `fs::create_dir_all` reports for a missing directory.
pub fn create_file_path(base_path: &str, relative_file_name: &str) -> io::Result<()> {
    if relative_file_name.contains('\\') {
        create_file_path_with(base_path, relative_file_name, '\\')
    } else if relative_file_name.contains('/') {
        create_file_path_with(base_path, relative_file_name, '/')
    } else {
        let _ = LOG.debug("Directory creation not necessary!");
        Ok(())
    }
}

fn create_file_path_with(base_path: &str, relative_file_name: &str, separator: char) -> io::Result<()> {
    let mut path = String::from(base_path);

    let segments: Vec<&str> = relative_file_name
        .split(separator)
        .filter(|s| !s.is_empty())
        .collect();

    // The last segment names the file
    let dir_count = segments.len().saturating_sub(1);
    for segment in &segments[..dir_count] {
        if !path.ends_with('/') && !path.ends_with('\\') {
            path.push(MAIN_SEPARATOR);
        }
        path.push_str(segment);

        let new_dir = Path::new(&path);
        if !new_dir.exists() {
            let _ = LOG.debug(&format!("mkdir {}", path));
            fs::create_dir_all(new_dir)?;
        }
    }

    Ok(())
}

/// Returns true if `dir` names an existing directory; blank input is never one
pub fn is_directory(dir: &str) -> bool {
    if dir.trim().is_empty() {
        return false;
    }
    Path::new(dir).is_dir()
}

/// Builds a `file:` URL for `file_name` inside `dir_name`
///
/// # Returns
/// The URL, or None if the result is not a valid URL.
pub fn create_url(dir_name: &str, file_name: &str) -> Option<String> {
    create_file_url(&format!("file:{}{}{}", dir_name, MAIN_SEPARATOR, file_name))
}

/// Checks that `url` carries a URL scheme and returns it unchanged
///
/// # Returns
/// The URL, or None if no scheme was found.
pub fn create_file_url(url: &str) -> Option<String> {
    if URL_SCHEME.is_match(url) {
        Some(url.to_string())
    } else {
        let _ = LOG.debug(&format!("Malformed URL (no scheme): {}", url));
        None
    }
}

/// Creates a fresh, uniquely named directory below the temp root
///
/// The root is $AWTOOLS_TMPDIR or the system temp directory, see
/// [`Settings::temp_root`]. Remove the directory with [`recursive_delete`].
///
/// # Errors
/// - No unused name found after several attempts
/// - The directory could not be created
pub fn create_temp_dir() -> io::Result<PathBuf> {
    create_temp_dir_in(&Settings::default().temp_root())
}

/// Like [`create_temp_dir`], below `parent`
pub fn create_temp_dir_in(parent: &Path) -> io::Result<PathBuf> {
    let mut rng = rand::thread_rng();

    for _ in 0..MAX_TEMP_DIR_ATTEMPTS {
        let dir_name: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(TEMP_DIR_NAME_LEN)
            .map(char::from)
            .collect();
        let candidate = parent.join(dir_name);
        if candidate.exists() {
            continue;
        }

        return fs::create_dir_all(&candidate)
            .map(|_| candidate.clone())
            .map_err(|e| {
                Error::new(
                    e.kind(),
                    format!("Failed to create temp dir named {}: {}", candidate.display(), e),
                )
            });
    }

    Err(Error::new(
        ErrorKind::AlreadyExists,
        format!(
            "Failed to create a unique temporary directory after {} attempts",
            MAX_TEMP_DIR_ATTEMPTS
        ),
    ))
}

/// Deletes a file, or a directory with everything below it
///
/// # Returns
/// true when the path is gone afterwards, false if any entry could not
/// be removed.
pub fn recursive_delete(file_or_dir: &Path) -> bool {
    if file_or_dir.is_dir() {
        let entries = match fs::read_dir(file_or_dir) {
            Ok(entries) => entries,
            Err(e) => {
                let _ = LOG.debug(&format!("Cannot list {}: {}", file_or_dir.display(), e));
                return false;
            }
        };
        for entry in entries {
            let inner = match entry {
                Ok(entry) => entry.path(),
                Err(_) => return false,
            };
            if !delete_quietly(&inner) {
                return false;
            }
        }
    }

    delete_quietly(file_or_dir)
}

fn delete_quietly(path: &Path) -> bool {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(_) => return false,
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            let _ = LOG.debug(&format!("Cannot delete {}: {}", path.display(), e));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    const TEST_DIR: &str = "test/winkler/arbeit";

    #[test]
    fn test_create_file_path() {
        let dir = tempdir().unwrap();
        let base = dir.path().to_str().unwrap();

        create_file_path(base, &format!("{}/test.txt", TEST_DIR)).unwrap();

        let created = dir.path().join(TEST_DIR);
        assert!(created.is_dir());
        assert!(!created.join("test.txt").exists());
    }

    #[test]
    fn test_create_file_path_backslash_wins() {
        let dir = tempdir().unwrap();
        let base = dir.path().to_str().unwrap();

        create_file_path(base, "one\\two\\file.txt").unwrap();

        assert!(dir.path().join("one").join("two").is_dir());
        assert!(!dir.path().join("one").join("two").join("file.txt").exists());
    }

    #[test]
    fn test_create_file_path_base_with_trailing_separator() {
        let dir = tempdir().unwrap();
        let base = format!("{}/", dir.path().display());

        create_file_path(&base, "www/web.xml").unwrap();

        assert!(dir.path().join("www").is_dir());
        assert!(!dir.path().join("www").join("web.xml").exists());
    }

    #[test]
    fn test_create_file_path_without_separator_is_noop() {
        let dir = tempdir().unwrap();
        let base = dir.path().to_str().unwrap();

        create_file_path(base, "web.xml").unwrap();

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_create_file_path_existing_dirs() {
        let dir = tempdir().unwrap();
        let base = dir.path().to_str().unwrap();

        create_file_path(base, "a/b/c.txt").unwrap();
        create_file_path(base, "a/b/d.txt").unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[test]
    fn test_create_file_path_concurrent_overlapping() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        let dir = tempdir().unwrap();
        let base = dir.path().to_str().unwrap().to_string();
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = ["shared/one/a.txt", "shared/one/two/b.txt"]
            .into_iter()
            .map(|relative| {
                let base = base.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    create_file_path(&base, relative)
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert!(dir.path().join("shared/one/two").is_dir());
    }

    #[test]
    fn test_is_directory() {
        let dir = tempdir().unwrap();
        assert!(is_directory(dir.path().to_str().unwrap()));
        assert!(!is_directory(""));
        assert!(!is_directory("   "));

        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        assert!(!is_directory(file.to_str().unwrap()));
    }

    #[test]
    fn test_create_url() {
        let url = create_url("/tmp", "a.txt").unwrap();
        assert!(url.starts_with("file:/tmp"));
        assert!(url.ends_with("a.txt"));

        assert_eq!(create_file_url("http://example.org/x"), Some("http://example.org/x".to_string()));
        assert_eq!(create_file_url("no scheme here"), None);
        assert_eq!(create_file_url("/just/a/path"), None);
    }

    #[test]
    fn test_create_temp_dir_and_recursive_delete() {
        let parent = tempdir().unwrap();
        let temp_dir = create_temp_dir_in(parent.path()).unwrap();
        assert!(temp_dir.is_dir());

        fs::create_dir_all(temp_dir.join("sub/deeper")).unwrap();
        fs::write(temp_dir.join("sub/deeper/file.txt"), "x").unwrap();
        fs::write(temp_dir.join("top.txt"), "y").unwrap();

        assert!(recursive_delete(&temp_dir));
        assert!(!temp_dir.exists());
    }

    #[test]
    #[serial]
    fn test_create_temp_dir_system() {
        let temp_dir = create_temp_dir().unwrap();
        assert!(temp_dir.exists());
        assert!(recursive_delete(&temp_dir));
        assert!(!temp_dir.exists());
    }

    #[test]
    fn test_recursive_delete_single_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("single.txt");
        fs::write(&file, "x").unwrap();

        assert!(recursive_delete(&file));
        assert!(!file.exists());
    }

    #[test]
    fn test_recursive_delete_missing_path() {
        let dir = tempdir().unwrap();
        assert!(!recursive_delete(&dir.path().join("missing")));
    }
}
