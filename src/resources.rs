//! Resource lookup
//!
//! Resources are plain files found below an ordered list of root
//! directories; the first root containing the name wins.

use crate::config::Settings;
use std::fs::{self, File};
use std::io::{self, Error, ErrorKind};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceLoader {
    roots: Vec<PathBuf>,
}

impl ResourceLoader {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        ResourceLoader { roots }
    }

    /// Loader over $AWTOOLS_RESOURCE_PATH and the configured directories
    pub fn from_settings(settings: &Settings) -> Self {
        ResourceLoader::new(settings.resource_roots())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// First existing file named `resource` below any root
    ///
    /// A leading `/` is ignored, `/conf/app.properties` and
    /// `conf/app.properties` name the same resource.
    pub fn resolve(&self, resource: &str) -> Option<PathBuf> {
        let relative = Path::new(resource.trim_start_matches('/'));
        self.roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.is_file())
    }

    /// Opens a resource; None when it does not exist or cannot be opened
    pub fn open(&self, resource: &str) -> Option<File> {
        self.resolve(resource).and_then(|path| File::open(path).ok())
    }

    pub fn read_bytes(&self, resource: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve_or_not_found(resource)?)
    }

    pub fn read_to_string(&self, resource: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve_or_not_found(resource)?)
    }

    fn resolve_or_not_found(&self, resource: &str) -> io::Result<PathBuf> {
        self.resolve(resource).ok_or_else(|| {
            Error::new(
                ErrorKind::NotFound,
                format!("resource '{}' not found in {:?}", resource, self.roots),
            )
        })
    }
}
