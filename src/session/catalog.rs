//! Catalog of recorded sessions in a folder
//!
//! Every file with the configured extension is decoded on its own. A file
//! that fails to read or decode is skipped and reported; it never hides the
//! other sessions. Filenames are not interpreted.

use std::path::{Path, PathBuf};

use super::storage;
use super::types::Session;
use crate::config::StorageConfig;
use crate::error::{AnchorError, Result};

/// A decoded session and the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub path: PathBuf,
    pub session: Session,
}

/// A file skipped during reload
#[derive(Debug)]
pub struct CatalogFailure {
    pub path: PathBuf,
    pub error: AnchorError,
}

/// Outcome of [`SessionCatalog::reload`]
#[derive(Debug, Default)]
pub struct ReloadReport {
    pub loaded: usize,
    pub failures: Vec<CatalogFailure>,
}

impl ReloadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Sessions found in a recordings folder, most recent first
#[derive(Debug)]
pub struct SessionCatalog {
    dir: PathBuf,
    extension: String,
    entries: Vec<CatalogEntry>,
}

impl SessionCatalog {
    /// Create an empty catalog over `dir`; call [`reload`](Self::reload) to populate
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            entries: Vec::new(),
        }
    }

    /// Catalog over the configured recordings folder
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Ok(Self::new(
            config.resolved_recordings_dir()?,
            config.file_extension.clone(),
        ))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Re-scan the folder, replacing the current listing
    ///
    /// A missing folder yields an empty listing. Only a folder that exists
    /// but cannot be listed is an error.
    pub fn reload(&mut self) -> Result<ReloadReport> {
        let mut report = ReloadReport::default();

        let read_dir = match std::fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Recordings folder {:?} does not exist", self.dir);
                self.entries.clear();
                return Ok(report);
            }
            Err(e) => return Err(AnchorError::storage(&self.dir, e)),
        };

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let path = match dir_entry {
                Ok(dir_entry) => dir_entry.path(),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {}", self.dir, e);
                    continue;
                }
            };
            if !self.matches_extension(&path) || !path.is_file() {
                continue;
            }

            match storage::read_session(&path) {
                Ok(session) => entries.push(CatalogEntry { path, session }),
                Err(error) => {
                    tracing::warn!("Skipping {:?}: {}", path, error);
                    report.failures.push(CatalogFailure { path, error });
                }
            }
        }

        entries.sort_by(|a, b| b.session.start.cmp(&a.session.start));
        report.loaded = entries.len();
        self.entries = entries;

        tracing::debug!(
            "Catalog reloaded from {:?}: {} sessions, {} skipped",
            self.dir,
            report.loaded,
            report.failures.len()
        );
        Ok(report)
    }

    /// Decode one explicitly requested file; errors are returned, not skipped
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Session> {
        storage::read_session(path.as_ref())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.entries.iter().map(|e| &e.session)
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::Frame;
    use chrono::{Duration, TimeZone, Utc};

    fn write(dir: &Path, start_offset_secs: i64) -> PathBuf {
        let start = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap() + Duration::seconds(start_offset_secs);
        let mut session = Session::new(start);
        session.frames.push(Frame::empty(0.0));
        storage::write_session(dir, &session, &StorageConfig::default()).unwrap()
    }

    #[test]
    fn test_sorted_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), 0);
        write(dir.path(), 120);
        write(dir.path(), 60);

        let mut catalog = SessionCatalog::new(dir.path(), "json");
        let report = catalog.reload().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.loaded, 3);

        let starts: Vec<_> = catalog.sessions().map(|s| s.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(starts, sorted);
    }

    #[test]
    fn test_corrupt_file_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), 0);
        write(dir.path(), 1);
        std::fs::write(dir.path().join("AnchorTransforms-bad.json"), b"{ nope").unwrap();

        let mut catalog = SessionCatalog::new(dir.path(), "json");
        let report = catalog.reload().unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].error.is_data_corrupt());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_other_extensions_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), 0);
        std::fs::write(dir.path().join("notes.txt"), b"not a session").unwrap();
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();

        let mut catalog = SessionCatalog::new(dir.path(), "json");
        let report = catalog.reload().unwrap();
        assert!(report.is_clean());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = SessionCatalog::new(dir.path().join("absent"), "json");
        let report = catalog.reload().unwrap();
        assert_eq!(report.loaded, 0);
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_reload_replaces_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), 0);
        let mut catalog = SessionCatalog::new(dir.path(), "json");
        catalog.reload().unwrap();
        assert_eq!(catalog.len(), 1);

        std::fs::remove_file(path).unwrap();
        catalog.reload().unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_explicit_load_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, b"").unwrap();

        let catalog = SessionCatalog::new(dir.path(), "json");
        assert!(catalog.load(&bad).unwrap_err().is_data_corrupt());
    }
}
