//! Recording files on disk
//!
//! One file per session. Filenames embed the start time so a plain
//! directory listing sorts chronologically; readers never parse them.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use super::codec;
use super::types::Session;
use crate::config::StorageConfig;
use crate::error::{AnchorError, Result, ResultExt};

/// Filename for a session started at `start`
///
/// e.g. `AnchorTransforms-2024-03-09T140500.123.json`
pub fn session_filename(prefix: &str, extension: &str, start: DateTime<Utc>) -> String {
    format!("{}-{}.{}", prefix, start.format("%Y-%m-%dT%H%M%S%.3f"), extension)
}

/// Encode and write a session into `dir`, returning the file path
///
/// The directory is created if needed. An existing file with the same name
/// is never overwritten; a numeric suffix is appended instead.
pub fn write_session(dir: &Path, session: &Session, config: &StorageConfig) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| AnchorError::storage(dir, e))?;

    let data = if config.pretty {
        codec::encode_pretty(session)?
    } else {
        codec::encode(session)?
    };

    let path = unique_path(dir, &config.file_prefix, &config.file_extension, session.start);
    std::fs::write(&path, data).map_err(|e| AnchorError::storage(&path, e))?;

    tracing::info!(
        "Saved session with {} frames to {:?}",
        session.frame_count(),
        path
    );
    Ok(path)
}

/// Read and decode a single session file
///
/// Unlike catalog reloads, failures here are returned to the caller.
pub fn read_session(path: &Path) -> Result<Session> {
    let data = std::fs::read(path).map_err(|e| AnchorError::storage(path, e))?;
    codec::decode(&data).with_context(|| format!("Failed to decode {:?}", path))
}

fn unique_path(dir: &Path, prefix: &str, extension: &str, start: DateTime<Utc>) -> PathBuf {
    let path = dir.join(session_filename(prefix, extension, start));
    if !path.exists() {
        return path;
    }
    let stem = format!("{}-{}", prefix, start.format("%Y-%m-%dT%H%M%S%.3f"));
    (1..)
        .map(|n| dir.join(format!("{}-{}.{}", stem, n, extension)))
        .find(|p| !p.exists())
        .unwrap_or(path)
}
