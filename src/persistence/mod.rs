//! File persistence for settings and the high score table
//!
//! Features:
//! - Data directory resolution (`DEMON_BLASTER_DATA`, else the working directory)
//! - Atomic writes (tmp → save, old save → backup)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::highscores::RecordError;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "DEMON_BLASTER_DATA";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} is not a valid record: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: RecordError,
    },
}

impl PersistError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True if the file simply does not exist yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Directory holding settings and scores
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn read(path: &Path) -> Result<Vec<u8>, PersistError> {
    fs::read(path).map_err(|e| PersistError::io(path, e))
}

/// Write `bytes` to `path` without ever leaving a half-written file
///
/// The data goes to `<path>.tmp` first; the previous file, if any, is kept as
/// `<path>.bak` before the rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
    }

    let tmp = with_suffix(path, "tmp");
    fs::write(&tmp, bytes).map_err(|e| PersistError::io(&tmp, e))?;

    if path.exists() {
        let backup = with_suffix(path, "bak");
        if let Err(e) = fs::copy(path, &backup) {
            log::warn!("Could not back up {}: {e}", path.display());
        }
    }

    fs::rename(&tmp, path).map_err(|e| PersistError::io(path, e))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("demon-blaster-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_atomic_write_keeps_backup() {
        let path = scratch("persist.bin");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(read(&path).unwrap(), b"two");
        assert_eq!(fs::read(with_suffix(&path, "bak")).unwrap(), b"one");
        assert!(!with_suffix(&path, "tmp").exists());
        fs::remove_file(&path).ok();
        fs::remove_file(with_suffix(&path, "bak")).ok();
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = read(&scratch("does-not-exist")).unwrap_err();
        assert!(err.is_not_found());
    }
}
