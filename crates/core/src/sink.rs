//! Output file boundary: "save these bytes under this name".
//!
//! Export and print paths only ever talk to a `FileSink`. Whether that ends
//! up as a browser download, a desktop save or an in-memory buffer is the
//! implementation's business.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Where a saved file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub file_name: String,
    /// Filesystem path, or `memory:<name>` for in-memory sinks.
    pub location: String,
    pub size: usize,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Save bytes as a named file.
pub trait FileSink: Send + Sync {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<SavedFile, SinkError>;
}

impl<S> FileSink for Arc<S>
where
    S: FileSink + ?Sized,
{
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<SavedFile, SinkError> {
        (**self).save(file_name, bytes)
    }
}

fn validate_name(file_name: &str) -> Result<(), SinkError> {
    let bad = file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\', '\0']);
    if bad {
        return Err(SinkError::InvalidName(file_name.to_string()));
    }
    Ok(())
}

/// Writes files into a directory (created on first save).
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<SavedFile, SinkError> {
        validate_name(file_name)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| SinkError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes).map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("saved {} bytes to {:?}", bytes.len(), path);
        Ok(SavedFile {
            file_name: file_name.to_string(),
            location: path.to_string_lossy().into_owned(),
            size: bytes.len(),
        })
    }
}

/// Keeps saved files in memory, in save order.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: RwLock<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of saved files, in save order.
    pub fn file_names(&self) -> Vec<String> {
        match self.files.read() {
            Ok(files) => files.iter().map(|(name, _)| name.clone()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Bytes of the most recent file saved under `file_name`.
    pub fn get(&self, file_name: &str) -> Option<Vec<u8>> {
        let files = self.files.read().ok()?;
        files
            .iter()
            .rev()
            .find(|(name, _)| name == file_name)
            .map(|(_, bytes)| bytes.clone())
    }

    pub fn len(&self) -> usize {
        self.files.read().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FileSink for MemorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<SavedFile, SinkError> {
        validate_name(file_name)?;
        let mut files = self
            .files
            .write()
            .map_err(|_| SinkError::Unavailable("lock poisoned".to_string()))?;
        files.push((file_name.to_string(), bytes.to_vec()));
        Ok(SavedFile {
            file_name: file_name.to_string(),
            location: format!("memory:{file_name}"),
            size: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_sink_creates_dir_and_writes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path().join("exports"));

        let saved = sink.save("report.csv", b"a,b").unwrap();
        assert_eq!(saved.size, 3);
        assert_eq!(std::fs::read(&saved.location).unwrap(), b"a,b");
    }

    #[test]
    fn path_separators_are_rejected() {
        let sink = MemorySink::new();
        assert!(matches!(
            sink.save("../escape.pdf", b"x"),
            Err(SinkError::InvalidName(_))
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn memory_sink_returns_latest_bytes_for_name() {
        let sink = MemorySink::new();
        sink.save("a.txt", b"one").unwrap();
        sink.save("a.txt", b"two").unwrap();
        assert_eq!(sink.get("a.txt").unwrap(), b"two");
        assert_eq!(sink.file_names(), vec!["a.txt", "a.txt"]);
    }
}
