//! Local persistent store boundary (the data the app kept before the cloud
//! database existed). This crate only reads it, plus an explicit removal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("namespace {namespace} is not a JSON array: {reason}")]
    Corrupt { namespace: String, reason: String },
    #[error("invalid namespace {0:?}")]
    InvalidNamespace(String),
    #[error("local store unavailable: {0}")]
    Unavailable(String),
}

pub trait LocalStore: Send + Sync {
    /// Every record stored under `namespace`; empty when nothing was saved.
    fn read_all(&self, namespace: &str) -> Result<Vec<Value>, LocalStoreError>;

    /// Drop everything stored under `namespace`.
    fn remove(&self, namespace: &str) -> Result<(), LocalStoreError>;
}

impl<S> LocalStore for Arc<S>
where
    S: LocalStore + ?Sized,
{
    fn read_all(&self, namespace: &str) -> Result<Vec<Value>, LocalStoreError> {
        (**self).read_all(namespace)
    }

    fn remove(&self, namespace: &str) -> Result<(), LocalStoreError> {
        (**self).remove(namespace)
    }
}

fn parse_namespace(namespace: &str, raw: &str) -> Result<Vec<Value>, LocalStoreError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(Value::Null) => Ok(Vec::new()),
        Ok(other) => Err(LocalStoreError::Corrupt {
            namespace: namespace.to_string(),
            reason: format!("found {}", kind(&other)),
        }),
        Err(e) => Err(LocalStoreError::Corrupt {
            namespace: namespace.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One `<namespace>.json` file (a JSON array) per namespace.
#[derive(Debug, Clone)]
pub struct JsonFileLocalStore {
    dir: PathBuf,
}

impl JsonFileLocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, namespace: &str) -> Result<PathBuf, LocalStoreError> {
        let valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(LocalStoreError::InvalidNamespace(namespace.to_string()));
        }
        Ok(self.dir.join(format!("{namespace}.json")))
    }
}

impl LocalStore for JsonFileLocalStore {
    fn read_all(&self, namespace: &str) -> Result<Vec<Value>, LocalStoreError> {
        let path = self.path_for(namespace)?;
        match std::fs::read_to_string(&path) {
            Ok(raw) => parse_namespace(namespace, &raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(LocalStoreError::Io { path, source }),
        }
    }

    fn remove(&self, namespace: &str) -> Result<(), LocalStoreError> {
        let path = self.path_for(namespace)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(LocalStoreError::Io { path, source }),
        }
    }
}

/// In-memory local store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryLocalStore {
    namespaces: RwLock<HashMap<String, Vec<Value>>>,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a namespace (stands in for the app writing its own data).
    pub fn with_namespace(self, namespace: impl Into<String>, records: Vec<Value>) -> Self {
        if let Ok(mut map) = self.namespaces.write() {
            map.insert(namespace.into(), records);
        }
        self
    }
}

impl LocalStore for InMemoryLocalStore {
    fn read_all(&self, namespace: &str) -> Result<Vec<Value>, LocalStoreError> {
        let map = self
            .namespaces
            .read()
            .map_err(|_| LocalStoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(map.get(namespace).cloned().unwrap_or_default())
    }

    fn remove(&self, namespace: &str) -> Result<(), LocalStoreError> {
        let mut map = self
            .namespaces
            .write()
            .map_err(|_| LocalStoreError::Unavailable("lock poisoned".to_string()))?;
        map.remove(namespace);
        Ok(())
    }
}
