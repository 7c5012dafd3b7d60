//! Raw byte access for ticket assets.
//!
//! A `ResourceProvider` resolves a path to bytes. Decoding and caching
//! happen one level up, in the asset loader.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to load resource '{path}': {message}")]
    LoadFailed { path: String, message: String },

    /// The asset did not arrive within its load window. The pipeline treats
    /// this as a missing asset, never as a failed page.
    #[error("Timed out after {millis} ms waiting for '{path}'")]
    Timeout { path: String, millis: u64 },

    #[error("Could not decode '{path}': {message}")]
    Decode { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl ResourceError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ResourceError::Timeout { .. })
    }
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

pub type SharedResourceData = Arc<Vec<u8>>;

/// Loads asset bytes from some backing store.
pub trait ResourceProvider: Send + Sync + Debug {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError>;

    fn name(&self) -> &'static str;
}

/// A provider backed by a map; used by tests and by callers that already
/// hold the asset bytes.
#[derive(Debug, Default)]
pub struct InMemoryResourceProvider {
    resources: RwLock<HashMap<String, SharedResourceData>>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a fixed set of entries.
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u8>)>,
        K: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), Arc::new(v)))
            .collect();
        Self {
            resources: RwLock::new(map),
        }
    }

    /// # Errors
    ///
    /// Returns `ResourceError::LoadFailed` if the store lock is poisoned.
    pub fn add(&self, path: impl Into<String>, data: Vec<u8>) -> Result<(), ResourceError> {
        let path = path.into();
        let mut resources = self.resources.write().map_err(|_| ResourceError::LoadFailed {
            path: path.clone(),
            message: "resource store lock poisoned".to_string(),
        })?;
        resources.insert(path, Arc::new(data));
        Ok(())
    }

    pub fn remove(&self, path: &str) -> Option<SharedResourceData> {
        self.resources.write().ok()?.remove(path)
    }

    pub fn len(&self) -> usize {
        self.resources.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResourceProvider for InMemoryResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let resources = self.resources.read().map_err(|_| ResourceError::LoadFailed {
            path: path.to_string(),
            message: "resource store lock poisoned".to_string(),
        })?;
        resources
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_string()))
    }

    fn name(&self) -> &'static str {
        "InMemoryResourceProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_provider_add_and_load() {
        let provider = InMemoryResourceProvider::new();
        provider.add("bg.png", b"png".to_vec()).unwrap();

        assert_eq!(&*provider.load("bg.png").unwrap(), b"png");
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn test_in_memory_provider_not_found() {
        let provider = InMemoryResourceProvider::with_entries([("a", vec![1])]);
        assert!(matches!(provider.load("b"), Err(ResourceError::NotFound(_))));
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn test_in_memory_provider_remove() {
        let provider = InMemoryResourceProvider::with_entries([("qr.png", vec![7])]);
        assert_eq!(&*provider.remove("qr.png").unwrap(), &[7]);
        assert!(provider.is_empty());
        assert!(provider.remove("qr.png").is_none());
    }

    #[test]
    fn test_timeout_is_distinguishable() {
        let err = ResourceError::Timeout {
            path: "slow.jpg".into(),
            millis: 10_000,
        };
        assert!(err.is_timeout());
        assert!(err.to_string().contains("10000 ms"));
        assert!(!ResourceError::NotFound("x".into()).is_timeout());
    }

    #[test]
    fn test_resource_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ResourceError = io_err.into();
        assert!(matches!(err, ResourceError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }
}
