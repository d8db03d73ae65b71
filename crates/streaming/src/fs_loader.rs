use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use foundation::handles::Handle;
use gpu::engine::ModelHandle;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::loader::{AssetLoader, LoadError, LoadedModel};
use crate::protocol::HierarchyDescription;

/// Loads hierarchy descriptions stored as JSON files under a root directory.
///
/// Urls may be absolute paths, paths relative to the root, or `file://` urls.
#[derive(Debug)]
pub struct JsonFileLoader {
    root: PathBuf,
    next_model: AtomicU32,
}

impl JsonFileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            next_model: AtomicU32::new(0),
        }
    }

    pub fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl AssetLoader for JsonFileLoader {
    async fn load(&self, url: &str, cancel: CancelToken) -> Result<LoadedModel, LoadError> {
        let path = self.resolve(url);
        debug!(path = %path.display(), "reading hierarchy description");

        let payload = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound {
                    url: url.to_string(),
                }
            } else {
                LoadError::Io {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;
        if cancel.is_cancelled() {
            return Err(LoadError::Cancelled);
        }

        let hierarchy =
            HierarchyDescription::from_json_str(&payload).map_err(|e| LoadError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        let index = self.next_model.fetch_add(1, Ordering::Relaxed);
        Ok(LoadedModel {
            url: url.to_string(),
            model: ModelHandle(Handle::new(index, 0)),
            hierarchy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::JsonFileLoader;
    use crate::cancel::cancel_pair;
    use crate::loader::{AssetLoader, LoadError};

    #[tokio::test]
    async fn loads_relative_paths_and_mints_distinct_handles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("station.json"),
            r#"{"roots": ["hall"], "nodes": [{"id": "hall"}]}"#,
        )
        .unwrap();

        let loader = JsonFileLoader::new(dir.path());
        let (_h, token) = cancel_pair();
        let a = loader.load("station.json", token.clone()).await.unwrap();
        let b = loader.load("file://station.json", token).await.unwrap();
        assert_eq!(a.hierarchy.roots, vec!["hall"]);
        assert_ne!(a.model, b.model);
    }

    #[tokio::test]
    async fn maps_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let loader = JsonFileLoader::new(dir.path());
        let (_h, token) = cancel_pair();

        assert!(matches!(
            loader.load("missing.json", token.clone()).await,
            Err(LoadError::NotFound { .. })
        ));
        assert!(matches!(
            loader.load("bad.json", token).await,
            Err(LoadError::Decode { .. })
        ));
    }
}
