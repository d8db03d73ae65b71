use std::future::Future;
use std::time::Duration;

use gpu::engine::ModelHandle;

use crate::cancel::CancelToken;
use crate::protocol::HierarchyDescription;

/// Result of a successful load: the model root plus its hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub url: String,
    pub model: ModelHandle,
    pub hierarchy: HierarchyDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("model not found: {url}")]
    NotFound { url: String },
    #[error("failed to read {url}: {message}")]
    Io { url: String, message: String },
    #[error("failed to decode {url}: {message}")]
    Decode { url: String, message: String },
    #[error("model load timed out after {0:?}")]
    Timeout(Duration),
    #[error("model load cancelled")]
    Cancelled,
}

/// Resolves a model url into a model handle and hierarchy.
///
/// Implementations should return [`LoadError::Cancelled`] promptly once
/// `cancel` fires; [`load_with_deadline`] also races the token.
pub trait AssetLoader {
    fn load(
        &self,
        url: &str,
        cancel: CancelToken,
    ) -> impl Future<Output = Result<LoadedModel, LoadError>>;
}

/// Run `loader` for `url`, giving up on cancellation or after `timeout`.
pub async fn load_with_deadline<L: AssetLoader + ?Sized>(
    loader: &L,
    url: &str,
    cancel: CancelToken,
    timeout: Duration,
) -> Result<LoadedModel, LoadError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LoadError::Cancelled),
        res = tokio::time::timeout(timeout, loader.load(url, cancel.clone())) => {
            res.unwrap_or(Err(LoadError::Timeout(timeout)))
        }
    }
}
