use tracing::debug;

use crate::cancel::{CancelHandle, CancelToken, cancel_pair};
use crate::request::LoadRequest;

/// A load that has been issued but not yet completed.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    pub request: LoadRequest,
    pub url: String,
    pub cancel: CancelToken,
}

#[derive(Debug)]
struct InFlight {
    request: LoadRequest,
    url: String,
    cancel: CancelHandle,
}

/// Last-request-wins bookkeeping for model loads.
///
/// At most one request is current. Beginning a new load cancels the previous
/// one; results for anything but the current request are stale.
#[derive(Debug, Default)]
pub struct LoadTracker {
    next: u64,
    current: Option<InFlight>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, url: impl Into<String>) -> PendingLoad {
        let url = url.into();
        let request = LoadRequest(self.next);
        self.next += 1;

        if let Some(prev) = self.current.take() {
            debug!(superseded = %prev.request, url = %prev.url, "cancelling superseded load");
            prev.cancel.cancel();
        }

        let (cancel, token) = cancel_pair();
        self.current = Some(InFlight {
            request,
            url: url.clone(),
            cancel,
        });
        PendingLoad {
            request,
            url,
            cancel: token,
        }
    }

    pub fn in_flight(&self) -> Option<LoadRequest> {
        self.current.as_ref().map(|c| c.request)
    }

    pub fn in_flight_url(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.url.as_str())
    }

    pub fn is_current(&self, request: LoadRequest) -> bool {
        self.in_flight() == Some(request)
    }

    /// Mark `request` finished. Returns `false` if it was not current.
    pub fn complete(&mut self, request: LoadRequest) -> bool {
        if !self.is_current(request) {
            return false;
        }
        self.current = None;
        true
    }

    /// Cancel the in-flight load, if any.
    pub fn cancel(&mut self) -> Option<LoadRequest> {
        let prev = self.current.take()?;
        prev.cancel.cancel();
        Some(prev.request)
    }
}
