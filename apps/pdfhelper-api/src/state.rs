//! Shared application state

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::storage::TempStore;

/// Immutable per-process configuration handed to every handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    store: TempStore,
    ghostscript: Option<PathBuf>,
    compress_timeout: Duration,
}

impl AppState {
    pub fn new(store: TempStore, ghostscript: Option<PathBuf>, compress_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                ghostscript,
                compress_timeout,
            }),
        }
    }

    pub fn store(&self) -> &TempStore {
        &self.inner.store
    }

    pub fn ghostscript(&self) -> Option<&PathBuf> {
        self.inner.ghostscript.as_ref()
    }

    pub fn compress_timeout(&self) -> Duration {
        self.inner.compress_timeout
    }
}
