use view_core::{KeyValueStore, ViewError, ViewResult};
use web_sys::Storage;

use crate::dom::js_error;

/// `localStorage`, when the browser grants it.
pub struct WebStorage {
    storage: Option<Storage>,
}

impl WebStorage {
    /// Private browsing or blocked storage yields an empty, read-only store.
    pub fn local() -> Self {
        let storage = web_sys::window().and_then(|w| match w.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                tracing::warn!(error = %js_error(err), "localStorage unavailable");
                None
            }
        });
        Self { storage }
    }

    fn require(&self) -> ViewResult<&Storage> {
        self.storage
            .as_ref()
            .ok_or_else(|| ViewError::Storage("localStorage unavailable".into()))
    }
}

impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> ViewResult<()> {
        self.require()?
            .set_item(key, value)
            .map_err(|e| ViewError::Storage(js_error(e)))
    }

    fn remove(&mut self, key: &str) -> ViewResult<()> {
        self.require()?
            .remove_item(key)
            .map_err(|e| ViewError::Storage(js_error(e)))
    }
}
