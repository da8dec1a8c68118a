//! Key-value storage abstraction for the persisted color records.

mod memory;

#[cfg(target_arch = "wasm32")]
mod chrome;

pub use memory::MemoryStore;

#[cfg(target_arch = "wasm32")]
pub use chrome::{ChromeStorage, decode_change_set};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage area the extension persists into and listens to.
pub const STORE_AREA: &str = "local";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A set of top-level keys and their JSON values.
pub type Record = serde_json::Map<String, Value>;

/// Old and new value of one key, as delivered by a change notification.
///
/// A missing `new_value` means the key was removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
}

/// All key changes from a single store mutation.
pub type ChangeSet = BTreeMap<String, StorageChange>;

/// Trait for key-value storage backends.
///
/// Change notifications are not part of this trait: each backend delivers
/// them through its own channel (an event listener in the browser, a
/// drainable queue for [`MemoryStore`]).
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait KeyValueStore: Send + Sync {
    /// Read the given keys. Keys with no stored value are absent from the result.
    fn get(&self, keys: &[&str]) -> BoxFuture<'_, StorageResult<Record>>;

    /// Write every key in `record`, replacing existing values.
    fn set(&self, record: Record) -> BoxFuture<'_, StorageResult<()>>;

    /// Delete the given keys.
    fn remove(&self, keys: &[&str]) -> BoxFuture<'_, StorageResult<()>>;
}

/// Trait for key-value storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait KeyValueStore {
    /// Read the given keys. Keys with no stored value are absent from the result.
    fn get(&self, keys: &[&str]) -> BoxFuture<'_, StorageResult<Record>>;

    /// Write every key in `record`, replacing existing values.
    fn set(&self, record: Record) -> BoxFuture<'_, StorageResult<()>>;

    /// Delete the given keys.
    fn remove(&self, keys: &[&str]) -> BoxFuture<'_, StorageResult<()>>;
}

#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, Waker};

    let mut cx = Context::from_waker(Waker::noop());
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
