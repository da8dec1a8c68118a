//! `chrome.storage.local` backend for WebAssembly.
//!
//! Uses the promise-returning form of the extension storage API, which is
//! shared between the content script and the settings popup.

use super::{BoxFuture, ChangeSet, KeyValueStore, Record, STORE_AREA, StorageError, StorageResult};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    fn local_get(keys: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
    fn local_set(items: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = remove)]
    fn local_remove(keys: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "onChanged"], js_name = addListener)]
    fn on_changed_add_listener(callback: &js_sys::Function) -> Result<(), JsValue>;
}

/// Extension storage in the `local` area.
///
/// Note: This is intentionally not Send/Sync since WASM is single-threaded.
#[derive(Debug, Default)]
pub struct ChromeStorage;

impl ChromeStorage {
    pub fn new() -> Self {
        Self
    }

    /// Register `callback` for every change in the `local` area, whichever
    /// extension context made it.
    pub fn subscribe(&self, mut callback: impl FnMut(ChangeSet) + 'static) -> StorageResult<()> {
        let listener = Closure::wrap(Box::new(move |changes: JsValue, area: JsValue| {
            if area.as_string().as_deref() != Some(STORE_AREA) {
                return;
            }
            match decode_change_set(changes) {
                Ok(change_set) => callback(change_set),
                Err(e) => log::error!("Dropping storage change notification: {}", e),
            }
        }) as Box<dyn FnMut(JsValue, JsValue)>);

        on_changed_add_listener(listener.as_ref().unchecked_ref())
            .map_err(|e| StorageError::Backend(format!("addListener failed: {:?}", e)))?;
        listener.forget(); // Lives as long as the page
        Ok(())
    }
}

/// Convert a `{key: {newValue, oldValue}}` object into a [`ChangeSet`].
pub fn decode_change_set(changes: JsValue) -> StorageResult<ChangeSet> {
    serde_wasm_bindgen::from_value(changes)
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

fn keys_to_js(keys: &[&str]) -> JsValue {
    keys.iter()
        .map(|k| JsValue::from_str(k))
        .collect::<js_sys::Array>()
        .into()
}

async fn await_promise(promise: Result<js_sys::Promise, JsValue>, what: &str) -> StorageResult<JsValue> {
    let promise = promise.map_err(|e| StorageError::Backend(format!("{} failed: {:?}", what, e)))?;
    JsFuture::from(promise)
        .await
        .map_err(|e| StorageError::Backend(format!("{} rejected: {:?}", what, e)))
}

impl KeyValueStore for ChromeStorage {
    fn get(&self, keys: &[&str]) -> BoxFuture<'_, StorageResult<Record>> {
        let keys = keys_to_js(keys);
        Box::pin(async move {
            let result = await_promise(local_get(&keys), "storage.local.get").await?;
            if result.is_undefined() || result.is_null() {
                return Ok(Record::new());
            }
            serde_wasm_bindgen::from_value(result)
                .map_err(|e| StorageError::Serialization(e.to_string()))
        })
    }

    fn set(&self, record: Record) -> BoxFuture<'_, StorageResult<()>> {
        // Plain objects rather than JS Maps, so the host API stores them as JSON.
        let items = record.serialize(&serde_wasm_bindgen::Serializer::json_compatible());
        Box::pin(async move {
            let items = items.map_err(|e| StorageError::Serialization(e.to_string()))?;
            await_promise(local_set(&items), "storage.local.set").await?;
            Ok(())
        })
    }

    fn remove(&self, keys: &[&str]) -> BoxFuture<'_, StorageResult<()>> {
        let keys = keys_to_js(keys);
        Box::pin(async move {
            await_promise(local_remove(&keys), "storage.local.remove").await?;
            Ok(())
        })
    }
}
