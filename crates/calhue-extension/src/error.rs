//! Shell errors.

use calhue_core::{LibraryError, StorageError};
use thiserror::Error;

/// Errors surfaced to JavaScript callers.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("No window available")]
    NoWindow,
    #[error("No document available")]
    NoDocument,
    #[error("Content script already started")]
    AlreadyStarted,
    #[error("Invalid config: {0}")]
    Config(String),
    #[error("Invalid text color {0:?}, expected \"black\" or \"white\"")]
    InvalidTextColor(String),
    #[error("JavaScript error: {0}")]
    Js(String),
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;

#[cfg(target_arch = "wasm32")]
impl From<ShellError> for wasm_bindgen::JsValue {
    fn from(e: ShellError) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}
