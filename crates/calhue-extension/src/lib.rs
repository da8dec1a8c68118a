//! Calhue Extension
//!
//! Browser shell around the core engine: the content script that runs on the
//! calendar page and the color library operations used by the settings
//! popup.

mod error;
pub mod settings;

pub use error::{ShellError, ShellResult};
pub use settings::ColorEntry;

#[cfg(target_arch = "wasm32")]
mod content;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{init, start_content_script};
