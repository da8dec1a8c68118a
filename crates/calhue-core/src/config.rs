//! Engine configuration.

use crate::markup::HostMarkup;
use serde::{Deserialize, Serialize};

/// Default id of the injected `<style>` element.
pub const DEFAULT_STYLESHEET_ID: &str = "custom-event-colors";

/// Default interval for polling the page URL, in milliseconds.
pub const DEFAULT_NAV_POLL_INTERVAL_MS: u32 = 1000;

/// Swatches per row when the host grid does not say.
pub const DEFAULT_SWATCHES_PER_ROW: usize = 6;

/// Settings for the content-script engine.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Host markup the engine matches against.
    pub markup: HostMarkup,
    /// Id of the injected `<style>` element.
    pub stylesheet_id: String,
    /// How often the page URL is polled for client-side navigation.
    pub nav_poll_interval_ms: u32,
    /// Row width used when the host grid does not advertise one.
    pub swatches_per_row_fallback: usize,
    /// Console log level (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            markup: HostMarkup::default(),
            stylesheet_id: DEFAULT_STYLESHEET_ID.to_string(),
            nav_poll_interval_ms: DEFAULT_NAV_POLL_INTERVAL_MS,
            swatches_per_row_fallback: DEFAULT_SWATCHES_PER_ROW,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parsed log level, falling back to `Info` for unknown names.
    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}
