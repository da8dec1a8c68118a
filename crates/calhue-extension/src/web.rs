//! WebAssembly entry points.

use crate::content::ContentScript;
use crate::error::ShellError;
use crate::settings;
use calhue_core::EngineConfig;
use calhue_core::storage::ChromeStorage;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Module initialization: panic hook and console logger.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(EngineConfig::default().log_level()) {
        web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Start the content script. `config` is an optional partial
/// [`EngineConfig`] object.
#[wasm_bindgen(js_name = startContentScript)]
pub fn start_content_script(config: JsValue) -> Result<(), JsValue> {
    let config: EngineConfig = if config.is_undefined() || config.is_null() {
        EngineConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| ShellError::Config(e.to_string()))?
    };
    log::set_max_level(config.log_level().to_level_filter());

    ContentScript::start(config)?;
    Ok(())
}

#[wasm_bindgen(js_name = addCustomColor)]
pub async fn add_custom_color(name: String, hex: String, text_color: Option<String>) -> Result<(), JsValue> {
    settings::add_custom_color(&ChromeStorage::new(), &name, &hex, text_color.as_deref()).await?;
    Ok(())
}

#[wasm_bindgen(js_name = removeCustomColor)]
pub async fn remove_custom_color(name: String) -> Result<(), JsValue> {
    settings::remove_custom_color(&ChromeStorage::new(), &name).await?;
    Ok(())
}

/// `[{name, hex, textColor}]` in display order.
#[wasm_bindgen(js_name = listCustomColors)]
pub async fn list_custom_colors() -> Result<JsValue, JsValue> {
    let colors = settings::list_custom_colors(&ChromeStorage::new()).await?;
    to_js(&colors)
}

#[wasm_bindgen(js_name = clearCustomColors)]
pub async fn clear_custom_colors() -> Result<(), JsValue> {
    settings::clear_custom_colors(&ChromeStorage::new()).await?;
    Ok(())
}

#[cfg(feature = "debug-colors")]
#[wasm_bindgen(js_name = addRandomColors)]
pub async fn add_random_colors(count: u32) -> Result<JsValue, JsValue> {
    let names = settings::add_random_colors(&ChromeStorage::new(), count as usize).await?;
    to_js(&names)
}

#[cfg(feature = "debug-colors")]
#[wasm_bindgen(js_name = replaceWithRandomColors)]
pub async fn replace_with_random_colors(count: u32) -> Result<JsValue, JsValue> {
    let names = settings::replace_with_random_colors(&ChromeStorage::new(), count as usize).await?;
    to_js(&names)
}
