//! Color library operations behind the settings popup.
//!
//! Each operation reads the current records from the store, applies the
//! edit and writes back `customColors` and `colorOrder` together. The
//! content script picks the result up through its change subscription.

use crate::error::{ShellError, ShellResult};
use calhue_core::{
    COLOR_ORDER_KEY, CUSTOM_COLORS_KEY, ColorRecords, KeyValueStore, LibraryError, Rgb, TextColor,
};
use serde::Serialize;

/// One color as listed to the popup, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorEntry {
    pub name: String,
    pub hex: String,
    pub text_color: TextColor,
}

/// Define a new color. Without an explicit text color the readable one
/// for `hex` is used.
pub async fn add_custom_color<S: KeyValueStore + ?Sized>(
    store: &S,
    name: &str,
    hex: &str,
    text_color: Option<&str>,
) -> ShellResult<()> {
    let rgb = Rgb::from_hex(hex).map_err(|_| LibraryError::InvalidHex(hex.to_string()))?;
    let text_color = match text_color {
        Some(value) => value
            .parse::<TextColor>()
            .map_err(|_| ShellError::InvalidTextColor(value.to_string()))?,
        None => TextColor::for_background(rgb),
    };

    let mut records = ColorRecords::load(store).await?;
    records.add_color(name, hex, text_color)?;
    store.set(records.palette_record()).await?;
    log::info!("Added custom color {:?} ({})", name.trim(), rgb);
    Ok(())
}

/// Delete a color. Events mapped to it keep their mapping.
pub async fn remove_custom_color<S: KeyValueStore + ?Sized>(store: &S, name: &str) -> ShellResult<()> {
    let mut records = ColorRecords::load(store).await?;
    records.remove_color(name)?;
    store.set(records.palette_record()).await?;
    log::info!("Removed custom color {:?}", name);
    Ok(())
}

/// All colors in display order.
pub async fn list_custom_colors<S: KeyValueStore + ?Sized>(store: &S) -> ShellResult<Vec<ColorEntry>> {
    let records = ColorRecords::load(store).await?;
    Ok(records
        .ordered_colors()
        .map(|(name, color)| ColorEntry {
            name: name.to_string(),
            hex: color.hex.clone(),
            text_color: color.text_color,
        })
        .collect())
}

/// Delete every color definition.
pub async fn clear_custom_colors<S: KeyValueStore + ?Sized>(store: &S) -> ShellResult<()> {
    store.remove(&[CUSTOM_COLORS_KEY, COLOR_ORDER_KEY]).await?;
    log::info!("Cleared all custom colors");
    Ok(())
}

/// Append `count` generated colors. Returns their names.
#[cfg(feature = "debug-colors")]
pub async fn add_random_colors<S: KeyValueStore + ?Sized>(store: &S, count: usize) -> ShellResult<Vec<String>> {
    let mut records = ColorRecords::load(store).await?;
    let added = calhue_core::debug::add_random_colors(&mut records, count, &mut rand::thread_rng());
    store.set(records.palette_record()).await?;
    Ok(added)
}

/// Replace every color with `count` generated ones. Returns their names.
#[cfg(feature = "debug-colors")]
pub async fn replace_with_random_colors<S: KeyValueStore + ?Sized>(
    store: &S,
    count: usize,
) -> ShellResult<Vec<String>> {
    let mut records = ColorRecords::load(store).await?;
    let added = calhue_core::debug::replace_with_random_colors(&mut records, count, &mut rand::thread_rng());
    store.set(records.palette_record()).await?;
    Ok(added)
}
