//! Rules for creating and deleting custom colors.
//!
//! These are the operations behind the settings popup. They work on a
//! [`ColorRecords`] snapshot; the caller persists [`ColorRecords::palette_record`]
//! afterwards.

use crate::color::{Rgb, TextColor};
use crate::model::{ColorRecords, CustomColor};
use thiserror::Error;

/// Errors from color library edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    #[error("Please enter a name for your color.")]
    EmptyName,
    #[error("A color named {0:?} already exists.")]
    DuplicateName(String),
    #[error("No color named {0:?}.")]
    UnknownColor(String),
    #[error("{0:?} is not a #RRGGBB color.")]
    InvalidHex(String),
}

impl ColorRecords {
    /// Define a new color and append it to the display order.
    ///
    /// The name is trimmed; empty and already-used names are rejected.
    pub fn add_color(&mut self, name: &str, hex: &str, text_color: TextColor) -> Result<(), LibraryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::EmptyName);
        }
        if self.custom_colors.contains_key(name) {
            return Err(LibraryError::DuplicateName(name.to_string()));
        }
        let rgb = Rgb::from_hex(hex).map_err(|_| LibraryError::InvalidHex(hex.to_string()))?;

        self.custom_colors
            .insert(name.to_string(), CustomColor::new(rgb.to_hex(), text_color));
        self.color_order.retain(|n| n != name);
        self.color_order.push(name.to_string());
        Ok(())
    }

    /// Delete a color and drop it from the display order.
    ///
    /// Event mappings that still name it are left in place and render with
    /// the host default until the event is recolored.
    pub fn remove_color(&mut self, name: &str) -> Result<CustomColor, LibraryError> {
        let removed = self
            .custom_colors
            .remove(name)
            .ok_or_else(|| LibraryError::UnknownColor(name.to_string()))?;
        self.color_order.retain(|n| n != name);
        Ok(removed)
    }

    /// Delete every color definition. Event mappings are kept.
    pub fn clear_colors(&mut self) {
        self.custom_colors.clear();
        self.color_order.clear();
    }

    /// Colors in display order, skipping names with no definition.
    pub fn ordered_colors(&self) -> impl Iterator<Item = (&str, &CustomColor)> {
        self.color_order
            .iter()
            .filter_map(|name| self.custom_colors.get(name).map(|color| (name.as_str(), color)))
    }

    /// Look up the custom color an event is mapped to, if it still exists.
    pub fn color_for_event(&self, event_id: &str) -> Option<(&str, &CustomColor)> {
        let name = self.event_colors.get(event_id)?;
        self.custom_colors.get(name).map(|color| (name.as_str(), color))
    }
}
