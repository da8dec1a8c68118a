//! Persisted color records.
//!
//! Three top-level keys make up the whole persisted state:
//!
//! ```json
//! { "customColors": { "Ocean": { "hex": "#0B8043", "textColor": "white" } },
//!   "colorOrder":   [ "Ocean" ],
//!   "eventColors":  { "evt123": "Ocean" } }
//! ```

use crate::color::TextColor;
use crate::storage::{KeyValueStore, Record, StorageResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const CUSTOM_COLORS_KEY: &str = "customColors";
pub const COLOR_ORDER_KEY: &str = "colorOrder";
pub const EVENT_COLORS_KEY: &str = "eventColors";

/// All keys owned by the extension.
pub const TRACKED_KEYS: [&str; 3] = [CUSTOM_COLORS_KEY, COLOR_ORDER_KEY, EVENT_COLORS_KEY];

/// A user-defined color label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomColor {
    /// `#RRGGBB`
    pub hex: String,
    pub text_color: TextColor,
}

impl CustomColor {
    pub fn new(hex: impl Into<String>, text_color: TextColor) -> Self {
        Self {
            hex: hex.into(),
            text_color,
        }
    }
}

/// In-memory form of the three persisted records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorRecords {
    /// Color name -> definition. Names are unique.
    pub custom_colors: BTreeMap<String, CustomColor>,
    /// Display order of color names in swatch rows.
    pub color_order: Vec<String>,
    /// Event id -> color name. Absence means the host default.
    pub event_colors: BTreeMap<String, String>,
}

impl ColorRecords {
    /// Decode whatever subset of the tracked keys `record` holds.
    ///
    /// Missing or malformed keys decode to empty values.
    pub fn from_record(record: &Record) -> Self {
        Self {
            custom_colors: decode_key(record.get(CUSTOM_COLORS_KEY), CUSTOM_COLORS_KEY),
            color_order: decode_key(record.get(COLOR_ORDER_KEY), COLOR_ORDER_KEY),
            event_colors: decode_key(record.get(EVENT_COLORS_KEY), EVENT_COLORS_KEY),
        }
    }

    /// Load all three records from `store`.
    pub async fn load<S: KeyValueStore + ?Sized>(store: &S) -> StorageResult<Self> {
        let record = store.get(&TRACKED_KEYS).await?;
        Ok(Self::from_record(&record))
    }

    /// Record holding only `eventColors`.
    pub fn event_colors_record(&self) -> Record {
        let mut record = Record::new();
        record.insert(EVENT_COLORS_KEY.to_string(), encode(&self.event_colors));
        record
    }

    /// Record holding `customColors` and `colorOrder`, which change together.
    pub fn palette_record(&self) -> Record {
        let mut record = Record::new();
        record.insert(CUSTOM_COLORS_KEY.to_string(), encode(&self.custom_colors));
        record.insert(COLOR_ORDER_KEY.to_string(), encode(&self.color_order));
        record
    }

    /// Record holding all three keys.
    pub fn to_record(&self) -> Record {
        let mut record = self.palette_record();
        record.extend(self.event_colors_record());
        record
    }
}

/// Decode one key, falling back to the empty value.
pub(crate) fn decode_key<T: DeserializeOwned + Default>(value: Option<&Value>, key: &str) -> T {
    match value {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed {} record: {}", key, e);
            T::default()
        }),
    }
}

fn encode<T: Serialize>(value: &T) -> Value {
    // Maps, vectors and strings always serialize.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, block_on};
    use serde_json::json;

    fn as_record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_from_record() {
        let record = as_record(json!({
            "customColors": {"Ocean": {"hex": "#0B8043", "textColor": "white"}},
            "colorOrder": ["Ocean"],
            "eventColors": {"evt123": "Ocean"},
        }));
        let records = ColorRecords::from_record(&record);

        assert_eq!(records.custom_colors["Ocean"], CustomColor::new("#0B8043", TextColor::White));
        assert_eq!(records.color_order, vec!["Ocean".to_string()]);
        assert_eq!(records.event_colors["evt123"], "Ocean");
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let records = ColorRecords::from_record(&Record::new());
        assert_eq!(records, ColorRecords::default());
    }

    #[test]
    fn test_malformed_key_defaults_to_empty() {
        // An object where a list is expected must not poison the other keys.
        let record = as_record(json!({
            "colorOrder": {},
            "eventColors": {"e1": "A"},
        }));
        let records = ColorRecords::from_record(&record);
        assert!(records.color_order.is_empty());
        assert_eq!(records.event_colors.len(), 1);
    }

    #[test]
    fn test_record_round_trip_through_store() {
        let mut records = ColorRecords::default();
        records.custom_colors.insert("Ocean".into(), CustomColor::new("#0B8043", TextColor::White));
        records.color_order.push("Ocean".into());
        records.event_colors.insert("evt123".into(), "Ocean".into());

        let store = MemoryStore::new();
        block_on(store.set(records.to_record())).unwrap();
        let loaded = block_on(ColorRecords::load(&store)).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_partial_records() {
        let records = ColorRecords::default();
        let palette = records.palette_record();
        assert!(palette.contains_key(CUSTOM_COLORS_KEY));
        assert!(palette.contains_key(COLOR_ORDER_KEY));
        assert!(!palette.contains_key(EVENT_COLORS_KEY));
        assert_eq!(records.event_colors_record().len(), 1);
    }
}
