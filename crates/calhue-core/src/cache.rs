//! In-memory replica of the persisted color records.
//!
//! The DOM-facing code reads only from here. The cache is filled once from
//! the store at startup and then replaced key by key from change
//! notifications; until the first load completes every lookup sees empty
//! records.

use crate::model::{
    COLOR_ORDER_KEY, CUSTOM_COLORS_KEY, ColorRecords, CustomColor, EVENT_COLORS_KEY, decode_key,
};
use crate::storage::ChangeSet;
use std::collections::BTreeSet;

/// Single-writer replica of [`ColorRecords`].
#[derive(Debug, Clone, Default)]
pub struct ColorCache {
    records: ColorRecords,
    initialized: bool,
    /// Keys replaced by a change notification before the initial load landed.
    fresher_keys: BTreeSet<&'static str>,
}

impl ColorCache {
    /// Create an empty, uninitialized cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the initial load has been applied.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Current records.
    pub fn records(&self) -> &ColorRecords {
        &self.records
    }

    /// Apply the initial snapshot read from the store.
    ///
    /// Keys that a change notification already replaced are newer than the
    /// snapshot and are kept.
    pub fn load(&mut self, snapshot: ColorRecords) {
        let ColorRecords {
            custom_colors,
            color_order,
            event_colors,
        } = snapshot;

        if !self.fresher_keys.contains(CUSTOM_COLORS_KEY) {
            self.records.custom_colors = custom_colors;
        }
        if !self.fresher_keys.contains(COLOR_ORDER_KEY) {
            self.records.color_order = color_order;
        }
        if !self.fresher_keys.contains(EVENT_COLORS_KEY) {
            self.records.event_colors = event_colors;
        }
        self.initialized = true;
        self.fresher_keys.clear();

        log::info!(
            "Color cache loaded: {} colors, {} mapped events",
            self.records.custom_colors.len(),
            self.records.event_colors.len()
        );
    }

    /// Replace every tracked key present in `changes` wholesale.
    ///
    /// Returns true if any tracked key changed, i.e. styles need to be
    /// regenerated once for this batch.
    pub fn apply_changes(&mut self, changes: &ChangeSet) -> bool {
        let mut touched = false;

        if let Some(change) = changes.get(CUSTOM_COLORS_KEY) {
            self.records.custom_colors = decode_key(change.new_value.as_ref(), CUSTOM_COLORS_KEY);
            self.mark_fresh(CUSTOM_COLORS_KEY);
            touched = true;
        }
        if let Some(change) = changes.get(COLOR_ORDER_KEY) {
            self.records.color_order = decode_key(change.new_value.as_ref(), COLOR_ORDER_KEY);
            self.mark_fresh(COLOR_ORDER_KEY);
            touched = true;
        }
        if let Some(change) = changes.get(EVENT_COLORS_KEY) {
            self.records.event_colors = decode_key(change.new_value.as_ref(), EVENT_COLORS_KEY);
            self.mark_fresh(EVENT_COLORS_KEY);
            touched = true;
        }

        if touched {
            log::debug!("Color cache updated from store: {:?}", changes.keys().collect::<Vec<_>>());
        }
        touched
    }

    fn mark_fresh(&mut self, key: &'static str) {
        if !self.initialized {
            self.fresher_keys.insert(key);
        }
    }

    /// Look up a color definition by name.
    pub fn color(&self, name: &str) -> Option<&CustomColor> {
        self.records.custom_colors.get(name)
    }

    /// Committed color name for an event.
    pub fn event_color(&self, event_id: &str) -> Option<&str> {
        self.records.event_colors.get(event_id).map(String::as_str)
    }

    /// Colors in display order, skipping names with no definition.
    pub fn ordered_colors(&self) -> impl Iterator<Item = (&str, &CustomColor)> {
        self.records.ordered_colors()
    }

    /// Map an event to a color locally. Returns false if it already was.
    pub fn set_event_color(&mut self, event_id: &str, color_name: &str) -> bool {
        let previous = self
            .records
            .event_colors
            .insert(event_id.to_string(), color_name.to_string());
        previous.as_deref() != Some(color_name)
    }

    /// Drop an event's mapping locally. Returns false if there was none.
    pub fn remove_event_color(&mut self, event_id: &str) -> bool {
        self.records.event_colors.remove(event_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::TextColor;
    use crate::storage::StorageChange;
    use serde_json::json;

    fn ocean_records() -> ColorRecords {
        let mut records = ColorRecords::default();
        records.add_color("Ocean", "#0B8043", TextColor::White).unwrap();
        records.event_colors.insert("evt1".into(), "Ocean".into());
        records
    }

    fn change(key: &str, new_value: serde_json::Value) -> ChangeSet {
        let mut changes = ChangeSet::new();
        changes.insert(key.to_string(), StorageChange {
            new_value: Some(new_value),
            old_value: None,
        });
        changes
    }

    #[test]
    fn test_empty_before_load() {
        let cache = ColorCache::new();
        assert!(!cache.is_initialized());
        assert!(cache.event_color("evt1").is_none());
        assert_eq!(cache.ordered_colors().count(), 0);
    }

    #[test]
    fn test_load() {
        let mut cache = ColorCache::new();
        cache.load(ocean_records());

        assert!(cache.is_initialized());
        assert_eq!(cache.event_color("evt1"), Some("Ocean"));
        assert_eq!(cache.color("Ocean").unwrap().hex, "#0B8043");
    }

    #[test]
    fn test_apply_changes_replaces_wholesale() {
        let mut cache = ColorCache::new();
        cache.load(ocean_records());

        let changed = cache.apply_changes(&change("eventColors", json!({"evt2": "Ocean"})));

        assert!(changed);
        assert!(cache.event_color("evt1").is_none());
        assert_eq!(cache.event_color("evt2"), Some("Ocean"));
        assert_eq!(cache.color("Ocean").unwrap().text_color, TextColor::White);
    }

    #[test]
    fn test_removed_key_clears_field() {
        let mut cache = ColorCache::new();
        cache.load(ocean_records());

        let mut changes = ChangeSet::new();
        changes.insert("colorOrder".into(), StorageChange {
            new_value: None,
            old_value: Some(json!(["Ocean"])),
        });
        assert!(cache.apply_changes(&changes));
        assert_eq!(cache.ordered_colors().count(), 0);
    }

    #[test]
    fn test_untracked_keys_are_ignored() {
        let mut cache = ColorCache::new();
        cache.load(ocean_records());
        assert!(!cache.apply_changes(&change("somethingElse", json!(1))));
        assert_eq!(cache.event_color("evt1"), Some("Ocean"));
    }

    #[test]
    fn test_change_before_load_wins_over_snapshot() {
        let mut cache = ColorCache::new();
        cache.apply_changes(&change("eventColors", json!({"evt9": "Ocean"})));
        cache.load(ocean_records());

        assert_eq!(cache.event_color("evt9"), Some("Ocean"));
        assert!(cache.event_color("evt1").is_none());
        assert!(cache.color("Ocean").is_some());
    }

    #[test]
    fn test_local_mapping_edits() {
        let mut cache = ColorCache::new();
        assert!(cache.set_event_color("evt1", "Ocean"));
        assert!(!cache.set_event_color("evt1", "Ocean"));
        assert!(cache.remove_event_color("evt1"));
        assert!(!cache.remove_event_color("evt1"));
    }
}
