//! Selectors, classes and attributes of the host calendar's markup.
//!
//! None of these are a stable contract; they track the host's current
//! markup and can be overridden through [`crate::EngineConfig`].
//!
//! Selectors handed to [`crate::HostDom`] stay within simple compound
//! selectors (`tag`, `.class`, `#id`, `[attr]`, `[attr="value"]`) and comma
//! lists. Only the chip selectors, which end up in the injected stylesheet,
//! use combinators.

use serde::{Deserialize, Serialize};

/// Host markup the observer and injector match against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostMarkup {
    /// Marker element of a color grid; its parent is the picker container.
    pub color_grid: String,
    /// Ancestor of the quick picker that carries the event id.
    pub event_menu: String,
    /// Attribute on `event_menu` holding the event id.
    pub event_menu_attr: String,
    /// Attribute on the container's parent giving the swatches per row.
    pub colors_per_row_attr: String,
    /// Index of the first swatch row among the container's children.
    pub first_row_index: usize,
    /// Classes of one swatch row.
    pub row_classes: String,
    /// Host swatch elements (official and injected alike).
    pub swatch: String,
    /// Classes given to injected swatches so they render like host ones.
    pub swatch_classes: String,
    /// Every selectable option, used when updating checked state.
    pub radio: String,
    /// Checkmark inside a swatch.
    pub checkmark: String,
    /// Classes of the checkmark element we create.
    pub checkmark_classes: String,
    /// Icon ligature drawn by the checkmark.
    pub checkmark_glyph: String,
    /// Class that makes a checkmark visible.
    pub checked_class: String,
    /// Class of the hover tooltip inside a swatch.
    pub tooltip_class: String,
    /// Transient overlays and tooltips whose insertions are ignored.
    pub overlay: String,
    /// Popup wrapping the quick picker, hidden after a custom pick.
    pub quick_menu_popup: String,
    /// Generic menu that wraps the edit-page picker.
    pub edit_menu: String,
    /// Calendar-level color menu, which must never receive swatches.
    pub calendar_color_menu: String,
    /// Save control of the edit form.
    pub save_button: String,
    /// URL path segment preceding the event id on the edit page.
    pub edit_path_segment: String,
    /// Selectors used only inside the generated stylesheet.
    pub chips: ChipSelectors,
}

impl Default for HostMarkup {
    fn default() -> Self {
        Self {
            color_grid: ".WQPNJc".to_string(),
            event_menu: "[data-eid]".to_string(),
            event_menu_attr: "data-eid".to_string(),
            colors_per_row_attr: "data-colors-per-row".to_string(),
            first_row_index: 1,
            row_classes: "vbVGZb".to_string(),
            swatch: ".A1wrjc".to_string(),
            swatch_classes: "A1wrjc kQuqUe pka1xd".to_string(),
            radio: "[role=\"menuitemradio\"]".to_string(),
            checkmark: ".lLCaB".to_string(),
            checkmark_classes: "google-material-icons notranslate lLCaB M8B6kc".to_string(),
            checkmark_glyph: "bigtop_done".to_string(),
            checked_class: "eO2Zfd".to_string(),
            tooltip_class: "oMnJrf".to_string(),
            overlay: ".pdqVLc, .hMdQi, .nBzcnc".to_string(),
            quick_menu_popup: ".tB5Jxf-xl07Ob-XxIAqe".to_string(),
            edit_menu: "[role=\"menu\"]".to_string(),
            calendar_color_menu: "[data-calendar-color-menu]".to_string(),
            save_button: "[jsname=\"x8hlje\"]".to_string(),
            edit_path_segment: "eventedit".to_string(),
            chips: ChipSelectors::default(),
        }
    }
}

/// Event chip selectors for each rendering context.
///
/// Each is appended to `[<event_id_attr>="<id>"]`, so a leading space means
/// "descendant of the chip" and no space means "the chip itself".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChipSelectors {
    /// Attribute carrying the event id on rendered chips.
    pub event_id_attr: String,
    /// Content areas of an all-day banner, excluding its status stripe.
    pub all_day_content: Vec<String>,
    /// A timed event block.
    pub timed_block: String,
    /// Text elements inside a timed block (title, time, location).
    pub timed_text: Vec<String>,
    /// Resize handle of a timed block; only its corners are touched.
    pub resize_handle: String,
    /// Color dot of a month-view chip.
    pub month_dot: String,
    /// Color dot of a schedule-view row.
    pub schedule_dot: String,
    /// Color square in the event detail popup.
    pub detail_indicator: String,
    /// The edit page's own color button, used for the pending preview.
    pub edit_color_button: String,
}

impl Default for ChipSelectors {
    fn default() -> Self {
        Self {
            event_id_attr: "data-eventid".to_string(),
            all_day_content: vec![
                "[data-stacked-layout-chip-container] .KF4T6b".to_string(),
                "[data-stacked-layout-chip-container] .UflSff".to_string(),
            ],
            timed_block: ".GTG3wb".to_string(),
            timed_text: vec![".I0UMhf".to_string(), ".gVNoLb".to_string(), ".K9QN7e".to_string()],
            resize_handle: ".leOeGd".to_string(),
            month_dot: " .VlNR9e".to_string(),
            schedule_dot: " .nHqeVd".to_string(),
            detail_indicator: " .xnWuge".to_string(),
            edit_color_button: "[jsname=\"NqS4ib\"] .A1wrjc".to_string(),
        }
    }
}
