//! Stylesheet generation for custom event colors.
//!
//! The stylesheet is rebuilt from scratch on every call. It paints the
//! content areas of each mapped event's chips and leaves the host's status
//! stripe and resize handle alone, so the stripe registered through the
//! closest official color stays visible.

use crate::color::{Rgb, TextColor};
use crate::markup::HostMarkup;
use crate::model::ColorRecords;
use crate::selection::PendingSelection;

const CHIP_RADIUS: &str = "8px";

/// Build the full stylesheet for `records` plus any pending preview.
///
/// Pure and deterministic: identical inputs yield identical text.
pub fn synthesize(records: &ColorRecords, pending: &PendingSelection, markup: &HostMarkup) -> String {
    let mut css = String::new();

    for (event_id, color_name) in &records.event_colors {
        let Some(color) = records.custom_colors.get(color_name) else {
            // Mapping to a deleted color stays inert.
            continue;
        };
        let Some(hex) = css_hex(&color.hex) else {
            log::warn!("Skipping event {} with malformed color {:?}", event_id, color.hex);
            continue;
        };
        event_rules(&mut css, markup, event_id, &hex, color.text_color);
    }

    if let PendingSelection::PendingCustom { color_name, .. } = pending {
        if let Some(hex) = records.custom_colors.get(color_name).and_then(|c| css_hex(&c.hex)) {
            rule(
                &mut css,
                &[markup.chips.edit_color_button.clone()],
                &[("background-color", &hex)],
            );
        }
    }

    css
}

fn event_rules(css: &mut String, markup: &HostMarkup, event_id: &str, hex: &str, text: TextColor) {
    let chips = &markup.chips;
    let chip = format!("[{}=\"{}\"]", chips.event_id_attr, escape_attr_value(event_id));
    let timed = format!("{}{}", chip, chips.timed_block);

    // All-day banners: content area only, the stripe is a sibling.
    let all_day: Vec<String> = chips
        .all_day_content
        .iter()
        .map(|s| format!("{}{}", chip, s))
        .collect();
    rule(css, &all_day, &[("background-color", hex), ("color", text.css())]);

    // Timed blocks.
    rule(
        css,
        std::slice::from_ref(&timed),
        &[("background-color", hex), ("border-radius", CHIP_RADIUS)],
    );
    let timed_text: Vec<String> = chips
        .timed_text
        .iter()
        .map(|s| format!("{} {}", timed, s))
        .collect();
    rule(css, &timed_text, &[("color", text.css())]);
    rule(
        css,
        &[format!("{} {}", timed, chips.resize_handle)],
        &[
            ("border-bottom-left-radius", CHIP_RADIUS),
            ("border-bottom-right-radius", CHIP_RADIUS),
        ],
    );

    // Dots and indicators.
    let dots: Vec<String> = [&chips.month_dot, &chips.schedule_dot, &chips.detail_indicator]
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| format!("{}{}", chip, s))
        .collect();
    rule(css, &dots, &[("background-color", hex), ("border-color", hex)]);
}

fn rule(css: &mut String, selectors: &[String], declarations: &[(&str, &str)]) {
    if selectors.is_empty() {
        return;
    }
    css.push_str(&selectors.join(",\n"));
    css.push_str(" {\n");
    for (property, value) in declarations {
        css.push_str(&format!("  {}: {} !important;\n", property, value));
    }
    css.push_str("}\n");
}

/// Normalize a stored hex color, rejecting anything that is not `#RRGGBB`.
fn css_hex(hex: &str) -> Option<String> {
    Rgb::from_hex(hex).ok().map(Rgb::to_hex)
}

/// Escape a value for use inside a double-quoted attribute selector.
fn escape_attr_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\a "),
            '\r' => escaped.push_str("\\d "),
            '\u{c}' => escaped.push_str("\\c "),
            '\0' => escaped.push_str("\\FFFD "),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> ColorRecords {
        let mut records = ColorRecords::default();
        records.add_color("Ocean", "#0B8043", TextColor::White).unwrap();
        records.add_color("Sun", "#F6BF26", TextColor::Black).unwrap();
        records.event_colors.insert("evt123".into(), "Ocean".into());
        records
    }

    #[test]
    fn test_empty_records_yield_empty_sheet() {
        let css = synthesize(&ColorRecords::default(), &PendingSelection::Idle, &HostMarkup::default());
        assert!(css.is_empty());
    }

    #[test]
    fn test_rules_for_mapped_event() {
        let css = synthesize(&records(), &PendingSelection::Idle, &HostMarkup::default());

        assert!(css.contains("[data-eventid=\"evt123\"].GTG3wb {\n  background-color: #0B8043 !important;"));
        assert!(css.contains("[data-eventid=\"evt123\"][data-stacked-layout-chip-container] .KF4T6b"));
        assert!(css.contains("[data-eventid=\"evt123\"].GTG3wb .I0UMhf"));
        assert!(css.contains("[data-eventid=\"evt123\"] .xnWuge"));
        assert!(css.contains("color: white !important;"));
    }

    #[test]
    fn test_host_stripe_and_handle_keep_their_background() {
        let css = synthesize(&records(), &PendingSelection::Idle, &HostMarkup::default());

        for block in css.split("}\n") {
            if block.contains(".leOeGd") {
                assert!(!block.contains("background-color"), "{block}");
            }
        }
        assert!(!css.contains("pmUZFe"));
        assert!(!css.contains("o4Z98"));
    }

    #[test]
    fn test_dangling_mapping_is_inert() {
        let mut records = records();
        records.remove_color("Ocean").unwrap();
        let css = synthesize(&records, &PendingSelection::Idle, &HostMarkup::default());
        assert!(!css.contains("evt123"));
    }

    #[test]
    fn test_idempotent() {
        let records = records();
        let pending = PendingSelection::PendingCustom {
            event_id: "evt9".into(),
            color_name: "Sun".into(),
        };
        let markup = HostMarkup::default();

        assert_eq!(synthesize(&records, &pending, &markup), synthesize(&records, &pending, &markup));
    }

    #[test]
    fn test_pending_preview_targets_edit_button_only() {
        let records = records();
        let pending = PendingSelection::PendingCustom {
            event_id: "evt9".into(),
            color_name: "Sun".into(),
        };
        let markup = HostMarkup::default();
        let css = synthesize(&records, &pending, &markup);

        assert!(css.contains(&format!("{} {{\n  background-color: #F6BF26 !important;", markup.chips.edit_color_button)));
        assert!(!css.contains("evt9"));

        let official = PendingSelection::PendingOfficial { event_id: "evt9".into() };
        assert!(!synthesize(&records, &official, &markup).contains("#F6BF26"));
    }

    #[test]
    fn test_event_id_is_escaped() {
        let mut records = records();
        records.event_colors.insert("bad\"] body {".into(), "Ocean".into());
        let css = synthesize(&records, &PendingSelection::Idle, &HostMarkup::default());
        assert!(css.contains("[data-eventid=\"bad\\\"] body {\"]"));
    }

    #[test]
    fn test_control_characters_are_escaped() {
        assert_eq!(escape_attr_value("a\rb"), "a\\d b");
        assert_eq!(escape_attr_value("a\u{c}b"), "a\\c b");
        assert_eq!(escape_attr_value("a\0b"), "a\\FFFD b");
        assert_eq!(escape_attr_value("a\nb"), "a\\a b");

        let mut records = records();
        records.event_colors.insert("x\r\u{c}\0y".into(), "Sun".into());
        let css = synthesize(&records, &PendingSelection::Idle, &HostMarkup::default());
        assert!(css.contains("[data-eventid=\"x\\d \\c \\FFFD y\"]"));
        assert!(!css.contains('\r'));
        assert!(!css.contains('\0'));
    }

    #[test]
    fn test_malformed_stored_hex_is_skipped() {
        let mut records = records();
        records.custom_colors.get_mut("Ocean").unwrap().hex = "red; } * { display: none".into();
        let css = synthesize(&records, &PendingSelection::Idle, &HostMarkup::default());
        assert!(!css.contains("display"));
    }
}
