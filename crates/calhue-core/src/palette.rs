//! The host calendar's fixed event palette.
//!
//! The host only remembers colors from this list, so every custom color is
//! paired with its nearest official entry when it is applied.

use crate::color::Rgb;

/// A color from the host's built-in event palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficialColor {
    /// Name shown by the host (e.g. "Tomato").
    pub name: &'static str,
    /// `#RRGGBB`, uppercase, as the host writes it in `data-color`.
    pub hex: &'static str,
    pub rgb: Rgb,
}

impl OfficialColor {
    const fn new(name: &'static str, hex: &'static str, rgb: (u8, u8, u8)) -> Self {
        Self {
            name,
            hex,
            rgb: Rgb::new(rgb.0, rgb.1, rgb.2),
        }
    }
}

/// Official event colors in the order the host lists them.
pub static OFFICIAL_COLORS: [OfficialColor; 11] = [
    OfficialColor::new("Tomato", "#D50000", (0xD5, 0x00, 0x00)),
    OfficialColor::new("Flamingo", "#E67C73", (0xE6, 0x7C, 0x73)),
    OfficialColor::new("Tangerine", "#F4511E", (0xF4, 0x51, 0x1E)),
    OfficialColor::new("Banana", "#F6BF26", (0xF6, 0xBF, 0x26)),
    OfficialColor::new("Sage", "#33B679", (0x33, 0xB6, 0x79)),
    OfficialColor::new("Basil", "#0B8043", (0x0B, 0x80, 0x43)),
    OfficialColor::new("Peacock", "#039BE5", (0x03, 0x9B, 0xE5)),
    OfficialColor::new("Blueberry", "#3F51B5", (0x3F, 0x51, 0xB5)),
    OfficialColor::new("Lavender", "#7986CB", (0x79, 0x86, 0xCB)),
    OfficialColor::new("Grape", "#8E24AA", (0x8E, 0x24, 0xAA)),
    OfficialColor::new("Graphite", "#616161", (0x61, 0x61, 0x61)),
];

/// Find the official color nearest to `hex` by Euclidean RGB distance.
///
/// Ties go to the entry listed first. Input that does not parse maps to the
/// first entry, which still registers a stripe on the host side.
pub fn closest_official_color(hex: &str) -> &'static OfficialColor {
    let Ok(target) = Rgb::from_hex(hex) else {
        log::warn!("Unparseable custom color {:?}, using {}", hex, OFFICIAL_COLORS[0].name);
        return &OFFICIAL_COLORS[0];
    };

    closest_in(&OFFICIAL_COLORS, target)
}

fn closest_in(palette: &[OfficialColor], target: Rgb) -> &OfficialColor {
    let mut best = &palette[0];
    let mut best_distance = target.distance_sq(best.rgb);
    for candidate in &palette[1..] {
        let distance = target.distance_sq(candidate.rgb);
        if distance < best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    best
}

/// Look up an official color by its hex value (case-insensitive).
pub fn official_by_hex(hex: &str) -> Option<&'static OfficialColor> {
    OFFICIAL_COLORS.iter().find(|c| c.hex.eq_ignore_ascii_case(hex))
}
