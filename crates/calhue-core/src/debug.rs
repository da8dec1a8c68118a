//! Random color generator for filling the palette during development.

use crate::color::{Rgb, TextColor};
use crate::model::ColorRecords;
use rand::Rng;
use rand::seq::SliceRandom;

const ADJECTIVES: &[&str] = &[
    "Mystic", "Electric", "Cosmic", "Vibrant", "Dreamy", "Bold", "Soft", "Neon", "Pastel", "Deep", "Bright",
    "Muted", "Rich", "Subtle", "Intense", "Gentle", "Warm", "Cool", "Fiery", "Icy", "Golden", "Silver",
    "Crystal", "Velvet",
];

const NOUNS: &[&str] = &[
    "Sunset", "Ocean", "Forest", "Sky", "Rose", "Flame", "Storm", "Dawn", "Twilight", "Coral", "Jade", "Amber",
    "Ruby", "Sapphire", "Pearl", "Opal", "Meadow", "Desert", "Mountain", "River", "Galaxy", "Aurora", "Prism",
    "Rainbow",
];

/// Random draws for a fresh name before falling back to a numeric suffix.
const NAME_ATTEMPTS: usize = 50;

pub fn random_rgb<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    Rgb::new(rng.r#gen(), rng.r#gen(), rng.r#gen())
}

/// "Adjective Noun".
pub fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Plain");
    let noun = NOUNS.choose(rng).copied().unwrap_or("Color");
    format!("{} {}", adjective, noun)
}

fn unique_name<R: Rng + ?Sized>(records: &ColorRecords, rng: &mut R) -> String {
    let mut name = random_name(rng);
    for _ in 1..NAME_ATTEMPTS {
        if !records.custom_colors.contains_key(&name) {
            return name;
        }
        name = random_name(rng);
    }

    let base = name;
    let mut suffix = 2;
    loop {
        let candidate = format!("{} {}", base, suffix);
        if !records.custom_colors.contains_key(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Append `count` random colors with readable text colors. Returns the
/// names added, in order.
pub fn add_random_colors<R: Rng + ?Sized>(records: &mut ColorRecords, count: usize, rng: &mut R) -> Vec<String> {
    let mut added = Vec::with_capacity(count);
    for _ in 0..count {
        let name = unique_name(records, rng);
        let rgb = random_rgb(rng);
        match records.add_color(&name, &rgb.to_hex(), TextColor::for_background(rgb)) {
            Ok(()) => added.push(name),
            Err(e) => log::warn!("Skipping generated color: {}", e),
        }
    }
    log::info!("Debug: added {} random colors", added.len());
    added
}

/// Replace every color with `count` random ones.
pub fn replace_with_random_colors<R: Rng + ?Sized>(records: &mut ColorRecords, count: usize, rng: &mut R) -> Vec<String> {
    records.clear_colors();
    add_random_colors(records, count, rng)
}
