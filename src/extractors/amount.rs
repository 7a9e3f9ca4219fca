//! Amount and unit normalization.
//!
//! Both functions are total: malformed input degrades to a default value and a
//! logged warning, never an error.

use log::warn;
use regex::Regex;
use std::sync::LazyLock;

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<mixed>(?P<factor>\d*)(?P<fraction>[½¼¾⅓⅔⅛⅜]))|(?P<number>[\d.]+)")
        .expect("amount pattern is valid")
});

/// Unicode vulgar fractions and their values
const FRACTIONS: &[(char, f64)] = &[
    ('½', 0.5),
    ('¼', 0.25),
    ('¾', 0.75),
    ('⅓', 0.33),
    ('⅔', 0.66),
    ('⅛', 0.125),
    ('⅜', 0.375),
];

/// Canonical unit codes keyed by every spelling we accept (lowercase)
const UNIT_SYNONYMS: &[(&str, &str)] = &[
    ("tablespoon", "tbsp"),
    ("tablespoons", "tbsp"),
    ("teaspoon", "tsp"),
    ("teaspoons", "tsp"),
    ("cup", "cup"),
    ("cups", "cup"),
    ("ounce", "oz"),
    ("ounces", "oz"),
    ("kg", "kg"),
    ("kilo", "kg"),
    ("kilogram", "kg"),
    ("kilograms", "kg"),
    ("kilogr", "kg"),
    ("gr", "g"),
    ("gram", "g"),
    ("grams", "g"),
    ("ml", "ml"),
    ("milliliter", "ml"),
    ("milliliters", "ml"),
    ("millilitre", "ml"),
    ("millilitres", "ml"),
    ("l", "l"),
    ("liter", "l"),
    ("liters", "l"),
    ("litre", "l"),
    ("litres", "l"),
];

fn fraction_value(glyph: &str) -> f64 {
    glyph
        .chars()
        .next()
        .and_then(|c| FRACTIONS.iter().find(|(g, _)| *g == c))
        .map(|(_, value)| *value)
        .unwrap_or(0.0)
}

/// Convert the amount part of an ingredient line to a number.
///
/// Only the first amount token is read, so ranges ("2-3", "2 to 3") yield
/// their lower bound. A fraction glyph with a leading integer multiplies the
/// two: "2½" is 2 × 0.5 = 1.0.
pub fn parse_amount(amount: &str) -> f64 {
    let Some(captures) = AMOUNT_RE.captures(amount) else {
        return 0.0;
    };

    if let Some(number) = captures.name("number") {
        return match number.as_str().parse::<f64>() {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not parse amount '{}': {}", number.as_str(), e);
                0.0
            }
        };
    }

    let value = captures
        .name("fraction")
        .map(|glyph| fraction_value(glyph.as_str()))
        .unwrap_or(0.0);

    match captures.name("factor").map(|f| f.as_str()) {
        None | Some("") => value,
        Some(factor) => match factor.parse::<u32>() {
            Ok(factor) => value * f64::from(factor),
            Err(e) => {
                warn!("Ignoring invalid fraction factor '{}': {}", factor, e);
                value
            }
        },
    }
}

/// Map a unit word to its canonical code. Unknown units pass through unchanged.
pub fn parse_unit(unit: &str) -> String {
    let lookup = unit.trim().to_lowercase();
    UNIT_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == lookup)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| unit.to_string())
}
