use crate::error::IngestError;
use crate::extractors::amount::{parse_amount, parse_unit};
use crate::extractors::{IngredientDraft, IngredientExtractor, INGREDIENT_CATEGORY};
use regex::Regex;
use std::sync::LazyLock;

static INGREDIENT_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<amount>([\d/.½¼¾⅓⅔⅛⅜\-]|(\s*to\s*))+)\s*(?P<unit>(tablespoons?|teaspoons?|cups?|ounces?|kg|(kilo)?gr(ams)?|ml|(milli)?l(itres)?)?)\s+(?P<ingredient>.*)$",
    )
    .expect("ingredient line pattern is valid")
});

/// Line grammar of the Cookstr corpus: `<amount> [unit] <ingredient>`
pub struct CookstrIngredientExtractor;

impl IngredientExtractor for CookstrIngredientExtractor {
    fn extract(&self, line: &str) -> Result<IngredientDraft, IngestError> {
        let line = line.trim();
        let captures = INGREDIENT_LINE_RE
            .captures(line)
            .ok_or_else(|| IngestError::UnparsableIngredient(line.to_string()))?;

        let amount = captures.name("amount").map_or("", |m| m.as_str());
        let unit = captures.name("unit").map_or("", |m| m.as_str());
        let ingredient = captures.name("ingredient").map_or("", |m| m.as_str()).trim();

        if ingredient.is_empty() {
            return Err(IngestError::UnparsableIngredient(line.to_string()));
        }

        Ok(IngredientDraft {
            amount: parse_amount(amount),
            unit: parse_unit(unit),
            name: title_case(ingredient),
            category: INGREDIENT_CATEGORY,
        })
    }
}

/// Upper-case the first letter of every word and lower-case the rest.
/// Hyphens start a new word, apostrophes do not ("baker's" → "Baker's").
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = c.is_whitespace() || c == '-' || c == '(' || c == '/';
        }
    }

    result
}
