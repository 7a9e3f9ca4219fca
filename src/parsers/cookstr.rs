use crate::error::IngestError;
use crate::extractors::CookstrIngredientExtractor;
use crate::matching::StepBuilder;
use crate::model::{RawRecord, Recipe, RecipeProps};
use crate::parsers::{
    decode_html_symbols, nullable, resolve_ingredients, ParseContext, RecordParser,
};
use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CookstrRecipe {
    title: String,
    #[serde(default, deserialize_with = "nullable")]
    chef: String,
    #[serde(default, deserialize_with = "nullable")]
    description: String,
    #[serde(default, deserialize_with = "nullable")]
    url: String,
    #[serde(default, deserialize_with = "nullable")]
    photo_url: String,
    #[serde(default, deserialize_with = "nullable")]
    date_modified: String,
    #[serde(default, deserialize_with = "nullable")]
    instructions: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    ingredients: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    type_of_dish: String,
    #[serde(default, deserialize_with = "nullable")]
    course: String,
}

/// Parses records of the Cookstr recipe corpus
pub struct CookstrParser {
    extractor: CookstrIngredientExtractor,
}

impl CookstrParser {
    pub fn new() -> Self {
        Self {
            extractor: CookstrIngredientExtractor,
        }
    }
}

impl Default for CookstrParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser for CookstrParser {
    type Output = Recipe;

    fn name(&self) -> &'static str {
        "cookstr"
    }

    fn parse(&self, record: RawRecord, context: &ParseContext) -> Result<Recipe, IngestError> {
        let raw: CookstrRecipe = serde_json::from_value(record)
            .map_err(|e| IngestError::RecordParse(format!("not a cookstr recipe: {}", e)))?;
        let name = decode_html_symbols(raw.title.trim());
        debug!("Parsing recipe {}", name);

        let created_at = NaiveDate::parse_from_str(raw.date_modified.trim(), "%Y-%m-%d")
            .map_err(|e| IngestError::RecordParse(format!("{}: invalid date: {}", name, e)))?;

        let step_items = resolve_ingredients(&raw.ingredients, &self.extractor, context);
        let builder = StepBuilder::new(
            &context.catalog,
            context.resolve_threshold,
            context.link_threshold,
        );
        let steps = raw
            .instructions
            .iter()
            .map(|description| decode_html_symbols(description.trim()))
            .filter(|description| !description.is_empty())
            .map(|description| builder.build_step(&description, &step_items))
            .collect();

        let tags = [raw.type_of_dish, raw.course]
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        debug!("Finished parsing recipe {}", name);
        Ok(Recipe {
            id: None,
            name,
            author: decode_html_symbols(raw.chef.trim()),
            description: decode_html_symbols(raw.description.trim()),
            props: RecipeProps {
                url: raw.url,
                img_url: raw.photo_url,
                created_at: Some(created_at),
                tags,
            },
            steps,
        })
    }
}
