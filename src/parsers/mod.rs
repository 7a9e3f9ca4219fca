use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::extractors::IngredientExtractor;
use crate::matching::ItemCatalog;
use crate::model::{RawRecord, StepItem};
use html_escape::decode_html_entities;
use log::warn;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

mod cookstr;
mod items;

pub use cookstr::CookstrParser;
pub use items::ItemListParser;

/// Turns one raw record into one output. Runs inside a parse task, so it
/// must not block on I/O.
pub trait RecordParser: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Selector name of this parser (e.g., "cookstr")
    fn name(&self) -> &'static str;

    fn parse(
        &self,
        record: RawRecord,
        context: &ParseContext,
    ) -> Result<Self::Output, IngestError>;
}

/// State shared by every parse task of one run
#[derive(Debug, Clone)]
pub struct ParseContext {
    pub catalog: Arc<ItemCatalog>,
    pub resolve_threshold: f64,
    pub link_threshold: f64,
}

impl ParseContext {
    pub fn new(catalog: Arc<ItemCatalog>, config: &IngestConfig) -> Self {
        Self {
            catalog,
            resolve_threshold: config.resolve_threshold,
            link_threshold: config.link_threshold,
        }
    }
}

/// The closed set of record schemas we can ingest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    /// Cookstr recipe corpus
    Cookstr,
    /// Flat list of items
    Items,
}

impl ParserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserKind::Cookstr => "cookstr",
            ParserKind::Items => "items",
        }
    }

    /// List all available parser names
    pub fn available_parsers() -> Vec<&'static str> {
        vec![ParserKind::Cookstr.as_str(), ParserKind::Items.as_str()]
    }
}

impl FromStr for ParserKind {
    type Err = IngestError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "cookstr" => Ok(ParserKind::Cookstr),
            "items" => Ok(ParserKind::Items),
            _ => Err(IngestError::UnknownParser(name.to_string())),
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract and resolve every ingredient line; unparsable lines and invalid
/// names are skipped.
pub fn resolve_ingredients(
    lines: &[String],
    extractor: &dyn IngredientExtractor,
    context: &ParseContext,
) -> Vec<StepItem> {
    let mut step_items = Vec::with_capacity(lines.len());

    for line in lines {
        let draft = match extractor.extract(&decode_html_symbols(line)) {
            Ok(draft) => draft,
            Err(e) => {
                warn!("Skipping ingredient line: {}", e);
                continue;
            }
        };

        match context
            .catalog
            .resolve_or_create(&draft.name, draft.category, context.resolve_threshold)
        {
            Ok(resolved) => step_items.push(draft.into_step_item(resolved.entity)),
            Err(e) => warn!("Skipping ingredient '{}': {}", draft.name, e),
        }
    }

    step_items
}

pub(crate) fn decode_html_symbols(text: &str) -> String {
    // Scraped corpora are sometimes encoded twice
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

/// Treat `null` like a missing field
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
