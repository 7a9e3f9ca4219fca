use crate::error::IngestError;
use crate::model::{Item, RawRecord};
use crate::parsers::{decode_html_symbols, nullable, ParseContext, RecordParser};
use log::debug;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ListedItem {
    name: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    item_type: String,
    #[serde(alias = "imgUrl", default, deserialize_with = "nullable")]
    image: String,
}

/// Parses a flat list of `{name, type, image}` records into catalog items
pub struct ItemListParser;

impl RecordParser for ItemListParser {
    type Output = Item;

    fn name(&self) -> &'static str {
        "items"
    }

    fn parse(&self, record: RawRecord, context: &ParseContext) -> Result<Item, IngestError> {
        let listed: ListedItem = serde_json::from_value(record)
            .map_err(|e| IngestError::RecordParse(format!("not an item: {}", e)))?;
        let name = decode_html_symbols(listed.name.trim());

        let resolved = context.catalog.resolve_or_create(
            &name,
            listed.item_type.trim(),
            context.resolve_threshold,
        )?;

        let mut item = resolved.entity;
        if resolved.success {
            debug!("Item '{}' merged into existing '{}'", name, item.name);
        }
        // Fill gaps of the canonical item from this record
        if item.item_type.is_empty() {
            item.item_type = listed.item_type.trim().to_string();
        }
        if item.img_url.is_empty() {
            item.img_url = listed.image.trim().to_string();
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestConfig;
    use crate::matching::ItemCatalog;
    use serde_json::json;
    use std::sync::Arc;

    fn context() -> ParseContext {
        ParseContext::new(Arc::new(ItemCatalog::new()), &IngestConfig::default())
    }

    #[test]
    fn test_parse_item() {
        let item = ItemListParser
            .parse(
                json!({"name": "Whisk", "type": "tool", "image": "https://example.com/whisk.png"}),
                &context(),
            )
            .unwrap();

        assert_eq!(item.name, "Whisk");
        assert_eq!(item.item_type, "tool");
        assert_eq!(item.img_url, "https://example.com/whisk.png");
        assert!(item.id.is_none());
    }

    #[test]
    fn test_similar_item_reuses_canonical_name() {
        let context = context();
        ItemListParser
            .parse(json!({"name": "Eggs", "type": "ingredient"}), &context)
            .unwrap();
        let second = ItemListParser
            .parse(json!({"name": "egg", "type": "ingredient", "image": "egg.png"}), &context)
            .unwrap();

        assert_eq!(second.name, "Eggs");
        assert_eq!(second.img_url, "egg.png");
        assert_eq!(context.catalog.len(), 1);
    }

    #[test]
    fn test_blank_name_fails_record() {
        let result = ItemListParser.parse(json!({"name": "  "}), &context());
        assert!(matches!(result, Err(IngestError::InvalidItemName)));

        let result = ItemListParser.parse(json!({"type": "tool"}), &context());
        assert!(matches!(result, Err(IngestError::RecordParse(_))));
    }
}
