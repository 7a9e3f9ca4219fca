use crate::error::IngestError;
use crate::matching::similarity::best_match;
use crate::model::{Item, MatchResult};
use log::{debug, trace};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Shared catalog of canonical items.
///
/// Items are kept in insertion order so that similarity ties resolve the same
/// way on every run. `resolve_or_create` holds the lock across the lookup and
/// the insert, so two tasks resolving near-identical names cannot both decide
/// the item is missing.
#[derive(Debug, Default)]
pub struct ItemCatalog {
    items: Mutex<Vec<Item>>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the catalog from the store's current items, ordered by name
    pub fn seeded(mut items: Vec<Item>) -> Self {
        items.retain(|item| !item.name.trim().is_empty());
        items.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Seeded item catalog with {} items", items.len());
        ItemCatalog {
            items: Mutex::new(items),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Item>> {
        // A panicking parse task cannot leave the Vec half-written
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Find the catalog item most similar to `name`, inserting a new item when
    /// nothing reaches `threshold`.
    ///
    /// `success` tells whether an existing item was reused.
    pub fn resolve_or_create(
        &self,
        name: &str,
        item_type: &str,
        threshold: f64,
    ) -> Result<MatchResult<Item>, IngestError> {
        let name = validate_name(name)?;
        let mut items = self.lock();

        if let Some(found) = best_match(name, items.iter(), |item| item.name.as_str(), threshold) {
            trace!(
                "Resolved '{}' to catalog item '{}' ({:.2})",
                name,
                found.entity.name,
                found.score
            );
            return Ok(found.map(Item::clone));
        }

        let item = Item {
            name: name.to_string(),
            item_type: item_type.to_string(),
            ..Default::default()
        };
        debug!("No similar item for '{}' at {}, adding to catalog", name, threshold);
        items.push(item.clone());
        Ok(MatchResult::unmatched(item))
    }

    /// Find the catalog item most similar to `name` without modifying the
    /// catalog. On a miss the returned entity is a transient item carrying
    /// only the name.
    pub fn resolve(&self, name: &str, threshold: f64) -> Result<MatchResult<Item>, IngestError> {
        let name = validate_name(name)?;
        let items = self.lock();

        Ok(
            match best_match(name, items.iter(), |item| item.name.as_str(), threshold) {
                Some(found) => found.map(Item::clone),
                None => MatchResult::unmatched(Item::named(name)),
            },
        )
    }

    /// Current items in catalog order
    pub fn snapshot(&self) -> Vec<Item> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn validate_name(name: &str) -> Result<&str, IngestError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(IngestError::InvalidItemName);
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};

    #[test]
    fn test_identical_name_reuses_existing_item() {
        let catalog = ItemCatalog::seeded(vec![Item {
            id: Some("flour-id".to_string()),
            name: "Flour".to_string(),
            item_type: "ingredient".to_string(),
            img_url: String::new(),
        }]);

        let result = catalog.resolve_or_create("Flour", "ingredient", 0.9).unwrap();
        assert!(result.success);
        assert_eq!(result.entity.id.as_deref(), Some("flour-id"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_case_and_plural_variants_converge() {
        let catalog = ItemCatalog::new();
        let first = catalog.resolve_or_create("Eggs", "ingredient", 0.9).unwrap();
        let second = catalog.resolve_or_create("egg", "ingredient", 0.9).unwrap();

        assert!(!first.success);
        assert!(second.success);
        assert_eq!(second.entity.name, "Eggs");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_dissimilar_names_create_distinct_items() {
        let catalog = ItemCatalog::new();
        let flour = catalog.resolve_or_create("Flour", "ingredient", 0.9).unwrap();
        let sugar = catalog.resolve_or_create("Sugar", "ingredient", 0.9).unwrap();

        assert!(!flour.success);
        assert!(!sugar.success);
        assert_ne!(flour.entity.name, sugar.entity.name);
        assert_eq!(catalog.len(), 2);
        assert_eq!(sugar.entity.item_type, "ingredient");
    }

    #[test]
    fn test_empty_name_is_invalid() {
        let catalog = ItemCatalog::new();
        assert!(matches!(
            catalog.resolve_or_create("   ", "ingredient", 0.9),
            Err(IngestError::InvalidItemName)
        ));
        assert!(matches!(catalog.resolve("", 0.9), Err(IngestError::InvalidItemName)));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_resolve_does_not_insert() {
        let catalog = ItemCatalog::seeded(vec![Item::named("Mixer")]);

        let hit = catalog.resolve("mixer", 0.9).unwrap();
        assert!(hit.success);
        assert_eq!(hit.entity.name, "Mixer");

        let miss = catalog.resolve("the", 0.9).unwrap();
        assert!(!miss.success);
        assert_eq!(miss.entity.name, "the");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_seeded_catalog_is_sorted_and_skips_blank_names() {
        let catalog = ItemCatalog::seeded(vec![
            Item::named("Sugar"),
            Item::named(""),
            Item::named("Butter"),
        ]);
        let names: Vec<String> = catalog.snapshot().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Butter", "Sugar"]);
    }

    #[test]
    fn test_concurrent_resolution_creates_one_item() {
        let catalog = Arc::new(ItemCatalog::new());
        let start = Arc::new(Barrier::new(16));
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let catalog = Arc::clone(&catalog);
                let start = Arc::clone(&start);
                let name = if i % 2 == 0 { "Eggs" } else { "egg" };
                std::thread::spawn(move || {
                    start.wait();
                    catalog.resolve_or_create(name, "ingredient", 0.9).unwrap()
                })
            })
            .collect();

        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|result| !result.success)
            .count();

        assert_eq!(created, 1);
        assert_eq!(catalog.len(), 1);
    }
}
