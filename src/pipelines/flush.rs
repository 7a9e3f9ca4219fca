use crate::error::IngestError;
use crate::model::{Item, Recipe};
use crate::store::RecipeStore;
use log::{debug, info};
use std::collections::HashMap;

/// Collapse items sharing a name into one, keeping the most complete copy.
/// First-seen order is preserved; nameless items are dropped.
pub fn merge_items(items: impl IntoIterator<Item = Item>) -> Vec<Item> {
    let mut merged: Vec<Item> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for item in items {
        if item.name.trim().is_empty() {
            continue;
        }
        match index_by_name.get(&item.name) {
            Some(&index) => {
                if item.quality() > merged[index].quality() {
                    merged[index] = item;
                }
            }
            None => {
                index_by_name.insert(item.name.clone(), merged.len());
                merged.push(item);
            }
        }
    }

    merged
}

/// Copy store-assigned ids into every step item, matching by item name
pub fn backfill_item_ids(recipes: &mut [Recipe], catalog: &[Item]) {
    let by_name: HashMap<&str, &Item> = catalog
        .iter()
        .map(|item| (item.name.as_str(), item))
        .collect();

    for recipe in recipes.iter_mut() {
        for step_item in recipe.step_items_mut() {
            if let Some(stored) = by_name.get(step_item.item.name.as_str()) {
                step_item.item.id = stored.id.clone();
            }
        }
    }
}

/// Save the items referenced by `recipes`, then the recipes themselves with
/// item ids filled in. Items are written first so that every reference
/// resolves; a failed recipe write does not roll the items back.
pub async fn flush_recipes(
    store: &dyn RecipeStore,
    mut recipes: Vec<Recipe>,
) -> Result<Vec<Recipe>, IngestError> {
    let items = merge_items(recipes.iter().flat_map(|recipe| recipe.items()));
    info!(
        "Saving {} items referenced by {} recipes",
        items.len(),
        recipes.len()
    );

    let catalog = store
        .add_or_update_items(items)
        .await
        .map_err(IngestError::CatalogWrite)?;
    backfill_item_ids(&mut recipes, &catalog);

    debug!("Saving {} recipes", recipes.len());
    store
        .add_recipes(recipes.clone())
        .await
        .map_err(IngestError::RecipeWrite)?;

    Ok(recipes)
}

/// Save parsed items, returning them with the ids the store assigned
pub async fn flush_items(
    store: &dyn RecipeStore,
    items: Vec<Item>,
) -> Result<Vec<Item>, IngestError> {
    let mut items = merge_items(items);
    info!("Saving {} items", items.len());

    let catalog = store
        .add_or_update_items(items.clone())
        .await
        .map_err(IngestError::CatalogWrite)?;

    let ids: HashMap<&str, &Option<String>> = catalog
        .iter()
        .map(|item| (item.name.as_str(), &item.id))
        .collect();
    for item in items.iter_mut() {
        if let Some(id) = ids.get(item.name.as_str()) {
            item.id = (*id).clone();
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Step, StepItem};
    use crate::store::MemoryStore;

    fn recipe_with(names: &[&str]) -> Recipe {
        Recipe {
            name: names.join(" & "),
            steps: vec![Step {
                description: names.join(" "),
                items: names
                    .iter()
                    .map(|name| StepItem {
                        item: Item::named(*name),
                        amount: 1.0,
                        unit: String::new(),
                    })
                    .collect(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_keeps_highest_quality() {
        let plain = Item::named("Egg");
        let rich = Item {
            name: "Egg".to_string(),
            item_type: "ingredient".to_string(),
            img_url: "egg.png".to_string(),
            ..Default::default()
        };

        let merged = merge_items(vec![plain, Item::named("Milk"), rich.clone(), Item::named("")]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], rich);
        assert_eq!(merged[1].name, "Milk");
    }

    #[tokio::test]
    async fn test_flush_recipes_backfills_ids() {
        let store = MemoryStore::with_items(vec![Item::named("Flour")]);
        let flour_id = store.items().await[0].id.clone();

        let saved = flush_recipes(
            &store,
            vec![recipe_with(&["Flour", "Egg"]), recipe_with(&["Egg"])],
        )
        .await
        .unwrap();

        assert_eq!(store.items().await.len(), 2);
        assert_eq!(saved[0].steps[0].items[0].item.id, flour_id);
        let egg_ids: Vec<_> = saved
            .iter()
            .flat_map(|r| r.step_items())
            .filter(|s| s.name() == "Egg")
            .map(|s| s.item.id.clone())
            .collect();
        assert_eq!(egg_ids.len(), 2);
        assert!(egg_ids[0].is_some());
        assert_eq!(egg_ids[0], egg_ids[1]);

        let stored = store.recipes().await;
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().flat_map(|r| r.step_items()).all(|s| s.item.id.is_some()));
    }

    #[tokio::test]
    async fn test_flush_items_returns_ids() {
        let store = MemoryStore::new();
        let saved = flush_items(&store, vec![Item::named("Whisk"), Item::named("Whisk")])
            .await
            .unwrap();

        assert_eq!(saved.len(), 1);
        assert!(saved[0].id.is_some());
        assert_eq!(store.items().await.len(), 1);
    }
}
