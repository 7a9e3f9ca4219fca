use crate::model::{Item, Recipe};
use async_trait::async_trait;
use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors reported by a store implementation
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the write
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Persistence collaborator of the pipeline
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Full current item catalog
    async fn fetch_items(&self) -> Result<Vec<Item>, StoreError>;

    /// Insert items without an id, update items with one. Returns the full
    /// catalog afterwards so callers can pick up assigned ids.
    async fn add_or_update_items(&self, items: Vec<Item>) -> Result<Vec<Item>, StoreError>;

    /// Insert recipes
    async fn add_recipes(&self, recipes: Vec<Recipe>) -> Result<(), StoreError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<Vec<Item>>,
    recipes: RwLock<Vec<Recipe>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with items; items without an id get one
    pub fn with_items(items: Vec<Item>) -> Self {
        let items = items
            .into_iter()
            .map(|mut item| {
                item.id.get_or_insert_with(new_id);
                item
            })
            .collect();
        MemoryStore {
            items: RwLock::new(items),
            recipes: RwLock::new(Vec::new()),
        }
    }

    pub async fn items(&self) -> Vec<Item> {
        self.items.read().await.clone()
    }

    pub async fn recipes(&self) -> Vec<Recipe> {
        self.recipes.read().await.clone()
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn fetch_items(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.items.read().await.clone())
    }

    async fn add_or_update_items(&self, items: Vec<Item>) -> Result<Vec<Item>, StoreError> {
        let mut stored = self.items.write().await;
        let (mut inserted, mut updated) = (0, 0);

        for item in items {
            if item.name.trim().is_empty() {
                warn!("Skipping item without a name");
                continue;
            }

            let existing = match &item.id {
                Some(id) => stored.iter().position(|s| s.id.as_ref() == Some(id)),
                None => stored.iter().position(|s| s.name == item.name),
            };

            match existing {
                Some(index) => {
                    let id = stored[index].id.clone();
                    stored[index] = Item { id, ..item };
                    updated += 1;
                }
                None => {
                    let id = item.id.clone().unwrap_or_else(new_id);
                    debug!("Inserting item '{}' as {}", item.name, id);
                    stored.push(Item { id: Some(id), ..item });
                    inserted += 1;
                }
            }
        }

        info!("Inserted {} and updated {} items", inserted, updated);
        Ok(stored.clone())
    }

    async fn add_recipes(&self, recipes: Vec<Recipe>) -> Result<(), StoreError> {
        let mut stored = self.recipes.write().await;
        let count = recipes.len();
        stored.extend(recipes.into_iter().map(|mut recipe| {
            recipe.id.get_or_insert_with(new_id);
            recipe
        }));
        info!("Added {} recipes", count);
        Ok(())
    }
}
