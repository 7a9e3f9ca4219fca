use async_trait::async_trait;
use recipe_ingest::{
    IngestError, Item, MemoryStore, ParserKind, Recipe, RecipeIngester, RecipeStore, StoreError,
};
use serde_json::json;
use std::sync::Arc;

/// Delegates to a `MemoryStore` but fails the configured operation
struct FlakyStore {
    inner: MemoryStore,
    fail_fetch: bool,
    fail_items: bool,
    fail_recipes: bool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_fetch: false,
            fail_items: false,
            fail_recipes: false,
        }
    }
}

#[async_trait]
impl RecipeStore for FlakyStore {
    async fn fetch_items(&self) -> Result<Vec<Item>, StoreError> {
        if self.fail_fetch {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.inner.fetch_items().await
    }

    async fn add_or_update_items(&self, items: Vec<Item>) -> Result<Vec<Item>, StoreError> {
        if self.fail_items {
            return Err(StoreError::Rejected("items collection is read-only".to_string()));
        }
        self.inner.add_or_update_items(items).await
    }

    async fn add_recipes(&self, recipes: Vec<Recipe>) -> Result<(), StoreError> {
        if self.fail_recipes {
            return Err(StoreError::Rejected("recipes collection is read-only".to_string()));
        }
        self.inner.add_recipes(recipes).await
    }
}

fn recipe_records() -> Vec<serde_json::Value> {
    vec![json!({
        "title": "Omelette",
        "date_modified": "2012-11-20",
        "ingredients": ["3 eggs", "1 tablespoon butter"],
        "instructions": ["Melt the butter, then add the eggs."]
    })]
}

#[tokio::test]
async fn test_item_write_failure() {
    let store = Arc::new(FlakyStore {
        fail_items: true,
        ..FlakyStore::new()
    });

    let result = RecipeIngester::builder()
        .records(recipe_records())
        .parser(ParserKind::Cookstr)
        .store(store.clone())
        .build()
        .await;

    match result {
        Err(IngestError::CatalogWrite(StoreError::Rejected(msg))) => {
            assert!(msg.contains("read-only"))
        }
        other => panic!("Expected CatalogWrite, got {:?}", other),
    }
    assert!(store.inner.recipes().await.is_empty());
}

#[tokio::test]
async fn test_recipe_write_failure_keeps_items() {
    let store = Arc::new(FlakyStore {
        fail_recipes: true,
        ..FlakyStore::new()
    });

    let result = RecipeIngester::builder()
        .records(recipe_records())
        .parser(ParserKind::Cookstr)
        .store(store.clone())
        .build()
        .await;

    assert!(matches!(result, Err(IngestError::RecipeWrite(_))));
    // Items written before the failure stay
    assert_eq!(store.inner.items().await.len(), 2);
}

#[tokio::test]
async fn test_catalog_read_failure() {
    let store = Arc::new(FlakyStore {
        fail_fetch: true,
        ..FlakyStore::new()
    });

    let result = RecipeIngester::builder()
        .records(vec![json!({"name": "Whisk"})])
        .parser(ParserKind::Items)
        .store(store)
        .build()
        .await;

    assert!(matches!(result, Err(IngestError::CatalogRead(StoreError::Unavailable(_)))));
}

#[tokio::test]
async fn test_items_path_write_failure() {
    let store = Arc::new(FlakyStore {
        fail_items: true,
        ..FlakyStore::new()
    });

    let result = RecipeIngester::builder()
        .records(vec![json!({"name": "Whisk"})])
        .parser(ParserKind::Items)
        .store(store)
        .build()
        .await;

    assert!(matches!(result, Err(IngestError::CatalogWrite(_))));
}
