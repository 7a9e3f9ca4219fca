use recipe_ingest::{IngestConfig, IngestResult, MemoryStore, ParserKind, RecipeIngester};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

fn corpus(count: usize) -> Vec<Value> {
    (0..count)
        .map(|n| {
            // Alternate spellings of the same ingredients across records
            let (flour, egg) = if n % 2 == 0 {
                ("2 cups flour", "1 egg")
            } else {
                ("1 cup Flour", "2 eggs")
            };
            json!({
                "title": format!("Batch Recipe {}", n),
                "date_modified": "2016-03-14",
                "ingredients": [flour, egg, "½ teaspoon salt"],
                "instructions": ["Whisk the egg, then fold in the flour and salt."]
            })
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_records_share_catalog() {
    let store = Arc::new(MemoryStore::new());
    let config = IngestConfig {
        max_concurrency: 8,
        queue_capacity: 4,
        ..IngestConfig::default()
    };

    let result = RecipeIngester::builder()
        .records(corpus(50))
        .parser(ParserKind::Cookstr)
        .store(store.clone())
        .config(config)
        .build()
        .await
        .unwrap();

    let recipes = match result {
        IngestResult::Recipes(recipes) => recipes,
        IngestResult::Items(_) => panic!("Expected Recipes result"),
    };
    assert_eq!(recipes.len(), 50);

    let titles: HashSet<&str> = recipes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(titles.len(), 50);

    let items = store.items().await;
    assert_eq!(items.len(), 3, "catalog: {:?}", items);

    for recipe in &recipes {
        let step = &recipe.steps[0];
        assert_eq!(step.items.len(), 3);
        let salt = step.items.iter().find(|s| s.name() == "Salt").unwrap();
        assert_eq!(salt.amount, 0.5);
        assert_eq!(salt.unit, "tsp");
    }
}
