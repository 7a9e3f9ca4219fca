use log::{error, info};
use recipe_ingest::{IngestConfig, IngestResult, MemoryStore, ParserKind, RecipeIngester};
use std::env;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Get the corpus path and optional parser name from command-line arguments
    let args: Vec<String> = env::args().collect();
    let path = args.get(1).ok_or_else(|| {
        format!(
            "Usage: recipe-ingest <file> [parser]\nAvailable parsers: {}",
            ParserKind::available_parsers().join(", ")
        )
    })?;

    let config = IngestConfig::load()?;
    let parser: ParserKind = match args.get(2) {
        Some(name) => name.parse()?,
        None => config.parser.parse()?,
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling run");
            on_interrupt.cancel();
        }
    });

    let store = Arc::new(MemoryStore::new());
    let result = RecipeIngester::builder()
        .file(path)
        .parser(parser)
        .store(store.clone())
        .config(config)
        .cancellation(cancel)
        .build()
        .await;

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            error!("Ingestion of {} failed: {}", path, e);
            return Err(e.into());
        }
    };

    match &result {
        IngestResult::Recipes(recipes) => {
            eprintln!(
                "Saved {} recipes referencing {} items",
                recipes.len(),
                store.items().await.len()
            );
            println!("{}", serde_json::to_string_pretty(recipes)?);
        }
        IngestResult::Items(items) => {
            eprintln!("Saved {} items", items.len());
            println!("{}", serde_json::to_string_pretty(items)?);
        }
    }

    Ok(())
}
