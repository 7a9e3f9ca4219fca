pub mod builder;
pub mod config;
pub mod error;
pub mod extractors;
pub mod matching;
pub mod model;
pub mod parsers;
pub mod pipelines;
pub mod store;

pub use builder::{IngestResult, InputSource, RecipeIngester, RecipeIngesterBuilder};
pub use config::IngestConfig;
pub use error::IngestError;
pub use model::{Item, MatchResult, RawRecord, Recipe, RecipeProps, Step, StepItem};
pub use parsers::{ParserKind, RecordParser};
pub use store::{MemoryStore, RecipeStore, StoreError};

use std::path::Path;
use std::sync::Arc;

/// Ingest a corpus file with the named parser and save the results to `store`
///
/// # Arguments
/// * `path` - JSON file holding an array of records
/// * `parser` - Parser name, see [`ParserKind::available_parsers`]
/// * `store` - Store that seeds the item catalog and receives the results
///
/// # Example
/// ```no_run
/// use recipe_ingest::{ingest_file, MemoryStore};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let result = ingest_file("cookstr-recipes.json", "cookstr", store).await?;
/// println!("saved {} recipes", result.len());
/// # Ok(())
/// # }
/// ```
pub async fn ingest_file(
    path: impl AsRef<Path>,
    parser: &str,
    store: Arc<dyn RecipeStore>,
) -> Result<IngestResult, IngestError> {
    RecipeIngester::builder()
        .file(path.as_ref())
        .parser(parser.parse()?)
        .store(store)
        .build()
        .await
}
