use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while ingesting a corpus
#[derive(Error, Debug)]
pub enum IngestError {
    /// An ingredient line does not match the line grammar
    #[error("Unparsable ingredient: {0}")]
    UnparsableIngredient(String),

    /// Empty or blank name handed to the item resolver
    #[error("Invalid item name: item name is empty")]
    InvalidItemName,

    /// A single record could not be turned into an output
    #[error("Failed to parse record: {0}")]
    RecordParse(String),

    /// The parser selector names no known parser
    #[error("Unknown parser: {0}")]
    UnknownParser(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// The current item catalog could not be read from the store
    #[error("Failed to load items: {0}")]
    CatalogRead(#[source] StoreError),

    /// The store rejected the item catalog flush
    #[error("Failed to save items: {0}")]
    CatalogWrite(#[source] StoreError),

    /// The store rejected the recipe flush
    #[error("Failed to save recipes: {0}")]
    RecipeWrite(#[source] StoreError),

    /// The run was cancelled before every record finished
    #[error("Ingestion cancelled")]
    Cancelled,

    /// The overall deadline elapsed before every record finished
    #[error("Ingestion deadline of {0:?} exceeded")]
    DeadlineExceeded(std::time::Duration),

    /// The task supervising the parse tasks died
    #[error("Pipeline task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),

    /// Failed to read the corpus file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The corpus is not a JSON array of records
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
