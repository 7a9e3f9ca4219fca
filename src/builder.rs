use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio_util::sync::CancellationToken;

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::matching::ItemCatalog;
use crate::model::{Item, RawRecord, Recipe};
use crate::parsers::{CookstrParser, ItemListParser, ParseContext, ParserKind};
use crate::pipelines::{flush_items, flush_recipes, load_records, Orchestrator};
use crate::store::RecipeStore;

/// Represents the input source for an ingestion run
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Read a JSON array of records from a file
    File(PathBuf),
    /// Use records already in memory
    Records(Vec<RawRecord>),
}

/// Result of an ingestion run, as saved to the store
#[derive(Debug, Clone)]
pub enum IngestResult {
    /// Recipes with item ids filled in
    Recipes(Vec<Recipe>),
    /// Items with their store ids
    Items(Vec<Item>),
}

impl IngestResult {
    /// Number of saved records
    pub fn len(&self) -> usize {
        match self {
            IngestResult::Recipes(recipes) => recipes.len(),
            IngestResult::Items(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builder for configuring and executing an ingestion run
#[derive(Default)]
pub struct RecipeIngesterBuilder {
    source: Option<InputSource>,
    parser: Option<ParserKind>,
    store: Option<Arc<dyn RecipeStore>>,
    config: Option<IngestConfig>,
    max_concurrency: Option<usize>,
    deadline: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl RecipeIngesterBuilder {
    /// Read records from a JSON file
    ///
    /// # Example
    /// ```
    /// use recipe_ingest::RecipeIngester;
    ///
    /// let builder = RecipeIngester::builder()
    ///     .file("cookstr-recipes.json");
    /// ```
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(InputSource::File(path.into()));
        self
    }

    /// Use records that are already loaded
    pub fn records(mut self, records: Vec<RawRecord>) -> Self {
        self.source = Some(InputSource::Records(records));
        self
    }

    /// Select the record schema. Defaults to the configured parser.
    ///
    /// # Example
    /// ```
    /// use recipe_ingest::{ParserKind, RecipeIngester};
    ///
    /// let builder = RecipeIngester::builder()
    ///     .file("items.json")
    ///     .parser(ParserKind::Items);
    /// ```
    pub fn parser(mut self, parser: ParserKind) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Store that seeds the item catalog and receives the results
    pub fn store(mut self, store: Arc<dyn RecipeStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use explicit settings instead of the defaults
    pub fn config(mut self, config: IngestConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Limit how many records are parsed at the same time
    pub fn max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = Some(max);
        self
    }

    /// Abort the run if parsing takes longer than `duration`
    ///
    /// # Example
    /// ```
    /// use recipe_ingest::RecipeIngester;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeIngester::builder()
    ///     .file("cookstr-recipes.json")
    ///     .deadline(Duration::from_secs(60));
    /// ```
    pub fn deadline(mut self, duration: Duration) -> Self {
        self.deadline = Some(duration);
        self
    }

    /// Cancel the run from outside by cancelling `token`
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build and execute the ingestion run
    ///
    /// # Errors
    /// Returns `IngestError` if:
    /// - No input source or store was specified
    /// - The settings are invalid or name an unknown parser
    /// - The corpus file cannot be read or is not a JSON array
    /// - The run is cancelled or exceeds its deadline
    /// - The store fails to load or save
    ///
    /// Records that fail to parse are skipped, not reported as errors.
    pub async fn build(self) -> Result<IngestResult, IngestError> {
        let source = self.source.ok_or_else(|| {
            IngestError::BuilderError(
                "No input source specified. Use .file() or .records()".to_string(),
            )
        })?;
        let store = self.store.ok_or_else(|| {
            IngestError::BuilderError("No store specified. Use .store()".to_string())
        })?;

        let mut config = self.config.unwrap_or_default();
        if let Some(max) = self.max_concurrency {
            config.max_concurrency = max;
        }
        config.validate()?;

        let parser = match self.parser {
            Some(parser) => parser,
            None => config.parser.parse()?,
        };

        let mut records = match source {
            InputSource::File(path) => load_records(&path).await?,
            InputSource::Records(records) => records,
        };
        if let Some(limit) = config.record_limit {
            if records.len() > limit {
                info!("Limiting run to the first {} of {} records", limit, records.len());
                records.truncate(limit);
            }
        }

        let existing = store.fetch_items().await.map_err(IngestError::CatalogRead)?;
        let context = ParseContext::new(Arc::new(ItemCatalog::seeded(existing)), &config);

        let mut orchestrator = Orchestrator::new(&config);
        if let Some(deadline) = self.deadline {
            orchestrator = orchestrator.with_deadline(Some(deadline));
        }
        if let Some(token) = self.cancel {
            orchestrator = orchestrator.with_cancellation(token);
        }

        match parser {
            ParserKind::Cookstr => {
                let recipes = orchestrator
                    .run(Arc::new(CookstrParser::new()), records, context)
                    .await?;
                let saved = flush_recipes(store.as_ref(), recipes).await?;
                Ok(IngestResult::Recipes(saved))
            }
            ParserKind::Items => {
                let items = orchestrator
                    .run(Arc::new(ItemListParser), records, context)
                    .await?;
                let saved = flush_items(store.as_ref(), items).await?;
                Ok(IngestResult::Items(saved))
            }
        }
    }
}

/// Main entry point for the builder API
pub struct RecipeIngester;

impl RecipeIngester {
    /// Creates a new builder for an ingestion run
    ///
    /// # Example
    /// ```
    /// use recipe_ingest::RecipeIngester;
    ///
    /// let builder = RecipeIngester::builder();
    /// ```
    pub fn builder() -> RecipeIngesterBuilder {
        RecipeIngesterBuilder::default()
    }
}
