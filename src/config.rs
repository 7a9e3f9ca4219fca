use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Ingestion settings
#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Parser used when none is given on the command line
    #[serde(default = "default_parser")]
    pub parser: String,
    /// Minimum similarity for an ingredient name to reuse a catalog item
    #[serde(default = "default_resolve_threshold")]
    pub resolve_threshold: f64,
    /// Minimum similarity for a step token to link to one of the recipe's ingredients
    #[serde(default = "default_link_threshold")]
    pub link_threshold: f64,
    /// Maximum number of records parsed at the same time
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Capacity of the result queue between parse tasks and the collector
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Overall deadline for one run, in seconds
    #[serde(default)]
    pub deadline_secs: Option<u64>,
    /// Only ingest the first N records of the corpus
    #[serde(default)]
    pub record_limit: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            parser: default_parser(),
            resolve_threshold: default_resolve_threshold(),
            link_threshold: default_link_threshold(),
            max_concurrency: default_max_concurrency(),
            queue_capacity: default_queue_capacity(),
            deadline_secs: None,
            record_limit: None,
        }
    }
}

// Default value functions
fn default_parser() -> String {
    "cookstr".to_string()
}

fn default_resolve_threshold() -> f64 {
    0.9
}

fn default_link_threshold() -> f64 {
    0.5
}

fn default_max_concurrency() -> usize {
    64
}

fn default_queue_capacity() -> usize {
    32
}

impl IngestConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_INGEST__ prefix
    /// 2. ingest.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_INGEST__MAX_CONCURRENCY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("resolve_threshold", self.resolve_threshold),
            ("link_threshold", self.link_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Message(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::Message(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Message(
                "queue_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from `ingest.toml` and `RECIPE_INGEST__*` variables
pub fn load_config() -> Result<IngestConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("ingest").required(false))
        .add_source(
            Environment::with_prefix("RECIPE_INGEST")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: IngestConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
