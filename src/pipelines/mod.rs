pub mod flush;
pub mod orchestrator;

pub use flush::{backfill_item_ids, flush_items, flush_recipes, merge_items};
pub use orchestrator::{Orchestrator, PipelineState};

use crate::error::IngestError;
use crate::model::RawRecord;
use log::debug;
use std::path::Path;

/// Read a corpus file: a JSON array of records of any shape.
///
/// Records are not validated here; each one is decoded by its own parse task.
pub async fn load_records(path: &Path) -> Result<Vec<RawRecord>, IngestError> {
    let bytes = tokio::fs::read(path).await?;
    let records: Vec<RawRecord> = serde_json::from_slice(&bytes)?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
