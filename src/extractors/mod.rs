use crate::error::IngestError;
use crate::model::{Item, StepItem};

pub mod amount;
mod ingredient_line;

pub use self::amount::{parse_amount, parse_unit};
pub use self::ingredient_line::{title_case, CookstrIngredientExtractor};

/// Category tag carried by every item extracted from an ingredient list
pub const INGREDIENT_CATEGORY: &str = "ingredient";

/// An ingredient line split into its parts, before the name is resolved
/// against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientDraft {
    pub amount: f64,
    pub unit: String,
    pub name: String,
    pub category: &'static str,
}

impl IngredientDraft {
    /// Bind the draft's quantity to a resolved catalog item
    pub fn into_step_item(self, item: Item) -> StepItem {
        StepItem {
            item,
            amount: self.amount,
            unit: self.unit,
        }
    }
}

/// Splits one free-text ingredient line into amount, unit and name.
pub trait IngredientExtractor: Send + Sync {
    fn extract(&self, line: &str) -> Result<IngredientDraft, IngestError>;
}
