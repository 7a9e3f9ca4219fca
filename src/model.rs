use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One loosely-typed element of a corpus file. Decoded into a parser-specific
/// schema inside the task that owns it.
pub type RawRecord = serde_json::Value;

/// Canonical ingredient or tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Assigned by the store on first persistence
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub item_type: String,
    #[serde(rename = "imgUrl", default, skip_serializing_if = "String::is_empty")]
    pub img_url: String,
}

impl Item {
    pub fn named(name: impl Into<String>) -> Self {
        Item {
            name: name.into(),
            ..Default::default()
        }
    }

    /// How complete this item is, from 0 (empty) to 4 (id, image, name and type).
    pub fn quality(&self) -> u8 {
        [
            self.id.is_some(),
            !self.img_url.is_empty(),
            !self.name.is_empty(),
            !self.item_type.is_empty(),
        ]
        .iter()
        .filter(|present| **present)
        .count() as u8
    }
}

/// A canonical item bound to the quantity of one ingredient line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepItem {
    #[serde(flatten)]
    pub item: Item,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
}

impl StepItem {
    pub fn name(&self) -> &str {
        &self.item.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<StepItem>,
    /// Minutes; 0 when unknown
    #[serde(default)]
    pub duration: u32,
    #[serde(rename = "imgUrl", default, skip_serializing_if = "String::is_empty")]
    pub img_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeProps {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(rename = "imgUrl", default, skip_serializing_if = "String::is_empty")]
    pub img_url: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub author: String,
    pub description: String,
    #[serde(default)]
    pub props: RecipeProps,
    pub steps: Vec<Step>,
}

impl Recipe {
    /// Every item referenced by any step, in step order, duplicates included.
    pub fn items(&self) -> Vec<Item> {
        self.step_items().map(|step_item| step_item.item.clone()).collect()
    }

    pub fn step_items(&self) -> impl Iterator<Item = &StepItem> {
        self.steps.iter().flat_map(|step| step.items.iter())
    }

    pub fn step_items_mut(&mut self) -> impl Iterator<Item = &mut StepItem> {
        self.steps.iter_mut().flat_map(|step| step.items.iter_mut())
    }
}

/// Outcome of a similarity lookup. `success` is false when nothing reached
/// the threshold; `entity` is then whatever the caller falls back to.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<T> {
    pub entity: T,
    pub score: f64,
    pub success: bool,
}

impl<T> MatchResult<T> {
    pub fn matched(entity: T, score: f64) -> Self {
        MatchResult {
            entity,
            score,
            success: true,
        }
    }

    pub fn unmatched(entity: T) -> Self {
        MatchResult {
            entity,
            score: 0.0,
            success: false,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MatchResult<U> {
        MatchResult {
            entity: f(self.entity),
            score: self.score,
            success: self.success,
        }
    }
}
