pub mod catalog;
pub mod similarity;
pub mod steps;

pub use catalog::ItemCatalog;
pub use similarity::{best_match, comparison_key, name_similarity, similarity};
pub use steps::StepBuilder;
