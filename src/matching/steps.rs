use crate::matching::catalog::ItemCatalog;
use crate::matching::similarity::best_match;
use crate::model::{Step, StepItem};
use log::{debug, trace};

/// Links the words of a step description to the recipe's ingredients.
pub struct StepBuilder<'a> {
    catalog: &'a ItemCatalog,
    resolve_threshold: f64,
    link_threshold: f64,
}

impl<'a> StepBuilder<'a> {
    pub fn new(catalog: &'a ItemCatalog, resolve_threshold: f64, link_threshold: f64) -> Self {
        Self {
            catalog,
            resolve_threshold,
            link_threshold,
        }
    }

    /// Build a step from its description and the step items parsed from the
    /// recipe's ingredient list.
    ///
    /// Every word is resolved against the catalog first (which also picks up
    /// tools such as "mixer"), then linked to the most similar known step item.
    /// Words that link to nothing are dropped. Each step item appears at most
    /// once, in order of first mention.
    pub fn build_step(&self, description: &str, known: &[StepItem]) -> Step {
        trace!("Building step from '{}'", description);
        let mut items: Vec<StepItem> = Vec::new();

        for token in description.split_whitespace() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric());

            let resolved = match self.catalog.resolve(token, self.resolve_threshold) {
                Ok(resolved) => resolved.entity,
                Err(e) => {
                    trace!("Skipping token '{}': {}", token, e);
                    continue;
                }
            };

            let Some(linked) = best_match(
                &resolved.name,
                known.iter(),
                |step_item| step_item.name(),
                self.link_threshold,
            ) else {
                continue;
            };

            if items.iter().all(|existing| existing.name() != linked.entity.name()) {
                debug!(
                    "Linked '{}' to step item '{}' ({:.2})",
                    token,
                    linked.entity.name(),
                    linked.score
                );
                items.push(linked.entity.clone());
            }
        }

        Step {
            description: description.to_string(),
            items,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;

    fn step_item(name: &str, amount: f64, unit: &str) -> StepItem {
        StepItem {
            item: Item::named(name),
            amount,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn test_links_mentioned_ingredients() {
        let catalog = ItemCatalog::seeded(vec![Item::named("Flour"), Item::named("Egg")]);
        let known = vec![step_item("Flour", 2.0, "cup"), step_item("Egg", 1.0, "")];

        let step = StepBuilder::new(&catalog, 0.9, 0.5).build_step("mix the flour and egg", &known);

        let names: Vec<&str> = step.items.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Flour", "Egg"]);
        assert_eq!(step.items[0].amount, 2.0);
        assert_eq!(step.items[0].unit, "cup");
        assert_eq!(step.description, "mix the flour and egg");
    }

    #[test]
    fn test_repeated_mentions_are_deduplicated() {
        let catalog = ItemCatalog::new();
        let known = vec![step_item("Butter", 100.0, "g")];

        let step = StepBuilder::new(&catalog, 0.9, 0.5)
            .build_step("Melt the butter. Brush the pan with butter, then chill.", &known);

        assert_eq!(step.items.len(), 1);
        assert_eq!(step.items[0].name(), "Butter");
    }

    #[test]
    fn test_unrelated_words_are_dropped() {
        let catalog = ItemCatalog::new();
        let known = vec![step_item("Sugar", 1.0, "cup")];

        let step = StepBuilder::new(&catalog, 0.9, 0.5).build_step("preheat oven", &known);
        assert!(step.items.is_empty());
    }

    #[test]
    fn test_building_steps_leaves_catalog_untouched() {
        let catalog = ItemCatalog::seeded(vec![Item::named("Flour")]);
        let known = vec![step_item("Flour", 1.0, "cup")];

        StepBuilder::new(&catalog, 0.9, 0.5).build_step("sift the flour twice -- gently", &known);
        assert_eq!(catalog.len(), 1);
    }
}
