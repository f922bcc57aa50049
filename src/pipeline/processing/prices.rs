use std::collections::{HashMap, HashSet};

use crate::domain::{Price, PriceRow};

/// Deduplicated in-scope prices per definition id, built once per run
#[derive(Debug, Clone, Default)]
pub struct PriceResolver {
    by_definition: HashMap<i64, Vec<Price>>,
}

impl PriceResolver {
    pub fn build<'a>(rows: impl IntoIterator<Item = &'a PriceRow>) -> Self {
        let mut by_definition: HashMap<i64, Vec<Price>> = HashMap::new();
        let mut seen = HashSet::new();
        for row in rows {
            let Some(definition_id) = row.definition_id else {
                continue;
            };
            let price = Price::from(row);
            if seen.insert((definition_id, price.key())) {
                by_definition.entry(definition_id).or_default().push(price);
            }
        }
        Self { by_definition }
    }

    /// Distinct prices for `definition_id` in first-seen order; empty when none
    pub fn resolve(&self, definition_id: i64) -> Vec<Price> {
        self.by_definition
            .get(&definition_id)
            .cloned()
            .unwrap_or_default()
    }
}
