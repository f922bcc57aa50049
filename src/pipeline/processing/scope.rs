use std::collections::HashSet;
use tracing::{info, warn};

use crate::domain::{ItemClass, ItemDefinition, PriceRow};
use crate::observability::metrics;
use crate::pipeline::ingestion::SourceTables;

/// Classes, prices, and definitions restricted to one hierarchy id
#[derive(Debug, Clone)]
pub struct ScopedTables<'a> {
    pub classes: Vec<&'a ItemClass>,
    pub prices: Vec<&'a PriceRow>,
    /// Definitions with at least one in-scope price, unique by id, in table order
    pub definitions: Vec<&'a ItemDefinition>,
}

impl ScopedTables<'_> {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.prices.is_empty()
    }
}

pub struct ScopeFilter {
    hierarchy_id: i64,
}

impl ScopeFilter {
    pub fn new(hierarchy_id: i64) -> Self {
        Self { hierarchy_id }
    }

    pub fn apply<'a>(&self, tables: &'a SourceTables) -> ScopedTables<'a> {
        let in_scope = |id: Option<i64>| id == Some(self.hierarchy_id);

        let classes: Vec<&ItemClass> =
            tables.classes.iter().filter(|c| in_scope(c.hierarchy_id)).collect();
        let prices: Vec<&PriceRow> =
            tables.prices.iter().filter(|p| in_scope(p.hierarchy_id)).collect();

        // Inner join on definition id; the price side is reduced to distinct ids
        // first so a definition with many prices is kept once.
        let priced: HashSet<i64> = prices.iter().filter_map(|p| p.definition_id).collect();
        let mut seen = HashSet::new();
        let definitions: Vec<&ItemDefinition> = tables
            .definitions
            .iter()
            .filter(|d| priced.contains(&d.id) && seen.insert(d.id))
            .collect();

        info!(
            "Scope {}: {} classes, {} prices, {} definitions",
            self.hierarchy_id,
            classes.len(),
            prices.len(),
            definitions.len()
        );
        metrics::scope::definitions_in_scope(definitions.len());

        let scoped = ScopedTables {
            classes,
            prices,
            definitions,
        };
        if scoped.is_empty() {
            warn!("Hierarchy id {} matches no classes or prices", self.hierarchy_id);
        }
        scoped
    }
}
