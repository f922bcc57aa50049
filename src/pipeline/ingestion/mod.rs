// Pipeline ingestion: reading the five export tables

pub mod loader;

use std::path::Path;
use tracing::{info_span, warn};

use crate::constants::{CLASSES_FILE, DEFINITIONS_FILE, HIERARCHY_FILE, MASTERS_FILE, PRICES_FILE};
use crate::domain::{HierarchyRow, ItemClass, ItemDefinition, ItemMaster, PriceRow};
use crate::error::Result;

pub use loader::{load_table, TextEncoding};

/// The five export tables, loaded once and read-only afterwards
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    pub masters: Vec<ItemMaster>,
    pub classes: Vec<ItemClass>,
    pub prices: Vec<PriceRow>,
    pub definitions: Vec<ItemDefinition>,
    pub hierarchy: Vec<HierarchyRow>,
}

impl SourceTables {
    /// Load every table from `data_dir`. The first table that no encoding can
    /// parse aborts the load.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let span = info_span!("load_tables", data_dir = %data_dir.display());
        let _enter = span.enter();

        Ok(Self {
            masters: load_table(&data_dir.join(MASTERS_FILE))?,
            classes: load_table(&data_dir.join(CLASSES_FILE))?,
            prices: load_table(&data_dir.join(PRICES_FILE))?,
            definitions: load_table(&data_dir.join(DEFINITIONS_FILE))?,
            hierarchy: load_table(&data_dir.join(HIERARCHY_FILE))?,
        })
    }

    /// Warn when the hierarchy table does not list the scope id. The build
    /// still proceeds; classes and prices decide what is in scope.
    pub fn check_hierarchy(&self, hierarchy_id: i64) -> bool {
        let known = self.hierarchy.iter().any(|row| row.mentions(hierarchy_id));
        if !known {
            warn!("Hierarchy id {} is not listed in {}", hierarchy_id, HIERARCHY_FILE);
        }
        known
    }
}
