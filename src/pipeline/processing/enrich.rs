use std::collections::HashMap;

use crate::domain::{ItemMaster, MasterEnrichment};

/// Joins definitions to their item-master rows. The first master row wins
/// when an id repeats.
#[derive(Debug, Clone, Default)]
pub struct MasterEnricher {
    by_id: HashMap<i64, MasterEnrichment>,
}

impl MasterEnricher {
    pub fn build<'a>(masters: impl IntoIterator<Item = &'a ItemMaster>) -> Self {
        let mut by_id = HashMap::new();
        for master in masters {
            by_id
                .entry(master.id)
                .or_insert_with(|| MasterEnrichment::from(master));
        }
        Self { by_id }
    }

    /// All four fields from the referenced master, or all four null when the
    /// reference is absent, zero, or unknown
    pub fn enrich(&self, master_id: Option<i64>) -> MasterEnrichment {
        master_id
            .filter(|&id| id != 0)
            .and_then(|id| self.by_id.get(&id))
            .cloned()
            .unwrap_or_else(MasterEnrichment::unresolved)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
