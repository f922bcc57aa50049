//! Catalog assembly: turns scoped definitions into nested catalog entries
//! and the flat modifier inventory.

pub mod mapping;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{CatalogEntry, ClassGroupMapping, ItemDefinition, Modifier, ModifierGroup};
use crate::observability::metrics;
use crate::pipeline::processing::association::ClassGroupAssociations;
use crate::pipeline::processing::enrich::MasterEnricher;
use crate::pipeline::processing::groups::{GroupCatalog, HeaderPattern, ModifierBuckets};
use crate::pipeline::processing::index::{ClassIndex, ClassRecord};
use crate::pipeline::processing::prices::PriceResolver;

pub use mapping::class_group_mapping;

/// Where a scoped definition ends up. Exactly one applies to each definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionRole {
    /// Name encodes a group id and label
    GroupHeader,
    /// Class code at or above the modifier floor
    Modifier,
    /// Class code below the floor and present in the class index
    Item,
    /// No class code, or a class code the index does not know
    Dropped,
}

/// Per-role counts for one assembly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub group_headers: usize,
    pub items: usize,
    pub modifiers: usize,
    pub dropped: usize,
}

/// The three artifacts of a build, in output order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub modifiers: Vec<Modifier>,
    pub mapping: Vec<ClassGroupMapping>,
    pub stats: CatalogStats,
}

/// Read-only views over the lookups built earlier in the run
pub struct CatalogAssembler<'a> {
    pub classes: &'a ClassIndex,
    pub prices: &'a PriceResolver,
    pub groups: &'a GroupCatalog,
    pub buckets: &'a ModifierBuckets,
    pub associations: &'a ClassGroupAssociations,
    pub enricher: &'a MasterEnricher,
    pub pattern: &'a HeaderPattern,
    pub modifier_floor: i64,
}

impl CatalogAssembler<'_> {
    pub fn classify(&self, definition: &ItemDefinition) -> DefinitionRole {
        if self.pattern.is_header(definition.display_name()) {
            return DefinitionRole::GroupHeader;
        }
        match definition.class_code {
            None => DefinitionRole::Dropped,
            Some(code) if code >= self.modifier_floor => DefinitionRole::Modifier,
            Some(code) if self.classes.contains(code) => DefinitionRole::Item,
            Some(_) => DefinitionRole::Dropped,
        }
    }

    /// A group with its own copy of every modifier and their prices
    fn build_group(&self, group_id: i64) -> ModifierGroup {
        let modifiers = self
            .buckets
            .get(group_id)
            .iter()
            .map(|m| Modifier {
                id: m.id,
                name: m.name.clone(),
                menu_item_class: m.class_code,
                prices: self.prices.resolve(m.id),
            })
            .collect();
        ModifierGroup {
            cg_number: group_id,
            group_name: self.groups.label_for(group_id),
            modifiers,
        }
    }

    fn build_entry(&self, definition: &ItemDefinition, class: &ClassRecord) -> CatalogEntry {
        let modifier_groups = self
            .associations
            .groups_for(class.object_number)
            .into_iter()
            .map(|group_id| self.build_group(group_id))
            .collect();

        CatalogEntry {
            id: definition.id,
            name: definition.display_name().to_string(),
            menu_item_class: class.object_number,
            class_name: class.name.clone(),
            tax_class: class.tax_class,
            sales_itemizer: class.sales_itemizer,
            discount_itemizer: class.discount_itemizer,
            prices: self.prices.resolve(definition.id),
            modifier_groups,
            master: self.enricher.enrich(definition.master_id),
        }
    }

    pub fn assemble(&self, definitions: &[&ItemDefinition]) -> Catalog {
        let mut catalog = Catalog::default();

        for &definition in definitions {
            match self.classify(definition) {
                DefinitionRole::GroupHeader => catalog.stats.group_headers += 1,
                DefinitionRole::Modifier => {
                    catalog.stats.modifiers += 1;
                    catalog.modifiers.push(Modifier {
                        id: definition.id,
                        name: definition.display_name().to_string(),
                        // Modifier role implies a class code
                        menu_item_class: definition.class_code.unwrap_or(self.modifier_floor),
                        prices: self.prices.resolve(definition.id),
                    });
                }
                DefinitionRole::Item => {
                    let Some(class) = definition.class_code.and_then(|c| self.classes.get(c)) else {
                        continue;
                    };
                    catalog.stats.items += 1;
                    catalog.entries.push(self.build_entry(definition, class));
                }
                DefinitionRole::Dropped => {
                    debug!("Dropping definition {}: class {:?} not in scope", definition.id, definition.class_code);
                    catalog.stats.dropped += 1;
                }
            }
        }

        catalog.mapping = class_group_mapping(self.associations, self.classes);

        info!(
            "Assembled {} items, {} modifiers ({} headers, {} dropped)",
            catalog.stats.items, catalog.stats.modifiers, catalog.stats.group_headers, catalog.stats.dropped
        );
        metrics::catalog::assembled(&catalog.stats);
        catalog
    }
}
