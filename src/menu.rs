//! Read-only view of a built items artifact, as served to the ordering
//! service.
//!
//! A `MenuContext` is constructed once at process start and passed by
//! reference to whatever needs it. There is no reload: replacing the artifact
//! means constructing a new context (restarting the consumer).

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::domain::CatalogEntry;
use crate::error::{CatalogError, Result};

#[derive(Debug, Clone)]
pub struct MenuContext {
    items: Vec<CatalogEntry>,
    by_id: HashMap<i64, usize>,
    by_name: HashMap<String, Vec<usize>>,
}

impl MenuContext {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let items: Vec<CatalogEntry> = serde_json::from_str(&content)?;
        let menu = Self::from_items(items)?;
        info!("Loaded menu with {} items from {}", menu.len(), path.display());
        Ok(menu)
    }

    /// Index the items; item ids identify cart lines, so they must be unique
    pub fn from_items(items: Vec<CatalogEntry>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(items.len());
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, item) in items.iter().enumerate() {
            if by_id.insert(item.id, i).is_some() {
                return Err(CatalogError::DuplicateItemId(item.id));
            }
            by_name.entry(name_key(&item.name)).or_default().push(i);
        }
        Ok(Self { items, by_id, by_name })
    }

    pub fn item(&self, id: i64) -> Option<&CatalogEntry> {
        self.by_id.get(&id).map(|&i| &self.items[i])
    }

    /// Items whose name matches ignoring case and surrounding whitespace
    pub fn find_by_name(&self, name: &str) -> Vec<&CatalogEntry> {
        self.by_name
            .get(&name_key(name))
            .map(|indices| indices.iter().map(|&i| &self.items[i]).collect())
            .unwrap_or_default()
    }

    /// Items in artifact order
    pub fn items(&self) -> &[CatalogEntry] {
        &self.items
    }

    pub fn group_count(&self) -> usize {
        self.items.iter().map(|i| i.modifier_groups.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MasterEnrichment;

    fn entry(id: i64, name: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            name: name.to_string(),
            menu_item_class: 10,
            class_name: Some("Tacos".to_string()),
            tax_class: Some(1),
            sales_itemizer: None,
            discount_itemizer: None,
            prices: vec![],
            modifier_groups: vec![],
            master: MasterEnrichment::unresolved(),
        }
    }

    #[test]
    fn test_lookup_by_id_and_name() {
        let menu = MenuContext::from_items(vec![entry(1, "Al Pastor Taco"), entry(2, "Bean Burrito")]).unwrap();
        assert_eq!(menu.item(2).unwrap().name, "Bean Burrito");
        assert!(menu.item(3).is_none());
        assert_eq!(menu.find_by_name(" al pastor TACO ").len(), 1);
        assert!(menu.find_by_name("Nachos").is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = MenuContext::from_items(vec![entry(1, "A"), entry(1, "B")]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateItemId(1)));
    }
}
