//! Row shapes read from the point-of-sale export and the catalog shapes
//! written back out.
//!
//! Input rows tolerate the way spreadsheet exports render numbers: integer
//! columns may arrive as `12.0`, and blanks or `nan` mean "no value".

use serde::{Deserialize, Serialize};

// ============================================================================
// Input rows
// ============================================================================

/// Brand/family-level metadata shared across item variants
#[derive(Debug, Clone, Deserialize)]
pub struct ItemMaster {
    #[serde(rename = "Id", deserialize_with = "cells::int")]
    pub id: i64,
    #[serde(rename = "MajorGroup", default, deserialize_with = "cells::opt_scalar")]
    pub major_group: Option<Scalar>,
    #[serde(rename = "FamilyGroup", default, deserialize_with = "cells::opt_scalar")]
    pub family_group: Option<Scalar>,
    #[serde(rename = "MasterName", default, deserialize_with = "cells::opt_text")]
    pub master_name: Option<String>,
    #[serde(rename = "MenuItemName", default, deserialize_with = "cells::opt_text")]
    pub item_name: Option<String>,
}

/// Category-level attributes of sellable items
#[derive(Debug, Clone, Deserialize)]
pub struct ItemClass {
    #[serde(rename = "ObjectNumber", default, deserialize_with = "cells::opt_int")]
    pub object_number: Option<i64>,
    #[serde(rename = "Name", default, deserialize_with = "cells::opt_text")]
    pub name: Option<String>,
    #[serde(rename = "TaxClass", default, deserialize_with = "cells::opt_int")]
    pub tax_class: Option<i64>,
    #[serde(rename = "SalesItemizer", default, deserialize_with = "cells::opt_int")]
    pub sales_itemizer: Option<i64>,
    #[serde(rename = "DiscountItemizer", default, deserialize_with = "cells::opt_int")]
    pub discount_itemizer: Option<i64>,
    #[serde(rename = "HierarchyId", default, deserialize_with = "cells::opt_int")]
    pub hierarchy_id: Option<i64>,
}

/// One price applicable to an item definition
#[derive(Debug, Clone, Deserialize)]
pub struct PriceRow {
    #[serde(rename = "MenuItemDefID", default, deserialize_with = "cells::opt_int")]
    pub definition_id: Option<i64>,
    #[serde(rename = "HierarchyId", default, deserialize_with = "cells::opt_int")]
    pub hierarchy_id: Option<i64>,
    #[serde(rename = "Price", default, deserialize_with = "cells::opt_float")]
    pub price: Option<f64>,
    #[serde(rename = "MenuLevel", default, deserialize_with = "cells::opt_int")]
    pub menu_level: Option<i64>,
    #[serde(rename = "PriceSequence", default, deserialize_with = "cells::opt_int")]
    pub price_sequence: Option<i64>,
    #[serde(rename = "TaxClass", default, deserialize_with = "cells::opt_int")]
    pub tax_class: Option<i64>,
}

/// A sellable item, modifier, or group header
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDefinition {
    #[serde(rename = "Id", deserialize_with = "cells::int")]
    pub id: i64,
    #[serde(rename = "FirstName", default, deserialize_with = "cells::opt_text")]
    pub name: Option<String>,
    #[serde(rename = "MenuItemClass", default, deserialize_with = "cells::opt_int")]
    pub class_code: Option<i64>,
    #[serde(rename = "MenuItemMasterId", default, deserialize_with = "cells::opt_int")]
    pub master_id: Option<i64>,
}

impl ItemDefinition {
    /// Display name with surrounding whitespace removed; blank when absent
    pub fn display_name(&self) -> &str {
        self.name.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Hierarchy rows are only checked for the presence of an id, so every
/// column is kept as raw text.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct HierarchyRow(pub std::collections::HashMap<String, String>);

impl HierarchyRow {
    pub fn mentions(&self, hierarchy_id: i64) -> bool {
        ["Id", "HierarchyId"].iter().any(|column| {
            self.0
                .get(*column)
                .and_then(|v| cells::parse_int(v.trim()))
                .is_some_and(|v| v == hierarchy_id)
        })
    }
}

/// A cell whose type is inferred from its text: integer, float, or text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn from_cell(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if cells::is_null(s) {
            return None;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Some(Scalar::Int(i));
        }
        if let Ok(f) = s.parse::<f64>() {
            return Some(Scalar::Float(f));
        }
        Some(Scalar::Text(s.to_string()))
    }
}

// ============================================================================
// Catalog shapes
// ============================================================================

/// One resolved price; identity is the exact four-field tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub price: Option<f64>,
    pub menu_level: Option<i64>,
    pub price_sequence: Option<i64>,
    pub tax_class: Option<i64>,
}

impl Price {
    pub fn key(&self) -> PriceKey {
        PriceKey(
            // -0.0 and 0.0 are the same price
            self.price.map(|p| (if p == 0.0 { 0.0f64 } else { p }).to_bits()),
            self.menu_level,
            self.price_sequence,
            self.tax_class,
        )
    }
}

impl From<&PriceRow> for Price {
    fn from(row: &PriceRow) -> Self {
        Self {
            price: row.price,
            menu_level: row.menu_level,
            price_sequence: row.price_sequence,
            tax_class: row.tax_class,
        }
    }
}

/// Hashable dedup key for a [`Price`]; floats compare by bit pattern after
/// folding negative zero into zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceKey(Option<u64>, Option<i64>, Option<i64>, Option<i64>);

/// Lightweight modifier record held in a group bucket
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierRef {
    pub id: i64,
    pub name: String,
    pub class_code: i64,
}

/// A selectable option, with its own prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: i64,
    pub name: String,
    pub menu_item_class: i64,
    pub prices: Vec<Price>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierGroup {
    pub cg_number: i64,
    pub group_name: String,
    pub modifiers: Vec<Modifier>,
}

/// Master enrichment fields. Either all four come from one master row or
/// all four are null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterEnrichment {
    pub major_group: Option<Scalar>,
    pub family_group: Option<Scalar>,
    pub master_name: Option<String>,
    pub menu_item_name: Option<String>,
}

impl MasterEnrichment {
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn is_unresolved(&self) -> bool {
        *self == Self::unresolved()
    }
}

impl From<&ItemMaster> for MasterEnrichment {
    fn from(master: &ItemMaster) -> Self {
        Self {
            major_group: master.major_group.clone(),
            family_group: master.family_group.clone(),
            master_name: master.master_name.clone(),
            menu_item_name: master.item_name.clone(),
        }
    }
}

/// A fully assembled sellable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub menu_item_class: i64,
    pub class_name: Option<String>,
    pub tax_class: Option<i64>,
    pub sales_itemizer: Option<i64>,
    pub discount_itemizer: Option<i64>,
    pub prices: Vec<Price>,
    pub modifier_groups: Vec<ModifierGroup>,
    #[serde(flatten)]
    pub master: MasterEnrichment,
}

/// One row of the class-to-group diagnostic mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassGroupMapping {
    pub class_object_number: i64,
    pub class_name: String,
    pub cg_numbers: String,
}

/// Lenient cell deserializers for export tables
pub(crate) mod cells {
    use super::Scalar;
    use serde::{de, Deserialize, Deserializer};
    use tracing::debug;

    pub fn is_null(s: &str) -> bool {
        s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null")
    }

    /// Integers, including whole-valued floats such as `90012.0`
    pub fn parse_int(s: &str) -> Option<i64> {
        if let Ok(i) = s.parse::<i64>() {
            return Some(i);
        }
        let f = s.parse::<f64>().ok()?;
        if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            Some(f as i64)
        } else {
            None
        }
    }

    fn raw<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value: Option<String> = Option::deserialize(d)?;
        Ok(value.filter(|s| !is_null(s.trim())))
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        raw(d)
    }

    /// Unparseable text is treated like a blank cell
    pub fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(raw(d)?.and_then(|s| {
            let parsed = parse_int(s.trim());
            if parsed.is_none() {
                debug!("Ignoring non-integer cell {:?}", s);
            }
            parsed
        }))
    }

    /// Row keys: a blank or unparseable key rejects the row
    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        match raw(d)? {
            None => Err(de::Error::custom("missing row key")),
            Some(s) => parse_int(s.trim()).ok_or_else(|| de::Error::custom(format!("invalid row key: {s:?}"))),
        }
    }

    pub fn opt_float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(raw(d)?.and_then(|s| {
            let parsed = s.trim().parse::<f64>().ok();
            if parsed.is_none() {
                debug!("Ignoring non-numeric cell {:?}", s);
            }
            parsed
        }))
    }

    pub fn opt_scalar<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Scalar>, D::Error> {
        Ok(raw(d)?.and_then(|s| Scalar::from_cell(&s)))
    }
}
