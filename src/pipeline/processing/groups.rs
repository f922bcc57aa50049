//! Modifier-group recovery from item definitions.
//!
//! Group headers are definitions whose name starts with a prefix token and a
//! number, e.g. `CG 12 *Choose a Size*`. The number is the group id; the rest
//! of the name becomes the group label. Modifiers live in the reserved class
//! code range and belong to group `class_code - floor`.

use regex::Regex;
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::debug;

use crate::domain::{ItemDefinition, ModifierRef};
use crate::error::{CatalogError, Result};

/// Punctuation trimmed from both ends of a header label
const LABEL_TRIM: &[char] = &['*', '[', ']', '(', ')', '{', '}', ':', '-'];

#[derive(Debug, Clone, PartialEq)]
pub struct GroupHeader {
    pub definition_id: i64,
    pub group_id: i64,
    pub label: String,
}

/// The single test for "is this name a group header"
#[derive(Debug, Clone)]
pub struct HeaderPattern {
    regex: Regex,
}

impl HeaderPattern {
    pub fn new(prefix: &str) -> Result<Self> {
        let pattern = format!(r"(?is)^\s*{}\s*(\d+)(.*)$", regex::escape(prefix.trim()));
        let regex = Regex::new(&pattern)
            .map_err(|e| CatalogError::Config(format!("invalid group header prefix {prefix:?}: {e}")))?;
        Ok(Self { regex })
    }

    /// Group id and label when `name` is a header
    pub fn parse(&self, name: &str) -> Option<(i64, String)> {
        let caps = self.regex.captures(name)?;
        let group_id: i64 = caps.get(1)?.as_str().parse().ok()?;
        let remainder = caps.get(2).map_or("", |m| m.as_str());
        Some((group_id, header_label(group_id, remainder)))
    }

    pub fn is_header(&self, name: &str) -> bool {
        self.parse(name).is_some()
    }
}

/// Label from the text after the group id, or `Group N` when nothing is left
pub fn header_label(group_id: i64, remainder: &str) -> String {
    let trimmed = remainder.trim_matches(|c: char| c.is_whitespace() || LABEL_TRIM.contains(&c));
    if trimmed.is_empty() {
        synthetic_label(group_id)
    } else {
        title_case(trimmed)
    }
}

pub fn synthetic_label(group_id: i64) -> String {
    format!("Group {group_id}")
}

/// Upper-case each letter that follows a non-letter, lower-case the rest
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Every header row plus the label chosen for each group id
#[derive(Debug, Clone, Default)]
pub struct GroupCatalog {
    headers: Vec<GroupHeader>,
    labels: BTreeMap<i64, String>,
}

impl GroupCatalog {
    pub fn build<'a>(
        definitions: impl IntoIterator<Item = &'a ItemDefinition>,
        pattern: &HeaderPattern,
    ) -> Self {
        let mut catalog = Self::default();
        for definition in definitions {
            let Some((group_id, label)) = pattern.parse(definition.display_name()) else {
                continue;
            };
            catalog.labels.entry(group_id).or_insert_with(|| label.clone());
            catalog.headers.push(GroupHeader {
                definition_id: definition.id,
                group_id,
                label,
            });
        }
        debug!("Parsed {} group headers for {} groups", catalog.headers.len(), catalog.labels.len());
        catalog
    }

    /// All header rows in table order; a group id may appear more than once
    pub fn headers(&self) -> &[GroupHeader] {
        &self.headers
    }

    /// First header label seen for the group, else a synthetic one
    pub fn label_for(&self, group_id: i64) -> String {
        self.labels
            .get(&group_id)
            .cloned()
            .unwrap_or_else(|| synthetic_label(group_id))
    }

    pub fn group_count(&self) -> usize {
        self.labels.len()
    }
}

/// Modifiers bucketed by group id, insertion order preserved per bucket
#[derive(Debug, Clone, Default)]
pub struct ModifierBuckets {
    buckets: BTreeMap<i64, Vec<ModifierRef>>,
}

impl ModifierBuckets {
    pub fn collect<'a>(
        definitions: impl IntoIterator<Item = &'a ItemDefinition>,
        pattern: &HeaderPattern,
        modifier_range: Range<i64>,
    ) -> Self {
        let mut buckets: BTreeMap<i64, Vec<ModifierRef>> = BTreeMap::new();
        for definition in definitions {
            let Some(class_code) = definition.class_code else {
                continue;
            };
            if !modifier_range.contains(&class_code) {
                continue;
            }
            let name = definition.display_name();
            if pattern.is_header(name) {
                continue;
            }
            buckets
                .entry(class_code - modifier_range.start)
                .or_default()
                .push(ModifierRef {
                    id: definition.id,
                    name: name.to_string(),
                    class_code,
                });
        }
        Self { buckets }
    }

    pub fn get(&self, group_id: i64) -> &[ModifierRef] {
        self.buckets.get(&group_id).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::test_support::definition;

    fn pattern() -> HeaderPattern {
        HeaderPattern::new("CG").unwrap()
    }

    #[test]
    fn test_parse_header_with_asterisks() {
        assert_eq!(pattern().parse("CG 12 *choose a SIZE*"), Some((12, "Choose A Size".to_string())));
    }

    #[test]
    fn test_parse_header_with_brackets_and_no_space() {
        assert_eq!(pattern().parse("  cg7 [Toppings]"), Some((7, "Toppings".to_string())));
    }

    #[test]
    fn test_header_without_label_gets_synthetic_name() {
        assert_eq!(pattern().parse("CG 30"), Some((30, "Group 30".to_string())));
        assert_eq!(pattern().parse("CG 31 **"), Some((31, "Group 31".to_string())));
    }

    #[test]
    fn test_non_headers() {
        let p = pattern();
        assert!(!p.is_header("Chicken Taco"));
        assert!(!p.is_header("CG Sauce"));
        assert!(!p.is_header("Extra CG 12"));
    }

    #[test]
    fn test_custom_prefix_is_escaped() {
        let p = HeaderPattern::new("MG.").unwrap();
        assert!(p.is_header("MG. 4 Sides"));
        assert!(!p.is_header("MGX 4 Sides"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("extra CHEESE"), "Extra Cheese");
        assert_eq!(title_case("12oz drink"), "12Oz Drink");
    }

    #[test]
    fn test_group_catalog_first_label_wins() {
        let defs = vec![
            definition(1, "CG 5 *Salsas*", None, None),
            definition(2, "CG 5 *Other Salsas*", None, None),
            definition(3, "Taco", Some(10), None),
        ];
        let groups = GroupCatalog::build(&defs, &pattern());
        assert_eq!(groups.headers().len(), 2);
        assert_eq!(groups.group_count(), 1);
        assert_eq!(groups.label_for(5), "Salsas");
        assert_eq!(groups.label_for(6), "Group 6");
    }

    #[test]
    fn test_modifier_buckets() {
        let defs = vec![
            definition(1, "Salsa Verde", Some(90_005), None),
            definition(2, "CG 5 *Salsas*", Some(90_005), None),
            definition(3, "Salsa Roja", Some(90_005), None),
            definition(4, "Taco", Some(10), None),
            definition(5, "Out Of Range", Some(100_000), None),
            definition(6, "No Class", None, None),
        ];
        let buckets = ModifierBuckets::collect(&defs, &pattern(), 90_000..100_000);
        let names: Vec<&str> = buckets.get(5).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Salsa Verde", "Salsa Roja"]);
        assert_eq!(buckets.len(), 1);
        assert!(buckets.get(10_000).is_empty());
    }

    #[test]
    fn test_bucket_ids_near_range_end() {
        let defs = vec![definition(1, "Last Slot", Some(i64::MAX - 1), None)];
        let buckets = ModifierBuckets::collect(&defs, &pattern(), 0..i64::MAX);
        assert_eq!(buckets.get(i64::MAX - 1).len(), 1);
    }
}
