//! Fuzzy association of item classes with modifier groups.
//!
//! No source table links a class to the groups offered with it, so the link
//! is recovered by comparing class names with group header labels. Every
//! pair at or above the threshold is kept; there is no ranking between
//! groups that match the same class.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::observability::metrics;
use crate::pipeline::processing::groups::GroupHeader;

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static pattern compiles"))
}

/// Lower-case and collapse every run of non `[a-z0-9]` characters to one space
pub fn normalize(s: &str) -> String {
    non_alphanumeric()
        .replace_all(&s.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Length of the longest common subsequence of two character slices
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// `2 * LCS / (|a| + |b|)` over already-normalized strings; 1.0 when both are empty
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_len(&a, &b)) as f64 / total as f64
}

/// Group ids discovered for each class object number, both ascending
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassGroupAssociations {
    by_class: BTreeMap<i64, BTreeSet<i64>>,
}

impl ClassGroupAssociations {
    pub fn insert(&mut self, class_object_number: i64, group_id: i64) {
        self.by_class.entry(class_object_number).or_default().insert(group_id);
    }

    /// Associated group ids for a class in ascending order
    pub fn groups_for(&self, class_object_number: i64) -> Vec<i64> {
        self.by_class
            .get(&class_object_number)
            .map(|groups| groups.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &BTreeSet<i64>)> {
        self.by_class.iter().map(|(class, groups)| (*class, groups))
    }

    pub fn contains(&self, class_object_number: i64, group_id: i64) -> bool {
        self.by_class
            .get(&class_object_number)
            .is_some_and(|groups| groups.contains(&group_id))
    }

    /// Number of distinct (class, group) pairs
    pub fn pair_count(&self) -> usize {
        self.by_class.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_class.is_empty()
    }
}

pub struct AssociationEngine {
    threshold: f64,
}

impl AssociationEngine {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Score every class name against every header label. Cost is
    /// classes × headers, which is fine at catalog scale.
    pub fn associate<'a>(
        &self,
        classes: impl IntoIterator<Item = (i64, &'a str)>,
        headers: &[GroupHeader],
    ) -> ClassGroupAssociations {
        let labels: Vec<(i64, String)> = headers
            .iter()
            .map(|h| (h.group_id, normalize(&h.label)))
            .collect();

        let mut associations = ClassGroupAssociations::default();
        let mut scored = 0usize;
        for (object_number, class_name) in classes {
            let class_name = normalize(class_name);
            for (group_id, label) in &labels {
                scored += 1;
                let score = ratio(&class_name, label);
                if score >= self.threshold {
                    debug!(
                        "Class {} '{}' matches group {} '{}' ({:.3})",
                        object_number, class_name, group_id, label, score
                    );
                    associations.insert(object_number, *group_id);
                }
            }
        }

        info!(
            "Scored {} class/group pairs, kept {} associations at threshold {}",
            scored,
            associations.pair_count(),
            self.threshold
        );
        metrics::association::pairs_scored(scored);
        metrics::association::associations_found(associations.pair_count());
        associations
    }
}
