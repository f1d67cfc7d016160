//! Category tree construction.
//!
//! The catalog store hands out categories as a flat list where each record
//! may name a parent. Navigation and static exports want the nested form, so
//! [`build_category_tree`] turns the list into a forest of [`CategoryNode`]s.
//!
//! # Degradation
//!
//! Bad parent links never fail the build. A record is promoted to root when
//! its parent is:
//! - missing from the batch (orphan, logged at debug)
//! - the record itself (self-reference, logged at warn)
//! - part of a parent cycle such as `A -> B -> A` (the first cycle member in
//!   record order is promoted, logged at warn)
//!
//! After promotion every input record appears exactly once in the forest.
//!
//! Duplicate ids are the catalog store's problem: the last record with a
//! given id is the one children attach to.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::CategoryId;

/// A category as stored by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

impl CategoryRecord {
    /// Create a record.
    #[must_use]
    pub fn new(
        id: impl Into<CategoryId>,
        slug: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<CategoryId>,
    ) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            name: name.into(),
            parent_id,
        }
    }
}

/// A category in the built tree.
///
/// Building and dropping a tree never recurse. Serializing one does, one
/// level per tree level, so exports refuse trees deeper than
/// [`MAX_SERIALIZED_DEPTH`](super::MAX_SERIALIZED_DEPTH).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    pub children: Vec<CategoryNode>,
}

impl Drop for CategoryNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Data-quality counters collected while building a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Number of input records.
    pub records: usize,
    /// Records whose parent id did not resolve within the batch.
    pub orphans: usize,
    /// Records that named themselves as parent.
    pub self_references: usize,
    /// Parent cycles that were cut by promoting one member to root.
    pub broken_cycles: usize,
}

impl BuildReport {
    /// Whether any record had to be promoted to root.
    #[must_use]
    pub const fn has_promotions(&self) -> bool {
        self.orphans + self.self_references + self.broken_cycles > 0
    }
}

/// Build the category forest from a flat record list.
///
/// Roots and children keep the order of `records` (callers usually pre-sort
/// by name). The output is a fresh structure; `records` is not modified.
#[must_use]
pub fn build_category_tree(records: &[CategoryRecord]) -> Vec<CategoryNode> {
    build_category_tree_with_report(records).0
}

/// Build the category forest and report how many records were promoted.
#[must_use]
pub fn build_category_tree_with_report(
    records: &[CategoryRecord],
) -> (Vec<CategoryNode>, BuildReport) {
    let mut report = BuildReport {
        records: records.len(),
        ..BuildReport::default()
    };

    // Pass 1: id -> arena slot. Last record wins on duplicate ids.
    let slots: HashMap<&str, usize> = records
        .iter()
        .enumerate()
        .map(|(slot, record)| (record.id.as_str(), slot))
        .collect();

    // Pass 2: resolve each record's parent slot.
    let mut parents: Vec<Option<usize>> = records
        .iter()
        .map(|record| resolve_parent(record, &slots, &mut report))
        .collect();

    break_cycles(records, &mut parents, &mut report);

    let roots = materialize(records, &parents);

    if report.has_promotions() {
        debug!(
            records = report.records,
            orphans = report.orphans,
            self_references = report.self_references,
            broken_cycles = report.broken_cycles,
            "Category tree built with root promotions"
        );
    }

    (roots, report)
}

fn resolve_parent(
    record: &CategoryRecord,
    slots: &HashMap<&str, usize>,
    report: &mut BuildReport,
) -> Option<usize> {
    let parent_id = record.parent_id.as_ref()?;

    if parent_id == &record.id {
        report.self_references += 1;
        warn!(category_id = %record.id, "Category is its own parent; promoting to root");
        return None;
    }

    let slot = slots.get(parent_id.as_str()).copied();
    if slot.is_none() {
        report.orphans += 1;
        debug!(
            category_id = %record.id,
            parent_id = %parent_id,
            "Category parent not found; promoting to root"
        );
    }
    slot
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Walk each parent chain once, cutting any cycle it closes.
///
/// Every slot has at most one parent, so a chain either reaches a root, joins
/// an already finished chain, or loops back onto itself. In the last case the
/// loop is exactly the tail of the current path.
fn break_cycles(records: &[CategoryRecord], parents: &mut [Option<usize>], report: &mut BuildReport) {
    let mut marks = vec![Mark::Unvisited; parents.len()];
    let mut path: Vec<usize> = Vec::new();

    for start in 0..parents.len() {
        path.clear();
        let mut cursor = Some(start);

        while let Some(slot) = cursor {
            match marks.get(slot).copied() {
                Some(Mark::Unvisited) => {
                    if let Some(mark) = marks.get_mut(slot) {
                        *mark = Mark::InProgress;
                    }
                    path.push(slot);
                    cursor = parents.get(slot).copied().flatten();
                }
                Some(Mark::InProgress) => {
                    let start_of_loop = path.iter().position(|&s| s == slot).unwrap_or(0);
                    let cycle = path.get(start_of_loop..).unwrap_or_default();
                    if let Some(&head) = cycle.iter().min() {
                        if let Some(parent) = parents.get_mut(head) {
                            *parent = None;
                        }
                        report.broken_cycles += 1;
                        let ids: Vec<&str> = cycle
                            .iter()
                            .filter_map(|&s| records.get(s))
                            .map(|r| r.id.as_str())
                            .collect();
                        warn!(
                            category_id = records.get(head).map_or("", |r| r.id.as_str()),
                            cycle = ?ids,
                            "Category parent cycle detected; promoting to root"
                        );
                    }
                    cursor = None;
                }
                Some(Mark::Done) | None => cursor = None,
            }
        }

        for &slot in &path {
            if let Some(mark) = marks.get_mut(slot) {
                *mark = Mark::Done;
            }
        }
    }
}

/// Assemble nodes bottom-up with an explicit stack.
fn materialize(records: &[CategoryRecord], parents: &[Option<usize>]) -> Vec<CategoryNode> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots: Vec<usize> = Vec::new();

    for (slot, parent) in parents.iter().enumerate() {
        match parent.and_then(|p| children.get_mut(p)) {
            Some(siblings) => siblings.push(slot),
            None => roots.push(slot),
        }
    }

    let mut built: Vec<Option<CategoryNode>> = (0..records.len()).map(|_| None).collect();
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&slot| (slot, false)).collect();

    while let Some((slot, expanded)) = stack.pop() {
        let kids = children.get(slot).map_or(&[][..], Vec::as_slice);
        if expanded {
            let Some(record) = records.get(slot) else {
                continue;
            };
            let node = CategoryNode {
                id: record.id.clone(),
                slug: record.slug.clone(),
                name: record.name.clone(),
                children: kids
                    .iter()
                    .filter_map(|&kid| built.get_mut(kid).and_then(Option::take))
                    .collect(),
            };
            if let Some(cell) = built.get_mut(slot) {
                *cell = Some(node);
            }
        } else {
            stack.push((slot, true));
            stack.extend(kids.iter().rev().map(|&kid| (kid, false)));
        }
    }

    roots
        .iter()
        .filter_map(|&slot| built.get_mut(slot).and_then(Option::take))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::catalog::CategoryForest;

    fn record(id: &str, parent: Option<&str>) -> CategoryRecord {
        CategoryRecord::new(id, format!("slug-{id}"), format!("Category {id}"), parent.map(CategoryId::from))
    }

    fn ids(nodes: &[CategoryNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_orphan_is_promoted() {
        let records = vec![record("1", None), record("2", Some("1")), record("3", Some("99"))];
        let (roots, report) = build_category_tree_with_report(&records);

        assert_eq!(ids(&roots), vec!["1", "3"]);
        assert_eq!(ids(&roots[0].children), vec!["2"]);
        assert!(roots[1].children.is_empty());
        assert_eq!(report.orphans, 1);
    }

    #[test]
    fn test_self_reference_is_root() {
        let (roots, report) = build_category_tree_with_report(&[record("1", Some("1"))]);

        assert_eq!(ids(&roots), vec!["1"]);
        assert!(roots[0].children.is_empty());
        assert_eq!(report.self_references, 1);
    }

    #[test]
    fn test_child_before_parent_still_attaches() {
        let records = vec![record("kid", Some("mom")), record("mom", None)];
        let roots = build_category_tree(&records);

        assert_eq!(ids(&roots), vec!["mom"]);
        assert_eq!(ids(&roots[0].children), vec!["kid"]);
    }

    #[test]
    fn test_preserves_record_order() {
        let records = vec![
            record("b", None),
            record("a", None),
            record("b2", Some("b")),
            record("b1", Some("b")),
        ];
        let roots = build_category_tree(&records);

        assert_eq!(ids(&roots), vec!["b", "a"]);
        assert_eq!(ids(&roots[0].children), vec!["b2", "b1"]);
    }

    #[test]
    fn test_every_record_visited_once() {
        let records = vec![
            record("electronics", None),
            record("phones", Some("electronics")),
            record("android", Some("phones")),
            record("ios", Some("phones")),
            record("home", None),
            record("kitchen", Some("home")),
            record("lost", Some("gone")),
        ];
        let forest = CategoryForest::new(build_category_tree(&records));

        let mut seen: Vec<&str> = forest.depth_first().map(|n| n.id.as_str()).collect();
        assert_eq!(seen.len(), records.len());
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), records.len());
    }

    #[test]
    fn test_two_node_cycle_is_broken() {
        let records = vec![record("a", Some("b")), record("b", Some("a"))];
        let (roots, report) = build_category_tree_with_report(&records);

        assert_eq!(report.broken_cycles, 1);
        assert_eq!(ids(&roots), vec!["a"]);
        assert_eq!(ids(&roots[0].children), vec!["b"]);
    }

    #[test]
    fn test_long_cycle_with_tail() {
        // tail -> c1 -> c2 -> c3 -> c1
        let records = vec![
            record("tail", Some("c1")),
            record("c1", Some("c2")),
            record("c2", Some("c3")),
            record("c3", Some("c1")),
            record("root", None),
        ];
        let (roots, report) = build_category_tree_with_report(&records);
        let forest = CategoryForest::new(roots);

        assert_eq!(report.broken_cycles, 1);
        assert_eq!(forest.node_count(), records.len());
        assert_eq!(ids(forest.roots()), vec!["c1", "root"]);
        let crumbs: Vec<&str> = forest
            .breadcrumbs("tail")
            .unwrap()
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(crumbs, vec!["c1", "tail"]);
    }

    #[test]
    fn test_duplicate_ids_do_not_crash() {
        let records = vec![record("x", None), record("x", None), record("y", Some("x"))];
        let roots = build_category_tree(&records);

        assert_eq!(ids(&roots), vec!["x", "x"]);
        assert!(roots[0].children.is_empty());
        assert_eq!(ids(&roots[1].children), vec!["y"]);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let records: Vec<CategoryRecord> = (0..50_000)
            .map(|i| {
                let parent = (i > 0).then(|| (i - 1).to_string());
                record(&i.to_string(), parent.as_deref())
            })
            .collect();
        let (roots, report) = build_category_tree_with_report(&records);

        assert_eq!(roots.len(), 1);
        assert!(!report.has_promotions());

        let forest = CategoryForest::new(roots);
        assert_eq!(forest.node_count(), 50_000);
        let crumbs = forest.breadcrumbs("49999").unwrap();
        assert_eq!(crumbs.len(), 50_000);
        drop(crumbs);
        // Dropping the whole chain must not overflow the stack
        drop(forest);
    }

    #[test]
    fn test_serialized_shape() {
        let roots = build_category_tree(&[record("1", None), record("2", Some("1"))]);
        let json = serde_json::to_value(&roots).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{
                "id": "1",
                "slug": "slug-1",
                "name": "Category 1",
                "children": [{
                    "id": "2",
                    "slug": "slug-2",
                    "name": "Category 2",
                    "children": []
                }]
            }])
        );
    }

    #[test]
    fn test_record_parent_id_is_optional_on_the_wire() {
        let record: CategoryRecord =
            serde_json::from_str(r#"{"id":"1","slug":"tv","name":"TV"}"#).unwrap();
        assert!(record.parent_id.is_none());

        let record: CategoryRecord =
            serde_json::from_str(r#"{"id":"2","slug":"oled","name":"OLED","parentId":null}"#)
                .unwrap();
        assert!(record.parent_id.is_none());
    }
}
