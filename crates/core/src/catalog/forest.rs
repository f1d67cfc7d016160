//! Navigation helpers over a built category forest.

use serde::{Deserialize, Serialize};

use super::category::CategoryNode;

/// Deepest tree the exports will serialize. Serialization recurses once per
/// level, and real navigation trees stay far below this.
pub const MAX_SERIALIZED_DEPTH: usize = 256;

/// The roots of a category tree, plus lookups used by navigation.
///
/// Serializes as the bare array of roots, which is the export format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryForest {
    roots: Vec<CategoryNode>,
}

impl CategoryForest {
    /// Wrap already built roots.
    #[must_use]
    pub const fn new(roots: Vec<CategoryNode>) -> Self {
        Self { roots }
    }

    /// The top-level categories.
    #[must_use]
    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    /// Consume the forest and return its roots.
    #[must_use]
    pub fn into_roots(self) -> Vec<CategoryNode> {
        self.roots
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes at every depth.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.depth_first().count()
    }

    /// Number of levels; 0 for an empty forest.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut stack: Vec<(&CategoryNode, usize)> =
            self.roots.iter().map(|node| (node, 1)).collect();
        let mut deepest = 0;

        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }

        deepest
    }

    /// Pre-order traversal, roots and children in stored order.
    #[must_use]
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// Find a node by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&CategoryNode> {
        self.depth_first().find(|node| node.id.as_str() == id)
    }

    /// Find a node by slug.
    #[must_use]
    pub fn find_by_slug(&self, slug: &str) -> Option<&CategoryNode> {
        self.depth_first().find(|node| node.slug == slug)
    }

    /// The path from a root down to the node with `id`, inclusive.
    #[must_use]
    pub fn breadcrumbs(&self, id: &str) -> Option<Vec<&CategoryNode>> {
        self.path_to(|node| node.id.as_str() == id)
    }

    /// The path from a root down to the node with `slug`, inclusive.
    ///
    /// Matches on the slug itself, so it ends at the right node even when
    /// the catalog repeats an id.
    #[must_use]
    pub fn breadcrumbs_by_slug(&self, slug: &str) -> Option<Vec<&CategoryNode>> {
        self.path_to(|node| node.slug == slug)
    }

    /// Pre-order search returning the path to the first matching node.
    fn path_to(&self, matches: impl Fn(&CategoryNode) -> bool) -> Option<Vec<&CategoryNode>> {
        let mut stack: Vec<(&CategoryNode, usize)> =
            self.roots.iter().rev().map(|node| (node, 0)).collect();
        let mut path: Vec<&CategoryNode> = Vec::new();

        while let Some((node, depth)) = stack.pop() {
            path.truncate(depth);
            path.push(node);
            if matches(node) {
                return Some(path);
            }
            stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        }

        None
    }
}

impl From<Vec<CategoryNode>> for CategoryForest {
    fn from(roots: Vec<CategoryNode>) -> Self {
        Self::new(roots)
    }
}

/// Iterator returned by [`CategoryForest::depth_first`].
#[derive(Debug)]
pub struct DepthFirst<'a> {
    stack: Vec<&'a CategoryNode>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a CategoryNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{CategoryRecord, build_category_tree};
    use crate::types::CategoryId;

    fn forest() -> CategoryForest {
        let records = vec![
            CategoryRecord::new("1", "elektronik", "Elektronik", None),
            CategoryRecord::new("2", "telefon", "Telefon", Some(CategoryId::new("1"))),
            CategoryRecord::new("3", "kilif", "Kılıf", Some(CategoryId::new("2"))),
            CategoryRecord::new("4", "ev", "Ev", None),
        ];
        CategoryForest::new(build_category_tree(&records))
    }

    #[test]
    fn test_depth_first_is_pre_order() {
        let forest = forest();
        let order: Vec<&str> = forest.depth_first().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["1", "2", "3", "4"]);
        assert_eq!(forest.node_count(), 4);
    }

    #[test]
    fn test_depth() {
        assert_eq!(forest().depth(), 3);
        assert_eq!(CategoryForest::default().depth(), 0);
    }

    #[test]
    fn test_find() {
        let forest = forest();
        assert_eq!(forest.find("3").unwrap().slug, "kilif");
        assert_eq!(forest.find_by_slug("ev").unwrap().id.as_str(), "4");
        assert!(forest.find("99").is_none());
    }

    #[test]
    fn test_breadcrumbs() {
        let forest = forest();
        let path: Vec<&str> = forest
            .breadcrumbs("3")
            .unwrap()
            .into_iter()
            .map(|n| n.slug.as_str())
            .collect();
        assert_eq!(path, vec!["elektronik", "telefon", "kilif"]);

        let path = forest.breadcrumbs("4").unwrap();
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_breadcrumbs_by_slug_with_repeated_id() {
        let records = vec![
            CategoryRecord::new("x", "ilk", "İlk", None),
            CategoryRecord::new("x", "ikinci", "İkinci", Some(CategoryId::new("p"))),
            CategoryRecord::new("p", "ust", "Üst", None),
        ];
        let forest = CategoryForest::new(build_category_tree(&records));

        let path: Vec<&str> = forest
            .breadcrumbs_by_slug("ikinci")
            .unwrap()
            .into_iter()
            .map(|n| n.slug.as_str())
            .collect();
        assert_eq!(path, vec!["ust", "ikinci"]);

        // Looking up by id stops at the first "x" in pre-order
        assert_eq!(forest.breadcrumbs("x").unwrap().len(), 1);
        assert!(forest.breadcrumbs_by_slug("yok").is_none());
    }

    #[test]
    fn test_serializes_as_array() {
        let json = serde_json::to_string(&CategoryForest::default()).unwrap();
        assert_eq!(json, "[]");
    }
}
