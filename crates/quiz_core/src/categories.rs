//! crates/quiz_core/src/categories.rs
//!
//! Category hierarchy lookups used to widen a badge's category scope to the
//! whole subtree below it.

use crate::domain::{Category, CategoryId, CategoryScope};
use std::collections::{HashMap, HashSet, VecDeque};

/// Parent/child index built from the flat category list.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    known: HashSet<CategoryId>,
    children: HashMap<CategoryId, Vec<CategoryId>>,
}

impl CategoryTree {
    pub fn new(categories: &[Category]) -> Self {
        let mut tree = Self::default();
        for category in categories {
            tree.known.insert(category.id);
            if let Some(parent_id) = category.parent_id {
                tree.children.entry(parent_id).or_default().push(category.id);
            }
        }
        tree
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.known.contains(&id)
    }

    /// Returns `id` and every category below it, breadth first.
    ///
    /// An id missing from the tree yields an empty scope. Cycles in the
    /// parent links are tolerated.
    pub fn descendants_of(&self, id: CategoryId) -> CategoryScope {
        let mut scope = CategoryScope::new();
        if !self.contains(id) {
            return scope;
        }

        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if !scope.insert(current) {
                continue;
            }
            if let Some(children) = self.children.get(&current) {
                queue.extend(children.iter().copied().filter(|child| !scope.contains(child)));
            }
        }
        scope
    }
}
