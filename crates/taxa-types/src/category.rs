use serde::{Deserialize, Serialize};

use crate::id::CategoryId;
use crate::label::{Label, LabelSet};

/// One category in its nested transport form.
///
/// This is the shape categories take at the store boundary and during bulk
/// import/export: an owned tree with children embedded in order. The working
/// form used by mutation algorithms is [`crate::Classification`], which
/// stores the same data as an arena addressed by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Composite identifier of this category.
    pub id: CategoryId,
    /// Language-tagged labels, at most one per language.
    pub labels: LabelSet,
    /// Optional external reference (e.g. a linked vocabulary entry).
    pub uri: Option<String>,
    /// Ordered child categories. Order is semantically significant.
    pub children: Vec<Category>,
}

impl Category {
    /// Create a category with no labels, URI, or children.
    pub fn new(id: CategoryId) -> Self {
        Self {
            id,
            labels: LabelSet::new(),
            uri: None,
            children: Vec::new(),
        }
    }

    /// Add a label (builder style).
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.set(label);
        self
    }

    /// Set the external URI (builder style).
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Append child categories (builder style).
    pub fn with_children(mut self, children: impl IntoIterator<Item = Category>) -> Self {
        self.children.extend(children);
        self
    }

    /// Total number of categories in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Category::count).sum::<usize>()
    }

    /// All ids in this subtree in depth-first order, starting with `self`.
    pub fn subtree_ids(&self) -> Vec<CategoryId> {
        let mut ids = Vec::with_capacity(self.count());
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, out: &mut Vec<CategoryId>) {
        out.push(self.id.clone());
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}
