use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use taxa_types::{CategoryId, Classification, TreeError, TreeResult};

/// Search projection of one category.
///
/// Entirely derivable from the authoritative tree; never a source of truth.
/// The cached relational fields (`child_ids`, `parent_id`, `sibling_index`,
/// `ancestor_ids`) are what make the cascade rules necessary: they go stale
/// whenever a neighbouring part of the tree changes shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDocument {
    /// Document id, the category id's display form (`root` or `root:local`).
    pub doc_id: String,
    /// Classification this category belongs to.
    pub root_id: String,
    /// Whether this is the classification's root category.
    pub is_root: bool,
    /// Display text per language tag.
    pub labels: BTreeMap<String, String>,
    /// Optional external reference.
    pub uri: Option<String>,
    /// Document id of the parent category, `None` for the root.
    pub parent_id: Option<String>,
    /// Document ids of the children, in sibling order.
    pub child_ids: Vec<String>,
    /// Position among siblings, `None` for the root.
    pub sibling_index: Option<usize>,
    /// Document ids of all ancestors, root first.
    pub ancestor_ids: Vec<String>,
}

impl CategoryDocument {
    /// Project one category of `tree` into its document.
    pub fn project(tree: &Classification, id: &CategoryId) -> TreeResult<Self> {
        let node = tree.get(id).ok_or_else(|| TreeError::NotFound(id.clone()))?;
        Ok(Self {
            doc_id: id.to_string(),
            root_id: id.root_id().to_string(),
            is_root: id.is_root(),
            labels: node
                .labels
                .iter()
                .map(|label| (label.lang.clone(), label.text.clone()))
                .collect(),
            uri: node.uri.clone(),
            parent_id: node.parent.as_ref().map(CategoryId::to_string),
            child_ids: node.children.iter().map(CategoryId::to_string).collect(),
            sibling_index: tree.sibling_index(id),
            ancestor_ids: tree
                .ancestors(id)
                .iter()
                .map(CategoryId::to_string)
                .collect(),
        })
    }
}

/// Search projection of one explicit link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDocument {
    /// Composite document id: `(object_id)$(category_id)`.
    pub doc_id: String,
    /// The referencing object.
    pub object_id: String,
    /// Display form of the linked category id.
    pub category_id: String,
    /// Semantic link type.
    pub kind: String,
}

impl LinkDocument {
    /// Build the document for one `object → category` link.
    pub fn new(object_id: impl Into<String>, category: &CategoryId, kind: impl Into<String>) -> Self {
        let object_id = object_id.into();
        let category_id = category.to_string();
        Self {
            doc_id: format!("{object_id}${category_id}"),
            object_id,
            category_id,
            kind: kind.into(),
        }
    }
}

/// Any document the secondary index holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexDocument {
    Category(CategoryDocument),
    Link(LinkDocument),
}

impl IndexDocument {
    /// The unique id this document is stored under.
    pub fn doc_id(&self) -> &str {
        match self {
            Self::Category(doc) => &doc.doc_id,
            Self::Link(doc) => &doc.doc_id,
        }
    }
}
