//! In-memory search backend for tests and embedding.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::document::IndexDocument;
use crate::error::IndexResult;
use crate::traits::{Filter, SearchBackend};

/// An in-memory implementation of [`SearchBackend`].
///
/// Writes are visible immediately; [`SearchBackend::commit`] only counts
/// invocations so tests can assert the synchronizer commits after each
/// batch.
pub struct InMemorySearchBackend {
    docs: RwLock<HashMap<String, IndexDocument>>,
    commits: RwLock<u64>,
}

impl InMemorySearchBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            commits: RwLock::new(0),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.docs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.read().expect("lock poisoned").is_empty()
    }

    /// The stored document with the given id.
    pub fn get(&self, doc_id: &str) -> Option<IndexDocument> {
        self.docs.read().expect("lock poisoned").get(doc_id).cloned()
    }

    /// Returns `true` if a document with the given id is stored.
    pub fn contains(&self, doc_id: &str) -> bool {
        self.docs.read().expect("lock poisoned").contains_key(doc_id)
    }

    /// Full ordered snapshot of the index, for convergence assertions.
    pub fn snapshot(&self) -> BTreeMap<String, IndexDocument> {
        self.docs
            .read()
            .expect("lock poisoned")
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of commits issued so far.
    pub fn commit_count(&self) -> u64 {
        *self.commits.read().expect("lock poisoned")
    }

    fn matches(document: &IndexDocument, filter: &Filter) -> bool {
        match (filter, document) {
            (Filter::All, _) => true,
            (Filter::RootIs(root), IndexDocument::Category(doc)) => doc.root_id == *root,
            (Filter::CategoryIs(id), IndexDocument::Category(doc)) => doc.doc_id == *id,
            (Filter::AncestorIs(id), IndexDocument::Category(doc)) => {
                doc.ancestor_ids.iter().any(|a| a == id)
            }
            (Filter::ObjectIs(object), IndexDocument::Link(doc)) => doc.object_id == *object,
            _ => false,
        }
    }
}

impl Default for InMemorySearchBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemorySearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySearchBackend")
            .field("documents", &self.len())
            .finish()
    }
}

impl SearchBackend for InMemorySearchBackend {
    fn upsert(&self, document: IndexDocument) -> IndexResult<()> {
        let mut docs = self.docs.write().expect("lock poisoned");
        docs.insert(document.doc_id().to_string(), document);
        Ok(())
    }

    fn delete_by_ids(&self, ids: &[String]) -> IndexResult<()> {
        let mut docs = self.docs.write().expect("lock poisoned");
        for id in ids {
            docs.remove(id);
        }
        Ok(())
    }

    fn query_ids(&self, filter: &Filter) -> IndexResult<Vec<String>> {
        let docs = self.docs.read().expect("lock poisoned");
        let mut ids: Vec<String> = docs
            .values()
            .filter(|doc| Self::matches(doc, filter))
            .map(|doc| doc.doc_id().to_string())
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn commit(&self) -> IndexResult<()> {
        *self.commits.write().expect("lock poisoned") += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{CategoryDocument, LinkDocument};
    use taxa_types::{Category, CategoryId, Classification};

    fn sample_docs() -> Vec<IndexDocument> {
        let root = CategoryId::root("A").unwrap();
        let tree = Classification::new(Category::new(root.clone()).with_children(vec![
            Category::new(CategoryId::new("A", "a").unwrap())
                .with_children(vec![Category::new(CategoryId::new("A", "a1").unwrap())]),
        ]))
        .unwrap();
        let mut docs: Vec<IndexDocument> = tree
            .ids()
            .iter()
            .map(|id| IndexDocument::Category(CategoryDocument::project(&tree, id).unwrap()))
            .collect();
        docs.push(IndexDocument::Link(LinkDocument::new(
            "doc_1",
            &CategoryId::new("A", "a1").unwrap(),
            "classification",
        )));
        docs
    }

    #[test]
    fn upsert_replaces_by_doc_id() {
        let backend = InMemorySearchBackend::new();
        for doc in sample_docs() {
            backend.upsert(doc).unwrap();
        }
        assert_eq!(backend.len(), 4);

        // Upserting the same ids again does not grow the index.
        backend.bulk_upsert(sample_docs()).unwrap();
        assert_eq!(backend.len(), 4);
    }

    #[test]
    fn query_by_root() {
        let backend = InMemorySearchBackend::new();
        backend.bulk_upsert(sample_docs()).unwrap();

        let ids = backend.query_ids(&Filter::RootIs("A".into())).unwrap();
        assert_eq!(ids, vec!["A", "A:a", "A:a1"]);
        assert!(backend
            .query_ids(&Filter::RootIs("B".into()))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn query_by_ancestor() {
        let backend = InMemorySearchBackend::new();
        backend.bulk_upsert(sample_docs()).unwrap();

        let ids = backend.query_ids(&Filter::AncestorIs("A:a".into())).unwrap();
        assert_eq!(ids, vec!["A:a1"]);

        let ids = backend.query_ids(&Filter::AncestorIs("A".into())).unwrap();
        assert_eq!(ids, vec!["A:a", "A:a1"]);
    }

    #[test]
    fn query_by_category_and_object() {
        let backend = InMemorySearchBackend::new();
        backend.bulk_upsert(sample_docs()).unwrap();

        assert_eq!(
            backend.query_ids(&Filter::CategoryIs("A:a".into())).unwrap(),
            vec!["A:a"]
        );
        assert_eq!(
            backend.query_ids(&Filter::ObjectIs("doc_1".into())).unwrap(),
            vec!["doc_1$A:a1"]
        );
    }

    #[test]
    fn delete_ignores_unknown_ids() {
        let backend = InMemorySearchBackend::new();
        backend.bulk_upsert(sample_docs()).unwrap();
        backend
            .delete_by_ids(&["A:a1".to_string(), "ghost".to_string()])
            .unwrap();
        assert_eq!(backend.len(), 3);
        assert!(!backend.contains("A:a1"));
    }

    #[test]
    fn commit_is_counted() {
        let backend = InMemorySearchBackend::new();
        assert_eq!(backend.commit_count(), 0);
        backend.commit().unwrap();
        backend.commit().unwrap();
        assert_eq!(backend.commit_count(), 2);
    }
}
