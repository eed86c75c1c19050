//! In-memory category store for tests and embedding.
//!
//! [`InMemoryCategoryStore`] keeps every classification in a `HashMap`
//! behind a `RwLock`. Each classification is mutated in place under the
//! write lock; the [`taxa_types::Classification`] algorithms validate
//! before touching the tree, so a failed operation leaves the stored tree
//! untouched (the per-subtree atomicity the trait requires).

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use taxa_types::{Category, CategoryId, Classification, Label, LabelSet};

use crate::error::{StoreError, StoreResult};
use crate::traits::CategoryStore;

/// An in-memory implementation of [`CategoryStore`].
///
/// Data is lost when the store is dropped. Reads hand out clones.
pub struct InMemoryCategoryStore {
    classifications: RwLock<HashMap<String, Classification>>,
}

impl InMemoryCategoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            classifications: RwLock::new(HashMap::new()),
        }
    }

    /// Number of classifications currently stored.
    pub fn len(&self) -> usize {
        self.classifications.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no classification is stored.
    pub fn is_empty(&self) -> bool {
        self.classifications
            .read()
            .expect("lock poisoned")
            .is_empty()
    }

    /// Remove all classifications.
    pub fn clear(&self) {
        self.classifications.write().expect("lock poisoned").clear();
    }

    /// Run a closure over the mutable classification owning `root_id`.
    fn with_tree_mut<T>(
        &self,
        root_id: &str,
        f: impl FnOnce(&mut Classification) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut map = self.classifications.write().expect("lock poisoned");
        let tree = map
            .get_mut(root_id)
            .ok_or_else(|| StoreError::RootNotFound(root_id.to_string()))?;
        f(tree)
    }
}

impl Default for InMemoryCategoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryCategoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCategoryStore")
            .field("classifications", &self.len())
            .finish()
    }
}

impl CategoryStore for InMemoryCategoryStore {
    fn exists(&self, id: &CategoryId) -> StoreResult<bool> {
        let map = self.classifications.read().expect("lock poisoned");
        Ok(map
            .get(id.root_id())
            .map(|tree| tree.contains(id))
            .unwrap_or(false))
    }

    fn root_ids(&self) -> StoreResult<Vec<CategoryId>> {
        let map = self.classifications.read().expect("lock poisoned");
        let mut ids: Vec<CategoryId> = map.values().map(|t| t.root_id().clone()).collect();
        ids.sort();
        Ok(ids)
    }

    fn retrieve(&self, root_id: &str) -> StoreResult<Classification> {
        let map = self.classifications.read().expect("lock poisoned");
        map.get(root_id)
            .cloned()
            .ok_or_else(|| StoreError::RootNotFound(root_id.to_string()))
    }

    fn add_category(
        &self,
        parent: Option<&CategoryId>,
        category: Category,
        position: Option<usize>,
    ) -> StoreResult<()> {
        match parent {
            None => {
                let tree = Classification::new(category)?;
                let root_id = tree.root_id().clone();
                let mut map = self.classifications.write().expect("lock poisoned");
                if map.contains_key(root_id.root_id()) {
                    return Err(StoreError::DuplicateId(root_id));
                }
                debug!(root = %root_id, categories = tree.len(), "classification created");
                map.insert(root_id.root_id().to_string(), tree);
                Ok(())
            }
            Some(parent_id) => self.with_tree_mut(parent_id.root_id(), |tree| {
                let id = category.id.clone();
                tree.insert(parent_id, category, position)?;
                debug!(category = %id, parent = %parent_id, "category added");
                Ok(())
            }),
        }
    }

    fn delete_category(&self, id: &CategoryId) -> StoreResult<Vec<CategoryId>> {
        self.with_tree_mut(id.root_id(), |tree| {
            let removed = tree.remove_subtree(id)?;
            debug!(category = %id, removed = removed.len(), "category deleted");
            Ok(removed)
        })
    }

    fn move_category(
        &self,
        id: &CategoryId,
        new_parent: &CategoryId,
        index: usize,
    ) -> StoreResult<()> {
        self.with_tree_mut(id.root_id(), |tree| {
            tree.move_to(id, new_parent, index)?;
            debug!(category = %id, new_parent = %new_parent, index, "category moved");
            Ok(())
        })
    }

    fn replace_classification(&self, new_tree: Category) -> StoreResult<Vec<CategoryId>> {
        let root_id = new_tree.id.root_id().to_string();
        let replacement = Classification::new(new_tree)?;
        let mut map = self.classifications.write().expect("lock poisoned");
        let old = map
            .get(&root_id)
            .ok_or_else(|| StoreError::RootNotFound(root_id.clone()))?;
        let removed: Vec<CategoryId> = old
            .ids()
            .into_iter()
            .filter(|id| !replacement.contains(id))
            .collect();
        debug!(
            root = %root_id,
            categories = replacement.len(),
            removed = removed.len(),
            "classification replaced"
        );
        map.insert(root_id, replacement);
        Ok(removed)
    }

    fn delete_classification(&self, root_id: &str) -> StoreResult<Vec<CategoryId>> {
        let mut map = self.classifications.write().expect("lock poisoned");
        let tree = map
            .remove(root_id)
            .ok_or_else(|| StoreError::RootNotFound(root_id.to_string()))?;
        debug!(root = %root_id, removed = tree.len(), "classification deleted");
        Ok(tree.ids())
    }

    fn set_labels(&self, id: &CategoryId, labels: LabelSet) -> StoreResult<()> {
        self.with_tree_mut(id.root_id(), |tree| Ok(tree.set_labels(id, labels)?))
    }

    fn set_label(&self, id: &CategoryId, label: Label) -> StoreResult<()> {
        self.with_tree_mut(id.root_id(), |tree| {
            tree.set_label(id, label)?;
            Ok(())
        })
    }

    fn remove_label(&self, id: &CategoryId, lang: &str) -> StoreResult<bool> {
        self.with_tree_mut(id.root_id(), |tree| Ok(tree.remove_label(id, lang)?))
    }

    fn set_uri(&self, id: &CategoryId, uri: Option<String>) -> StoreResult<()> {
        self.with_tree_mut(id.root_id(), |tree| Ok(tree.set_uri(id, uri)?))
    }

    fn move_up(&self, id: &CategoryId) -> StoreResult<Option<CategoryId>> {
        self.with_tree_mut(id.root_id(), |tree| Ok(tree.move_up(id)?))
    }

    fn move_down(&self, id: &CategoryId) -> StoreResult<Option<CategoryId>> {
        self.with_tree_mut(id.root_id(), |tree| Ok(tree.move_down(id)?))
    }

    fn promote(&self, id: &CategoryId) -> StoreResult<Option<(CategoryId, CategoryId)>> {
        self.with_tree_mut(id.root_id(), |tree| Ok(tree.promote(id)?))
    }

    fn demote(&self, id: &CategoryId) -> StoreResult<Option<(CategoryId, CategoryId)>> {
        self.with_tree_mut(id.root_id(), |tree| Ok(tree.demote(id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxa_types::TreeError;

    fn cid(local: &str) -> CategoryId {
        if local == "A" {
            CategoryId::root("A").unwrap()
        } else {
            CategoryId::new("A", local).unwrap()
        }
    }

    /// Store seeded with classification A: root -> [a -> [a1], b].
    fn seeded_store() -> InMemoryCategoryStore {
        let store = InMemoryCategoryStore::new();
        let root = Category::new(cid("A")).with_children(vec![
            Category::new(cid("a"))
                .with_children(vec![Category::new(cid("a1"))]),
            Category::new(cid("b")),
        ]);
        store.add_category(None, root, None).unwrap();
        store
    }

    #[test]
    fn create_and_retrieve_classification() {
        let store = seeded_store();
        assert_eq!(store.len(), 1);

        let tree = store.retrieve("A").unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root_id(), &cid("A"));
    }

    #[test]
    fn retrieve_missing_classification() {
        let store = InMemoryCategoryStore::new();
        let err = store.retrieve("nope").unwrap_err();
        assert!(matches!(err, StoreError::RootNotFound(_)));
    }

    #[test]
    fn create_duplicate_classification_rejected() {
        let store = seeded_store();
        let err = store
            .add_category(None, Category::new(cid("A")), None)
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)));
    }

    #[test]
    fn create_classification_from_non_root_rejected() {
        let store = InMemoryCategoryStore::new();
        let err = store
            .add_category(None, Category::new(CategoryId::new("A", "a").unwrap()), None)
            .unwrap_err();
        assert!(matches!(err, StoreError::Tree(TreeError::NotARoot(_))));
    }

    #[test]
    fn exists_checks_whole_store() {
        let store = seeded_store();
        assert!(store.exists(&cid("a1")).unwrap());
        assert!(!store.exists(&cid("ghost")).unwrap());
        assert!(!store.exists(&CategoryId::new("B", "x").unwrap()).unwrap());
    }

    #[test]
    fn root_ids_sorted() {
        let store = seeded_store();
        store
            .add_category(None, Category::new(CategoryId::root("B").unwrap()), None)
            .unwrap();
        let roots = store.root_ids().unwrap();
        assert_eq!(roots.len(), 2);
        assert!(roots.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn add_category_under_parent() {
        let store = seeded_store();
        store
            .add_category(Some(&cid("b")), Category::new(cid("b1")), None)
            .unwrap();
        let tree = store.retrieve("A").unwrap();
        assert_eq!(tree.get(&cid("b")).unwrap().children, vec![cid("b1")]);
    }

    #[test]
    fn add_duplicate_category_rejected_and_store_unchanged() {
        let store = seeded_store();
        let before = store.retrieve("A").unwrap();
        let err = store
            .add_category(Some(&cid("b")), Category::new(cid("a1")), None)
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)));
        assert_eq!(store.retrieve("A").unwrap(), before);
    }

    #[test]
    fn get_category_with_depth() {
        let store = seeded_store();
        let full = store.get_category(&cid("A"), -1).unwrap();
        assert_eq!(full.count(), 4);

        let alone = store.get_category(&cid("a"), 0).unwrap();
        assert_eq!(alone.count(), 1);
    }

    #[test]
    fn delete_category_returns_subtree_ids() {
        let store = seeded_store();
        let removed = store.delete_category(&cid("a")).unwrap();
        assert_eq!(removed, vec![cid("a"), cid("a1")]);
        assert!(!store.exists(&cid("a1")).unwrap());
    }

    #[test]
    fn delete_root_category_refused() {
        let store = seeded_store();
        let err = store.delete_category(&cid("A")).unwrap_err();
        assert!(matches!(err, StoreError::Tree(TreeError::RootIsFixed)));
    }

    #[test]
    fn move_category_between_parents() {
        let store = seeded_store();
        store.move_category(&cid("a1"), &cid("b"), 0).unwrap();
        let tree = store.retrieve("A").unwrap();
        assert!(tree.get(&cid("a")).unwrap().children.is_empty());
        assert_eq!(tree.get(&cid("b")).unwrap().children, vec![cid("a1")]);
    }

    #[test]
    fn replace_classification_reports_removed() {
        let store = seeded_store();
        let replacement = Category::new(cid("A")).with_children(vec![
            Category::new(cid("a")),
            Category::new(cid("c")),
        ]);
        let removed = store.replace_classification(replacement).unwrap();
        assert_eq!(removed, vec![cid("a1"), cid("b")]);

        let tree = store.retrieve("A").unwrap();
        assert_eq!(tree.len(), 3);
        assert!(tree.contains(&cid("c")));
    }

    #[test]
    fn replace_missing_classification_rejected() {
        let store = InMemoryCategoryStore::new();
        let err = store
            .replace_classification(Category::new(cid("A")))
            .unwrap_err();
        assert!(matches!(err, StoreError::RootNotFound(_)));
    }

    #[test]
    fn delete_classification_removes_everything() {
        let store = seeded_store();
        let removed = store.delete_classification("A").unwrap();
        assert_eq!(removed.len(), 4);
        assert!(store.is_empty());
        assert!(matches!(
            store.delete_classification("A"),
            Err(StoreError::RootNotFound(_))
        ));
    }

    #[test]
    fn label_and_uri_setters() {
        let store = seeded_store();
        store
            .set_labels(
                &cid("a"),
                LabelSet::from_labels(vec![Label::new("en", "Alpha")]),
            )
            .unwrap();
        store.set_label(&cid("a"), Label::new("de", "Alpha")).unwrap();
        assert!(store.remove_label(&cid("a"), "de").unwrap());
        assert!(!store.remove_label(&cid("a"), "de").unwrap());
        store
            .set_uri(&cid("a"), Some("http://example.org/a".into()))
            .unwrap();

        let tree = store.retrieve("A").unwrap();
        let node = tree.get(&cid("a")).unwrap();
        assert_eq!(node.labels.get("en").unwrap().text, "Alpha");
        assert_eq!(node.uri.as_deref(), Some("http://example.org/a"));
    }

    #[test]
    fn structural_move_helpers_delegate() {
        let store = seeded_store();
        assert_eq!(store.move_down(&cid("a")).unwrap(), Some(cid("b")));
        assert_eq!(store.move_down(&cid("a")).unwrap(), None);
        assert_eq!(store.move_up(&cid("a")).unwrap(), Some(cid("b")));

        // b -> demote under a -> promote back.
        let (old_parent, new_parent) = store.demote(&cid("b")).unwrap().unwrap();
        assert_eq!((old_parent, new_parent), (cid("A"), cid("a")));
        let (old_parent, new_parent) = store.promote(&cid("b")).unwrap().unwrap();
        assert_eq!((old_parent, new_parent), (cid("a"), cid("A")));
    }

    #[test]
    fn setter_on_missing_category_errors() {
        let store = seeded_store();
        assert!(matches!(
            store.set_uri(&cid("ghost"), None),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(seeded_store());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let tree = store.retrieve("A").unwrap();
                    assert_eq!(tree.len(), 4);
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
    }
}
