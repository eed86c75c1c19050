//! In-memory link census for tests and embedding.
//!
//! [`InMemoryLinkService`] keeps a forward map (object → links) and a
//! reverse map (category → objects) in lockstep under one `RwLock`.
//! Ancestors are resolved through the category store at link time, so
//! counting is a plain map lookup afterwards.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use taxa_store::{CategoryStore, StoreError};
use taxa_types::{CategoryId, Classification};

use crate::error::{LinkError, LinkResult};
use crate::traits::LinkService;
use crate::types::{Link, ObjectRef};

/// Links of one object: explicit targets plus the implicit ancestor closure.
#[derive(Clone, Debug)]
struct ObjectLinks {
    object_type: String,
    kind: String,
    explicit: BTreeSet<CategoryId>,
    all: BTreeSet<CategoryId>,
}

#[derive(Default)]
struct LinkState {
    by_object: HashMap<String, ObjectLinks>,
    by_category: HashMap<CategoryId, BTreeSet<String>>,
}

/// An in-memory implementation of [`LinkService`].
pub struct InMemoryLinkService {
    store: Arc<dyn CategoryStore>,
    state: RwLock<LinkState>,
}

impl InMemoryLinkService {
    /// Create an empty census resolving ancestors through `store`.
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self {
            store,
            state: RwLock::new(LinkState::default()),
        }
    }

    /// Number of objects currently holding links.
    pub fn object_count(&self) -> usize {
        self.state.read().expect("lock poisoned").by_object.len()
    }

    /// Expand the explicit categories to their ancestor closure.
    fn closure(&self, categories: &[CategoryId]) -> LinkResult<BTreeSet<CategoryId>> {
        let mut trees: HashMap<String, Classification> = HashMap::new();
        let mut all = BTreeSet::new();
        for category in categories {
            if !trees.contains_key(category.root_id()) {
                let tree = match self.store.retrieve(category.root_id()) {
                    Ok(tree) => tree,
                    Err(StoreError::RootNotFound(_)) => {
                        return Err(LinkError::UnknownCategory(category.clone()));
                    }
                    Err(e) => return Err(LinkError::Store(e)),
                };
                trees.insert(category.root_id().to_string(), tree);
            }
            let tree = &trees[category.root_id()];
            if !tree.contains(category) {
                return Err(LinkError::UnknownCategory(category.clone()));
            }
            all.extend(tree.ancestors(category));
            all.insert(category.clone());
        }
        Ok(all)
    }
}

impl std::fmt::Debug for InMemoryLinkService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLinkService")
            .field("objects", &self.object_count())
            .finish()
    }
}

impl LinkService for InMemoryLinkService {
    fn count_links(&self, ids: &[CategoryId]) -> LinkResult<HashMap<CategoryId, usize>> {
        let state = self.state.read().expect("lock poisoned");
        Ok(ids
            .iter()
            .map(|id| {
                let count = state.by_category.get(id).map_or(0, BTreeSet::len);
                (id.clone(), count)
            })
            .collect())
    }

    fn links_from_category(&self, id: &CategoryId) -> LinkResult<BTreeSet<String>> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.by_category.get(id).cloned().unwrap_or_default())
    }

    fn links_from_object(&self, object_id: &str) -> LinkResult<BTreeSet<CategoryId>> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state
            .by_object
            .get(object_id)
            .map(|links| links.all.clone())
            .unwrap_or_default())
    }

    fn set_links(
        &self,
        object: &ObjectRef,
        categories: &[CategoryId],
        kind: &str,
    ) -> LinkResult<()> {
        // Resolve the ancestor closure before taking the write lock; an
        // unknown category leaves the census untouched.
        let all = self.closure(categories)?;

        let mut state = self.state.write().expect("lock poisoned");
        if let Some(old) = state.by_object.remove(&object.object_id) {
            for category in &old.all {
                if let Some(objects) = state.by_category.get_mut(category) {
                    objects.remove(&object.object_id);
                    if objects.is_empty() {
                        state.by_category.remove(category);
                    }
                }
            }
        }
        for category in &all {
            state
                .by_category
                .entry(category.clone())
                .or_default()
                .insert(object.object_id.clone());
        }
        state.by_object.insert(
            object.object_id.clone(),
            ObjectLinks {
                object_type: object.object_type.clone(),
                kind: kind.to_string(),
                explicit: categories.iter().cloned().collect(),
                all,
            },
        );
        Ok(())
    }

    fn delete_link(&self, object_id: &str) -> LinkResult<()> {
        let mut state = self.state.write().expect("lock poisoned");
        if let Some(old) = state.by_object.remove(object_id) {
            for category in &old.all {
                if let Some(objects) = state.by_category.get_mut(category) {
                    objects.remove(object_id);
                    if objects.is_empty() {
                        state.by_category.remove(category);
                    }
                }
            }
        }
        Ok(())
    }

    fn links(&self) -> LinkResult<Vec<Link>> {
        let state = self.state.read().expect("lock poisoned");
        let mut object_ids: Vec<&String> = state.by_object.keys().collect();
        object_ids.sort();

        let mut out = Vec::new();
        for object_id in object_ids {
            let links = &state.by_object[object_id];
            for category in &links.explicit {
                out.push(Link {
                    object: ObjectRef::new(object_id.clone(), links.object_type.clone()),
                    category: category.clone(),
                    kind: links.kind.clone(),
                });
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxa_store::InMemoryCategoryStore;
    use taxa_types::Category;

    use crate::types::DEFAULT_LINK_KIND;

    fn cid(local: &str) -> CategoryId {
        if local == "A" {
            CategoryId::root("A").unwrap()
        } else {
            CategoryId::new("A", local).unwrap()
        }
    }

    /// Store with classification A: root -> [a -> [a1], b].
    fn seeded_service() -> InMemoryLinkService {
        let store = InMemoryCategoryStore::new();
        store
            .add_category(
                None,
                Category::new(cid("A")).with_children(vec![
                    Category::new(cid("a"))
                        .with_children(vec![Category::new(cid("a1"))]),
                    Category::new(cid("b")),
                ]),
                None,
            )
            .unwrap();
        InMemoryLinkService::new(Arc::new(store))
    }

    fn obj(id: &str) -> ObjectRef {
        ObjectRef::new(id, "document")
    }

    #[test]
    fn set_links_counts_target() {
        let service = seeded_service();
        service
            .set_links(&obj("doc_1"), &[cid("a1")], DEFAULT_LINK_KIND)
            .unwrap();

        let counts = service.count_links(&[cid("a1"), cid("b")]).unwrap();
        assert_eq!(counts[&cid("a1")], 1);
        assert_eq!(counts[&cid("b")], 0);
    }

    #[test]
    fn ancestors_are_linked_implicitly() {
        let service = seeded_service();
        service
            .set_links(&obj("doc_1"), &[cid("a1")], DEFAULT_LINK_KIND)
            .unwrap();

        // a and the root aggregate the descendant usage.
        let counts = service
            .count_links(&[cid("A"), cid("a"), cid("a1")])
            .unwrap();
        assert_eq!(counts[&cid("A")], 1);
        assert_eq!(counts[&cid("a")], 1);
        assert_eq!(counts[&cid("a1")], 1);
    }

    #[test]
    fn set_links_is_idempotent_replacement() {
        let service = seeded_service();
        service
            .set_links(&obj("doc_1"), &[cid("a1")], DEFAULT_LINK_KIND)
            .unwrap();
        service
            .set_links(&obj("doc_1"), &[cid("a1")], DEFAULT_LINK_KIND)
            .unwrap();
        assert_eq!(service.count_links(&[cid("a1")]).unwrap()[&cid("a1")], 1);

        // Re-pointing the object drops the old target (and its closure).
        service
            .set_links(&obj("doc_1"), &[cid("b")], DEFAULT_LINK_KIND)
            .unwrap();
        let counts = service
            .count_links(&[cid("a"), cid("a1"), cid("b")])
            .unwrap();
        assert_eq!(counts[&cid("a1")], 0);
        assert_eq!(counts[&cid("a")], 0);
        assert_eq!(counts[&cid("b")], 1);
    }

    #[test]
    fn unknown_category_rejected_without_change() {
        let service = seeded_service();
        let err = service
            .set_links(&obj("doc_1"), &[cid("ghost")], DEFAULT_LINK_KIND)
            .unwrap_err();
        assert!(matches!(err, LinkError::UnknownCategory(_)));
        assert_eq!(service.object_count(), 0);

        // A partially unknown set is rejected as a whole.
        let err = service
            .set_links(&obj("doc_1"), &[cid("a1"), cid("ghost")], DEFAULT_LINK_KIND)
            .unwrap_err();
        assert!(matches!(err, LinkError::UnknownCategory(_)));
        assert_eq!(service.count_links(&[cid("a1")]).unwrap()[&cid("a1")], 0);
    }

    #[test]
    fn links_from_category_and_object() {
        let service = seeded_service();
        service
            .set_links(&obj("doc_1"), &[cid("a1")], DEFAULT_LINK_KIND)
            .unwrap();
        service
            .set_links(&obj("doc_2"), &[cid("a")], DEFAULT_LINK_KIND)
            .unwrap();

        let objects = service.links_from_category(&cid("a")).unwrap();
        assert_eq!(
            objects.into_iter().collect::<Vec<_>>(),
            vec!["doc_1".to_string(), "doc_2".to_string()]
        );

        let categories = service.links_from_object("doc_1").unwrap();
        assert!(categories.contains(&cid("a1")));
        assert!(categories.contains(&cid("a")));
        assert!(categories.contains(&cid("A")));
        assert!(!categories.contains(&cid("b")));
    }

    #[test]
    fn delete_link_clears_counts() {
        let service = seeded_service();
        service
            .set_links(&obj("doc_1"), &[cid("a1")], DEFAULT_LINK_KIND)
            .unwrap();
        service.delete_link("doc_1").unwrap();

        let counts = service.count_links(&[cid("A"), cid("a1")]).unwrap();
        assert_eq!(counts[&cid("A")], 0);
        assert_eq!(counts[&cid("a1")], 0);
        assert_eq!(service.object_count(), 0);

        // Deleting an unknown object is a no-op.
        service.delete_link("doc_1").unwrap();
    }

    #[test]
    fn delete_links_batch() {
        let service = seeded_service();
        service
            .set_links(&obj("doc_1"), &[cid("a1")], DEFAULT_LINK_KIND)
            .unwrap();
        service
            .set_links(&obj("doc_2"), &[cid("b")], DEFAULT_LINK_KIND)
            .unwrap();

        service
            .delete_links(&["doc_1".to_string(), "doc_2".to_string()])
            .unwrap();
        assert_eq!(service.object_count(), 0);
    }

    #[test]
    fn links_enumerates_explicit_only() {
        let service = seeded_service();
        service
            .set_links(&obj("doc_2"), &[cid("b")], "subject")
            .unwrap();
        service
            .set_links(&obj("doc_1"), &[cid("a1")], DEFAULT_LINK_KIND)
            .unwrap();

        let links = service.links().unwrap();
        assert_eq!(links.len(), 2);
        // Ordered by object id; implicit ancestor links are absent.
        assert_eq!(links[0].object.object_id, "doc_1");
        assert_eq!(links[0].category, cid("a1"));
        assert_eq!(links[1].object.object_id, "doc_2");
        assert_eq!(links[1].kind, "subject");
    }
}
