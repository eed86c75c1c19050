//! The classification editor: the single entry point for tree mutations.
//!
//! Every mutating operation runs the same protocol:
//! 1. check the edit lock table — refuse when a foreign session holds the
//!    classification;
//! 2. validate against the loaded tree and the store (duplicate ids,
//!    missing categories, live link references);
//! 3. persist the change through the category store (atomic per
//!    classification);
//! 4. re-acquire the lock for the mutating session;
//! 5. hand the mutation description to the index synchronizer,
//!    fire-and-forget.
//!
//! Reads never touch the lock table. Link operations are not tree-shape
//! mutations and bypass the lock entirely.

use std::sync::Arc;

use tracing::debug;

use taxa_index::{IndexResult, IndexSynchronizer};
use taxa_links::{LinkService, ObjectRef};
use taxa_lock::{EditLockTable, SessionId};
use taxa_store::{CategoryStore, StoreError};
use taxa_types::{Category, CategoryId, Label, LabelSet, MutationEvent, TreeError};

use crate::error::{EditError, EditResult};

/// Orchestrates classification edits across the store, lock table, link
/// census, and index synchronizer.
pub struct ClassificationEditor {
    store: Arc<dyn CategoryStore>,
    links: Arc<dyn LinkService>,
    locks: Arc<EditLockTable>,
    sync: IndexSynchronizer,
}

impl ClassificationEditor {
    /// Create an editor over the given collaborators.
    pub fn new(
        store: Arc<dyn CategoryStore>,
        links: Arc<dyn LinkService>,
        locks: Arc<EditLockTable>,
        sync: IndexSynchronizer,
    ) -> Self {
        Self {
            store,
            links,
            locks,
            sync,
        }
    }

    /// The lock table shared with other editors in this process.
    pub fn locks(&self) -> &EditLockTable {
        &self.locks
    }

    // ---------------------------------------------------------------
    // Structural mutations
    // ---------------------------------------------------------------

    /// Create a new classification from its root category.
    pub fn create_classification(&self, session: &SessionId, root: Category) -> EditResult<()> {
        let root_id = root.id.root_id().to_string();
        self.guard(&root_id, session)?;
        if self.store.exists(&root.id)? {
            return Err(EditError::DuplicateCategoryId(root.id.clone()));
        }
        self.store.add_category(None, root, None)?;
        self.committed(
            &root_id,
            session,
            MutationEvent::ClassificationReplaced {
                root_id: root_id.clone(),
                removed: Vec::new(),
            },
        );
        Ok(())
    }

    /// Insert a category (with any children it carries) as the last child
    /// of `parent`.
    ///
    /// The duplicate check runs against the category store, not just the
    /// tree loaded for this call.
    pub fn insert_category(
        &self,
        session: &SessionId,
        parent: &CategoryId,
        category: Category,
    ) -> EditResult<()> {
        self.guard(parent.root_id(), session)?;
        if self.store.exists(&category.id)? {
            return Err(EditError::DuplicateCategoryId(category.id.clone()));
        }
        let id = category.id.clone();
        self.store.add_category(Some(parent), category, None)?;
        self.committed(
            parent.root_id(),
            session,
            MutationEvent::Inserted {
                id,
                parent: parent.clone(),
            },
        );
        Ok(())
    }

    /// Wholesale replacement of a category's label set.
    pub fn replace_labels(
        &self,
        session: &SessionId,
        id: &CategoryId,
        labels: LabelSet,
    ) -> EditResult<()> {
        self.guard(id.root_id(), session)?;
        self.store.set_labels(id, labels)?;
        self.committed(
            id.root_id(),
            session,
            MutationEvent::LabelsReplaced { id: id.clone() },
        );
        Ok(())
    }

    /// Insert or replace one label by language.
    pub fn set_label(&self, session: &SessionId, id: &CategoryId, label: Label) -> EditResult<()> {
        self.guard(id.root_id(), session)?;
        self.store.set_label(id, label)?;
        self.committed(
            id.root_id(),
            session,
            MutationEvent::LabelsReplaced { id: id.clone() },
        );
        Ok(())
    }

    /// Set or clear a category's external URI.
    pub fn set_uri(
        &self,
        session: &SessionId,
        id: &CategoryId,
        uri: Option<String>,
    ) -> EditResult<()> {
        self.guard(id.root_id(), session)?;
        self.store.set_uri(id, uri)?;
        self.committed(
            id.root_id(),
            session,
            MutationEvent::UriChanged { id: id.clone() },
        );
        Ok(())
    }

    /// Swap the category with its previous sibling.
    ///
    /// `Ok(false)` when the category is already first — a no-op, not an
    /// error.
    pub fn move_up(&self, session: &SessionId, id: &CategoryId) -> EditResult<bool> {
        self.guard(id.root_id(), session)?;
        let Some(parent) = self.parent_of(id)? else {
            return Ok(false);
        };
        let Some(swapped) = self.store.move_up(id)? else {
            return Ok(false);
        };
        self.committed(
            id.root_id(),
            session,
            MutationEvent::MovedUp {
                id: id.clone(),
                swapped_with: swapped,
                parent,
            },
        );
        Ok(true)
    }

    /// Swap the category with its next sibling. `Ok(false)` when last.
    pub fn move_down(&self, session: &SessionId, id: &CategoryId) -> EditResult<bool> {
        self.guard(id.root_id(), session)?;
        let Some(parent) = self.parent_of(id)? else {
            return Ok(false);
        };
        let Some(swapped) = self.store.move_down(id)? else {
            return Ok(false);
        };
        self.committed(
            id.root_id(),
            session,
            MutationEvent::MovedDown {
                id: id.clone(),
                swapped_with: swapped,
                parent,
            },
        );
        Ok(true)
    }

    /// Re-parent the category toward a shallower position.
    ///
    /// `Ok(false)` when refused: the category is the root, sits directly
    /// under the root, or is its parent's only child.
    pub fn promote(&self, session: &SessionId, id: &CategoryId) -> EditResult<bool> {
        self.guard(id.root_id(), session)?;
        if !self.store.exists(id)? {
            return Err(EditError::CategoryNotFound(id.clone()));
        }
        let Some((old_parent, new_parent)) = self.store.promote(id)? else {
            return Ok(false);
        };
        self.committed(
            id.root_id(),
            session,
            MutationEvent::Promoted {
                id: id.clone(),
                old_parent,
                new_parent,
            },
        );
        Ok(true)
    }

    /// Re-parent the category under its previous sibling.
    ///
    /// `Ok(false)` when refused: the category is the root or has no
    /// previous sibling.
    pub fn demote(&self, session: &SessionId, id: &CategoryId) -> EditResult<bool> {
        self.guard(id.root_id(), session)?;
        if !self.store.exists(id)? {
            return Err(EditError::CategoryNotFound(id.clone()));
        }
        let Some((old_parent, new_parent)) = self.store.demote(id)? else {
            return Ok(false);
        };
        self.committed(
            id.root_id(),
            session,
            MutationEvent::Demoted {
                id: id.clone(),
                old_parent,
                new_parent,
            },
        );
        Ok(true)
    }

    /// Delete a category and its entire subtree.
    ///
    /// Refused while the link census reports any reference to the category
    /// or one of its descendants; the census is the authority, the editor
    /// never removes references itself.
    pub fn delete_category(&self, session: &SessionId, id: &CategoryId) -> EditResult<()> {
        self.guard(id.root_id(), session)?;
        let tree = self.store.retrieve(id.root_id())?;
        let node = tree
            .get(id)
            .ok_or_else(|| EditError::CategoryNotFound(id.clone()))?;
        let Some(parent) = node.parent.clone() else {
            // The root goes through delete_classification.
            return Err(EditError::Persistence(StoreError::Tree(
                TreeError::RootIsFixed,
            )));
        };

        let mut scope = vec![id.clone()];
        scope.extend(tree.descendants(id));
        let counts = self.links.count_links(&scope)?;
        let count: usize = counts.values().sum();
        if count > 0 {
            return Err(EditError::CategoryHasReferences {
                id: id.clone(),
                count,
            });
        }

        self.store.delete_category(id)?;
        self.committed(
            id.root_id(),
            session,
            MutationEvent::Deleted {
                id: id.clone(),
                parent,
            },
        );
        Ok(())
    }

    /// Wholesale replacement of an existing classification's structure
    /// (bulk re-import).
    pub fn replace_classification(
        &self,
        session: &SessionId,
        new_tree: Category,
    ) -> EditResult<()> {
        let root_id = new_tree.id.root_id().to_string();
        self.guard(&root_id, session)?;
        let removed = self.store.replace_classification(new_tree)?;
        self.committed(
            &root_id,
            session,
            MutationEvent::ClassificationReplaced {
                root_id: root_id.clone(),
                removed,
            },
        );
        Ok(())
    }

    /// Remove a whole classification and its lock table entry.
    pub fn delete_classification(&self, session: &SessionId, root_id: &str) -> EditResult<()> {
        self.guard(root_id, session)?;
        self.store.delete_classification(root_id)?;
        self.locks.release(root_id);
        debug!(root = root_id, session = %session, "classification deleted");
        self.sync.apply(&MutationEvent::ClassificationDeleted {
            root_id: root_id.to_string(),
        });
        Ok(())
    }

    // ---------------------------------------------------------------
    // Link operations (no edit lock: links are not tree-shape mutations)
    // ---------------------------------------------------------------

    /// Replace an object's link set and synchronize the link documents.
    pub fn set_object_links(
        &self,
        object: &ObjectRef,
        categories: &[CategoryId],
        kind: &str,
    ) -> EditResult<()> {
        self.links.set_links(object, categories, kind)?;
        self.sync.apply(&MutationEvent::LinksSet {
            object_id: object.object_id.clone(),
            categories: categories.to_vec(),
            kind: kind.to_string(),
        });
        Ok(())
    }

    /// Remove all links of the given objects and their link documents.
    pub fn delete_object_links(&self, object_ids: &[String]) -> EditResult<()> {
        self.links.delete_links(object_ids)?;
        self.sync.apply(&MutationEvent::LinksDeleted {
            object_ids: object_ids.to_vec(),
        });
        Ok(())
    }

    // ---------------------------------------------------------------
    // Session lifecycle
    // ---------------------------------------------------------------

    /// Finish a session's edits, releasing every lock it holds.
    ///
    /// Mutations are persisted as they happen; committing only ends the
    /// session's exclusive claim. Returns the number of released locks.
    pub fn commit_session(&self, session: &SessionId) -> usize {
        let released = self.locks.release_all(session);
        debug!(session = %session, released, "session committed");
        released
    }

    /// Abandon a session, releasing every lock it holds.
    ///
    /// Already-persisted mutations are not reverted; discarding only frees
    /// the classifications for other sessions.
    pub fn discard_session(&self, session: &SessionId) -> usize {
        let released = self.locks.release_all(session);
        debug!(session = %session, released, "session discarded");
        released
    }

    // ---------------------------------------------------------------
    // Recovery
    // ---------------------------------------------------------------

    /// Regenerate the secondary index from scratch.
    pub fn rebuild_index(&self) -> IndexResult<usize> {
        self.sync.rebuild()
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    /// Refuse the mutation when a foreign session holds the lock.
    fn guard(&self, root_id: &str, session: &SessionId) -> EditResult<()> {
        if let Some(holder) = self.locks.foreign_holder(root_id, session) {
            return Err(EditError::ConcurrentEditConflict {
                root_id: root_id.to_string(),
                holder,
            });
        }
        Ok(())
    }

    /// Parent of `id`, `None` for the root. Missing ids are an error.
    fn parent_of(&self, id: &CategoryId) -> EditResult<Option<CategoryId>> {
        let tree = self.store.retrieve(id.root_id())?;
        let node = tree
            .get(id)
            .ok_or_else(|| EditError::CategoryNotFound(id.clone()))?;
        Ok(node.parent.clone())
    }

    /// Post-persistence bookkeeping: re-claim the lock and synchronize.
    fn committed(&self, root_id: &str, session: &SessionId, event: MutationEvent) {
        if let Some(previous) = self.locks.acquire(root_id, session) {
            if previous != *session {
                debug!(root = root_id, from = %previous, to = %session, "edit lock taken over");
            }
        }
        debug!(%event, session = %session, "mutation committed");
        self.sync.apply(&event);
    }
}
