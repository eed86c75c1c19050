use taxa_types::{Category, CategoryId, Classification, Label, LabelSet};

use crate::error::StoreResult;

/// Durable tree storage for classifications, keyed by [`CategoryId`].
///
/// All implementations must satisfy these invariants:
/// - Every mutation is atomic per classification subtree: it either applies
///   completely or leaves the stored tree untouched.
/// - The `(left, right, level)` attributes of a stored classification are
///   recomputed before the mutation returns, so every read observes a
///   consistent nested-set numbering.
/// - Concurrent reads are always safe; each read hands out its own copy.
/// - The store enforces id uniqueness inside one classification; callers
///   cannot create a duplicate id through any operation.
pub trait CategoryStore: Send + Sync {
    /// Check whether a category exists anywhere in the store.
    fn exists(&self, id: &CategoryId) -> StoreResult<bool>;

    /// Ids of all classification roots, sorted for determinism.
    fn root_ids(&self) -> StoreResult<Vec<CategoryId>>;

    /// Load a whole classification to unlimited depth.
    fn retrieve(&self, root_id: &str) -> StoreResult<Classification>;

    /// Load one category in transport form.
    ///
    /// `child_depth` bounds the included child levels; `-1` means unlimited.
    fn get_category(&self, id: &CategoryId, child_depth: i32) -> StoreResult<Category> {
        let tree = self.retrieve(id.root_id())?;
        Ok(tree.to_category(id, child_depth)?)
    }

    /// Add a category subtree.
    ///
    /// With `parent == None` the category must be a root and a new
    /// classification is created. `position` indexes into the parent's
    /// child list (clamped); `None` appends.
    fn add_category(
        &self,
        parent: Option<&CategoryId>,
        category: Category,
        position: Option<usize>,
    ) -> StoreResult<()>;

    /// Delete a category and its subtree.
    ///
    /// Returns the removed ids in depth-first order. Deleting a root is
    /// refused; use [`CategoryStore::delete_classification`].
    fn delete_category(&self, id: &CategoryId) -> StoreResult<Vec<CategoryId>>;

    /// Move a category (with its subtree) under a new parent at `index`.
    fn move_category(
        &self,
        id: &CategoryId,
        new_parent: &CategoryId,
        index: usize,
    ) -> StoreResult<()>;

    /// Wholesale replacement of an existing classification's structure.
    ///
    /// Returns the ids present before but absent from the new tree, for
    /// index cleanup.
    fn replace_classification(&self, new_tree: Category) -> StoreResult<Vec<CategoryId>>;

    /// Remove every category under the given root.
    ///
    /// Returns the removed ids in depth-first order.
    fn delete_classification(&self, root_id: &str) -> StoreResult<Vec<CategoryId>>;

    // ---- Content setters ----

    /// Wholesale replacement of a category's label set.
    fn set_labels(&self, id: &CategoryId, labels: LabelSet) -> StoreResult<()>;

    /// Insert or replace one label by language.
    fn set_label(&self, id: &CategoryId, label: Label) -> StoreResult<()>;

    /// Remove one label by language. `Ok(false)` when absent.
    fn remove_label(&self, id: &CategoryId, lang: &str) -> StoreResult<bool>;

    /// Set or clear a category's external URI.
    fn set_uri(&self, id: &CategoryId, uri: Option<String>) -> StoreResult<()>;

    // ---- Structural move helpers ----
    //
    // Each applies the corresponding `Classification` algorithm atomically
    // and persists the renumbered tree. `None` results are no-op refusals.

    /// Swap with the previous sibling; returns the displaced sibling.
    fn move_up(&self, id: &CategoryId) -> StoreResult<Option<CategoryId>>;

    /// Swap with the next sibling; returns the displaced sibling.
    fn move_down(&self, id: &CategoryId) -> StoreResult<Option<CategoryId>>;

    /// Re-parent toward a shallower position; returns
    /// `(old_parent, new_parent)`.
    fn promote(&self, id: &CategoryId) -> StoreResult<Option<(CategoryId, CategoryId)>>;

    /// Re-parent under the previous sibling; returns
    /// `(old_parent, new_parent)`.
    fn demote(&self, id: &CategoryId) -> StoreResult<Option<(CategoryId, CategoryId)>>;
}
