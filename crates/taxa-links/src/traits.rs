use std::collections::{BTreeSet, HashMap};

use taxa_types::CategoryId;

use crate::error::LinkResult;
use crate::types::{Link, ObjectRef};

/// The link census: who references which category, and how often.
///
/// The census is the precondition oracle for category deletion: a category
/// (or any of its descendants) with a nonzero count must not be deleted.
/// Implementations must keep ancestor counts aggregated: setting a link to
/// a category implicitly links every ancestor of that category, so counting
/// an inner node reflects all descendant usage below it.
///
/// Counting never auto-expands to descendants. A caller that needs
/// "deletable iff no links to this node or any descendant" gathers the
/// descendant ids itself and submits them all.
pub trait LinkService: Send + Sync {
    /// Aggregate link count per requested category id.
    ///
    /// Every requested id appears in the result, with `0` when unlinked.
    fn count_links(&self, ids: &[CategoryId]) -> LinkResult<HashMap<CategoryId, usize>>;

    /// Ids of all objects linking to the category (implicit links included).
    fn links_from_category(&self, id: &CategoryId) -> LinkResult<BTreeSet<String>>;

    /// All categories an object is linked to (implicit links included).
    fn links_from_object(&self, object_id: &str) -> LinkResult<BTreeSet<CategoryId>>;

    /// Idempotent full replacement of an object's link set.
    ///
    /// Implicit links are created for every ancestor of each supplied
    /// category. Fails when a supplied category is unknown to the store;
    /// nothing is changed in that case.
    fn set_links(
        &self,
        object: &ObjectRef,
        categories: &[CategoryId],
        kind: &str,
    ) -> LinkResult<()>;

    /// Remove all links originating from the object.
    fn delete_link(&self, object_id: &str) -> LinkResult<()>;

    /// Remove all links originating from each of the objects.
    ///
    /// Default implementation calls [`LinkService::delete_link`] per object.
    fn delete_links(&self, object_ids: &[String]) -> LinkResult<()> {
        for object_id in object_ids {
            self.delete_link(object_id)?;
        }
        Ok(())
    }

    /// Enumerate every explicit link, ordered by object id then category.
    ///
    /// Used by index rebuilds; implicit ancestor links are not listed.
    fn links(&self) -> LinkResult<Vec<Link>>;
}
