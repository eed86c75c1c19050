use crate::document::IndexDocument;
use crate::error::IndexResult;

/// The query shapes the synchronizer needs from an index technology.
///
/// Any backend supporting exact matches on classification id, category id,
/// and object id, plus containment on the ancestor list, is sufficient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Every document in the index (used by rebuilds).
    All,
    /// Category documents of one classification.
    RootIs(String),
    /// The category document with exactly this document id.
    CategoryIs(String),
    /// Category documents whose ancestor list contains this id.
    AncestorIs(String),
    /// Link documents originating from this object.
    ObjectIs(String),
}

/// The secondary index collaborator.
///
/// The index is a disposable projection: implementations may lose data and
/// be rebuilt from the category store at any time. Upserts are keyed by
/// [`IndexDocument::doc_id`]; a second upsert with the same id replaces the
/// stored document.
pub trait SearchBackend: Send + Sync {
    /// Insert or replace one document.
    fn upsert(&self, document: IndexDocument) -> IndexResult<()>;

    /// Insert or replace many documents.
    ///
    /// Default implementation calls [`SearchBackend::upsert`] per document.
    fn bulk_upsert(&self, documents: Vec<IndexDocument>) -> IndexResult<()> {
        for document in documents {
            self.upsert(document)?;
        }
        Ok(())
    }

    /// Delete documents by id. Unknown ids are ignored.
    fn delete_by_ids(&self, ids: &[String]) -> IndexResult<()>;

    /// Ids of all documents matching the filter, sorted.
    fn query_ids(&self, filter: &Filter) -> IndexResult<Vec<String>>;

    /// Make previous writes visible to queries.
    fn commit(&self) -> IndexResult<()>;
}
