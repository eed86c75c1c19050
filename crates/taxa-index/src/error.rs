use taxa_links::LinkError;
use taxa_store::StoreError;
use taxa_types::TreeError;

/// Errors from index synchronization.
///
/// These never surface to the caller of a mutation: the synchronizer logs
/// them and lets the index drift until the next rebuild (the index is a
/// derived view, not part of the mutation's transaction).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// The search backend rejected an operation.
    #[error("search backend failure: {0}")]
    Backend(String),

    /// Reading back the authoritative tree failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Enumerating links for a rebuild failed.
    #[error("link census error: {0}")]
    Links(#[from] LinkError),

    /// Projecting a category into a document failed.
    #[error("tree operation failed: {0}")]
    Tree(#[from] TreeError),
}

/// Result alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
