use taxa_store::StoreError;
use taxa_types::CategoryId;

/// Errors from link census operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// A link targets a category the store does not know.
    #[error("cannot link to unknown category: {0}")]
    UnknownCategory(CategoryId),

    /// The category store failed while resolving ancestors.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for link census operations.
pub type LinkResult<T> = Result<T, LinkError>;
