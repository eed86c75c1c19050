use taxa_types::{CategoryId, TreeError};

/// Errors from category store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The requested category does not exist.
    #[error("category not found: {0}")]
    NotFound(CategoryId),

    /// The requested classification does not exist.
    #[error("classification not found: {0}")]
    RootNotFound(String),

    /// An id targeted by an insert already exists.
    #[error("duplicate category id: {0}")]
    DuplicateId(CategoryId),

    /// A tree-structural rule was violated.
    #[error("tree operation failed: {0}")]
    Tree(TreeError),

    /// The storage backend rejected the write (e.g. storage unavailable).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<TreeError> for StoreError {
    fn from(e: TreeError) -> Self {
        // Lift the variants that have a store-level meaning of their own.
        match e {
            TreeError::NotFound(id) => StoreError::NotFound(id),
            TreeError::DuplicateId(id) => StoreError::DuplicateId(id),
            other => StoreError::Tree(other),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
