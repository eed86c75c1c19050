use taxa_links::LinkError;
use taxa_lock::SessionId;
use taxa_store::StoreError;
use taxa_types::CategoryId;

/// Errors surfaced by classification edit operations.
///
/// The validation variants are detected before any tree mutation and carry
/// no side effects; `Persistence` aborts the whole operation at the store
/// boundary. Index synchronization failures never appear here — they are
/// logged inside the synchronizer and repaired by a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// Another session holds the classification's edit lock.
    #[error("classification `{root_id}` is being edited by session {holder}")]
    ConcurrentEditConflict {
        root_id: String,
        holder: SessionId,
    },

    /// An insert targets an id that already exists.
    #[error("duplicate category id: {0}")]
    DuplicateCategoryId(CategoryId),

    /// The operation targets a nonexistent category.
    #[error("category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// The operation targets a nonexistent classification.
    #[error("classification not found: {0}")]
    ClassificationNotFound(String),

    /// Deletion refused: live references point at the subtree.
    #[error("category {id} has {count} linked object(s); remove the references first")]
    CategoryHasReferences { id: CategoryId, count: usize },

    /// The category store rejected the write.
    #[error("persistence failure: {0}")]
    Persistence(StoreError),

    /// The link census could not answer a precondition query.
    #[error("link census failed: {0}")]
    Links(#[from] LinkError),
}

impl From<StoreError> for EditError {
    fn from(e: StoreError) -> Self {
        // Lift the validation outcomes the caller must distinguish.
        match e {
            StoreError::NotFound(id) => Self::CategoryNotFound(id),
            StoreError::DuplicateId(id) => Self::DuplicateCategoryId(id),
            StoreError::RootNotFound(root) => Self::ClassificationNotFound(root),
            other => Self::Persistence(other),
        }
    }
}

/// Result alias for edit operations.
pub type EditResult<T> = Result<T, EditError>;
