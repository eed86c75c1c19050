use crate::id::CategoryId;

/// Errors produced by classification tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("invalid category id `{raw}`: {reason}")]
    InvalidId { raw: String, reason: String },

    #[error("category not found: {0}")]
    NotFound(CategoryId),

    #[error("duplicate category id: {0}")]
    DuplicateId(CategoryId),

    #[error("category {found} does not belong to classification `{expected}`")]
    RootMismatch { expected: String, found: CategoryId },

    #[error("classification must be built from a root category, got {0}")]
    NotARoot(CategoryId),

    #[error("the root category cannot be moved or removed")]
    RootIsFixed,

    #[error("cannot move {id} beneath its own descendant {target}")]
    MoveIntoSubtree { id: CategoryId, target: CategoryId },
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
