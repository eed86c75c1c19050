use std::fmt;

use serde::{Deserialize, Serialize};

use taxa_types::CategoryId;

/// Link type recorded when callers do not name one.
pub const DEFAULT_LINK_KIND: &str = "classification";

/// The referencing side of a link: a repository object and its type tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Identifier of the referencing object.
    pub object_id: String,
    /// Type tag assigned by the owning subsystem (e.g. `document`).
    pub object_type: String,
}

impl ObjectRef {
    /// Create an object reference.
    pub fn new(object_id: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            object_type: object_type.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.object_id, self.object_type)
    }
}

/// One explicit link: object → category, with its semantic type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// The referencing object.
    pub object: ObjectRef,
    /// The category the object is classified under.
    pub category: CategoryId,
    /// Semantic link type.
    pub kind: String,
}
