use serde::{Deserialize, Serialize};

use crate::id::CategoryId;

/// Description of one accepted mutation, emitted after persistence.
///
/// Every variant carries exactly the identifiers the index synchronizer
/// needs to compute its sync plan; the rule table mapping variants to
/// documents lives in one total function over this enum, so adding a
/// variant is a compile error until the synchronizer handles it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationEvent {
    /// A category was inserted under `parent`.
    Inserted {
        id: CategoryId,
        parent: CategoryId,
    },
    /// A category's label set was replaced wholesale.
    LabelsReplaced { id: CategoryId },
    /// A category's external URI was set or cleared.
    UriChanged { id: CategoryId },
    /// A category swapped places with its previous sibling.
    MovedUp {
        id: CategoryId,
        swapped_with: CategoryId,
        parent: CategoryId,
    },
    /// A category swapped places with its next sibling.
    MovedDown {
        id: CategoryId,
        swapped_with: CategoryId,
        parent: CategoryId,
    },
    /// A category was re-parented toward a shallower position.
    Promoted {
        id: CategoryId,
        old_parent: CategoryId,
        new_parent: CategoryId,
    },
    /// A category was re-parented under its previous sibling.
    Demoted {
        id: CategoryId,
        old_parent: CategoryId,
        new_parent: CategoryId,
    },
    /// A category and its whole subtree were removed.
    Deleted {
        id: CategoryId,
        parent: CategoryId,
    },
    /// A classification's structure was replaced wholesale.
    ClassificationReplaced {
        root_id: String,
        /// Ids present in the old tree but absent from the new one.
        removed: Vec<CategoryId>,
    },
    /// A whole classification was deleted.
    ClassificationDeleted { root_id: String },
    /// An object's explicit category links were replaced.
    LinksSet {
        object_id: String,
        categories: Vec<CategoryId>,
        /// Semantic link type, carried into the link documents.
        kind: String,
    },
    /// All links of the given objects were removed.
    LinksDeleted { object_ids: Vec<String> },
}

impl MutationEvent {
    /// Short variant name, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Inserted { .. } => "Inserted",
            Self::LabelsReplaced { .. } => "LabelsReplaced",
            Self::UriChanged { .. } => "UriChanged",
            Self::MovedUp { .. } => "MovedUp",
            Self::MovedDown { .. } => "MovedDown",
            Self::Promoted { .. } => "Promoted",
            Self::Demoted { .. } => "Demoted",
            Self::Deleted { .. } => "Deleted",
            Self::ClassificationReplaced { .. } => "ClassificationReplaced",
            Self::ClassificationDeleted { .. } => "ClassificationDeleted",
            Self::LinksSet { .. } => "LinksSet",
            Self::LinksDeleted { .. } => "LinksDeleted",
        }
    }

    /// The classification this event belongs to, when it has exactly one.
    ///
    /// Link events may span classifications and return `None`.
    pub fn root_id(&self) -> Option<&str> {
        match self {
            Self::Inserted { id, .. }
            | Self::LabelsReplaced { id }
            | Self::UriChanged { id }
            | Self::MovedUp { id, .. }
            | Self::MovedDown { id, .. }
            | Self::Promoted { id, .. }
            | Self::Demoted { id, .. }
            | Self::Deleted { id, .. } => Some(id.root_id()),
            Self::ClassificationReplaced { root_id, .. }
            | Self::ClassificationDeleted { root_id } => Some(root_id),
            Self::LinksSet { .. } | Self::LinksDeleted { .. } => None,
        }
    }

    /// Category ids whose documents this event touches directly.
    pub fn touched_categories(&self) -> Vec<&CategoryId> {
        match self {
            Self::Inserted { id, parent } => vec![id, parent],
            Self::LabelsReplaced { id } | Self::UriChanged { id } => vec![id],
            Self::MovedUp {
                id,
                swapped_with,
                parent,
            }
            | Self::MovedDown {
                id,
                swapped_with,
                parent,
            } => vec![id, swapped_with, parent],
            Self::Promoted {
                id,
                old_parent,
                new_parent,
            }
            | Self::Demoted {
                id,
                old_parent,
                new_parent,
            } => vec![id, old_parent, new_parent],
            Self::Deleted { id, parent } => vec![id, parent],
            Self::ClassificationReplaced { .. }
            | Self::ClassificationDeleted { .. }
            | Self::LinksSet { .. }
            | Self::LinksDeleted { .. } => Vec::new(),
        }
    }
}

impl std::fmt::Display for MutationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.root_id() {
            Some(root) => write!(f, "{}({root})", self.kind()),
            None => write!(f, "{}", self.kind()),
        }
    }
}
