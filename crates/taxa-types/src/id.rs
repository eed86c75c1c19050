//! Category identifiers and their validation rules.
//!
//! Valid id parts:
//! - Must be non-empty and at most 128 bytes
//! - May contain ASCII letters, digits, `_`, `-`, `.`
//! - Must not start or end with `.`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// Maximum length of either id part, in bytes.
const MAX_PART_LEN: usize = 128;

/// Validate one id part (root or local), returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use taxa_types::id::validate_id_part;
///
/// assert!(validate_id_part("DDC").is_ok());
/// assert!(validate_id_part("004.2").is_ok());
/// assert!(validate_id_part("").is_err());
/// assert!(validate_id_part("no spaces").is_err());
/// ```
pub fn validate_id_part(part: &str) -> Result<(), TreeError> {
    if part.is_empty() {
        return Err(TreeError::InvalidId {
            raw: part.to_string(),
            reason: "id part must not be empty".into(),
        });
    }
    if part.len() > MAX_PART_LEN {
        return Err(TreeError::InvalidId {
            raw: part.to_string(),
            reason: format!("id part exceeds {MAX_PART_LEN} bytes"),
        });
    }
    for ch in part.chars() {
        if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.') {
            return Err(TreeError::InvalidId {
                raw: part.to_string(),
                reason: format!("contains forbidden character: {ch:?}"),
            });
        }
    }
    if part.starts_with('.') || part.ends_with('.') {
        return Err(TreeError::InvalidId {
            raw: part.to_string(),
            reason: "must not start or end with '.'".into(),
        });
    }
    Ok(())
}

/// Composite key of a category: `(root_id, local_id)`.
///
/// A category is a *root category* (i.e. a classification) iff its local id
/// equals its root id. Equality and hashing cover both fields. The id is
/// immutable once constructed; both parts are validated on construction.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId {
    root_id: String,
    local_id: String,
}

impl CategoryId {
    /// Create a category id from a root id and a local id.
    pub fn new(root_id: impl Into<String>, local_id: impl Into<String>) -> Result<Self, TreeError> {
        let root_id = root_id.into();
        let local_id = local_id.into();
        validate_id_part(&root_id)?;
        validate_id_part(&local_id)?;
        Ok(Self { root_id, local_id })
    }

    /// Create the id of a classification's root category (`local == root`).
    pub fn root(root_id: impl Into<String>) -> Result<Self, TreeError> {
        let root_id = root_id.into();
        validate_id_part(&root_id)?;
        Ok(Self {
            local_id: root_id.clone(),
            root_id,
        })
    }

    /// The classification (root) part of the id.
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// The category-local part of the id.
    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// Returns `true` if this id names a classification root.
    pub fn is_root(&self) -> bool {
        self.root_id == self.local_id
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "{}", self.root_id)
        } else {
            write!(f, "{}:{}", self.root_id, self.local_id)
        }
    }
}

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({self})")
    }
}

impl FromStr for CategoryId {
    type Err = TreeError;

    /// Parse `root:local`, or a bare `root` for a root category id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((root, local)) => Self::new(root, local),
            None => Self::root(s),
        }
    }
}
