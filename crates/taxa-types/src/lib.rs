//! Foundation types for the Taxa classification engine.
//!
//! This crate provides the identifier, label, and tree types used throughout
//! the Taxa system. Every other Taxa crate depends on `taxa-types`.
//!
//! # Key Types
//!
//! - [`CategoryId`] — Composite `(root, local)` category identifier
//! - [`Label`] / [`LabelSet`] — Language-tagged labels, one per language
//! - [`Category`] — Nested transport form used at store boundaries
//! - [`Classification`] — Arena-form tree carrying the mutation algorithms
//!   and the cached `(left, right, level)` nested-set attributes
//! - [`MutationEvent`] — Tagged description of an accepted mutation,
//!   consumed by the index synchronizer

pub mod category;
pub mod error;
pub mod event;
pub mod id;
pub mod label;
pub mod tree;

pub use category::Category;
pub use error::{TreeError, TreeResult};
pub use event::MutationEvent;
pub use id::CategoryId;
pub use label::{Label, LabelSet, DEFAULT_LANG};
pub use tree::{CategoryNode, Classification};
