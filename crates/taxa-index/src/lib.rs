//! Secondary search index for the Taxa classification engine.
//!
//! The index is a derived, disposable projection of the classification
//! trees and their links — never a source of truth. This crate provides:
//! - [`CategoryDocument`] / [`LinkDocument`] document projections
//! - The [`SearchBackend`] trait boundary with its three query shapes
//!   (plus object and catch-all filters), and an in-memory backend
//! - [`IndexSynchronizer`], mapping every accepted mutation to a
//!   [`SyncPlan`] through one exhaustive rule table, with fire-and-forget
//!   execution and a full [`IndexSynchronizer::rebuild`] recovery path
//!
//! # Design Rules
//!
//! 1. A failed synchronization is logged, never propagated: it must not
//!    unwind the already-committed tree mutation.
//! 2. Incremental synchronization and rebuild converge: after any sequence
//!    of synchronized mutations the document set equals a fresh rebuild.
//! 3. Delete cascades are resolved against the index (ancestor queries),
//!    because the authoritative tree no longer knows the removed subtree.

pub mod document;
pub mod error;
pub mod memory;
pub mod sync;
pub mod traits;

pub use document::{CategoryDocument, IndexDocument, LinkDocument};
pub use error::{IndexError, IndexResult};
pub use memory::InMemorySearchBackend;
pub use sync::{IndexSynchronizer, SyncPlan};
pub use traits::{Filter, SearchBackend};
