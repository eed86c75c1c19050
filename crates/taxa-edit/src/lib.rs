//! Tree mutation engine for the Taxa classification engine.
//!
//! This crate is the write path of the system. [`ClassificationEditor`]
//! applies one structural or content change at a time, enforcing the
//! editing protocol end to end:
//!
//! - the advisory edit lock is checked first and re-acquired after every
//!   successful mutation (`taxa-lock`);
//! - validation (duplicate ids, missing categories, live link references)
//!   happens before any tree state changes (`taxa-links` is the deletion
//!   oracle);
//! - persistence goes through the category store, atomic per
//!   classification (`taxa-store`);
//! - the secondary index is synchronized inline, fire-and-forget
//!   (`taxa-index`).
//!
//! Sibling and level moves that cannot apply (already first/last, no
//! shallower position) return `Ok(false)` — a refusal is a no-op, not an
//! error.

pub mod editor;
pub mod error;

pub use editor::ClassificationEditor;
pub use error::{EditError, EditResult};
