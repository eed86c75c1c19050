//! Link census for the Taxa classification engine.
//!
//! Repository objects declare links to categories; the census counts and
//! enumerates those links so destructive operations can be gated: a
//! category with live references (on itself or any descendant) must not be
//! deleted. Links are owned by the referencing object's subsystem — the
//! census only answers queries and maintains the counts, including the
//! implicit ancestor links that make inner-node counts aggregate all
//! descendant usage.
//!
//! # Modules
//!
//! - [`error`] — Error types for census operations
//! - [`types`] — [`ObjectRef`] and [`Link`]
//! - [`traits`] — The [`LinkService`] trait defining the census interface
//! - [`memory`] — In-memory [`InMemoryLinkService`] for tests

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{LinkError, LinkResult};
pub use memory::InMemoryLinkService;
pub use traits::LinkService;
pub use types::{Link, ObjectRef, DEFAULT_LINK_KIND};
