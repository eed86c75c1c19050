//! Advisory edit locking for the Taxa classification engine.
//!
//! A classification's tree shape is edited by at most one session at a
//! time. The [`EditLockTable`] records who holds each classification;
//! acquisition always succeeds and returns the displaced holder, making
//! force takeover an explicit, observable act rather than a silent
//! overwrite. The mutation engine performs the actual refusal: it checks
//! the table before every mutation and fails fast when a foreign session
//! holds the entry.
//!
//! Reads are never blocked; the table only gates tree mutations.

pub mod session;
pub mod table;

pub use session::SessionId;
pub use table::EditLockTable;
