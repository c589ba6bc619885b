//! Pure computation engines over in-memory record collections.
//!
//! Everything here is synchronous and total: empty input produces empty
//! output, malformed records are skipped or bucketed, nothing panics.

pub mod aggregate;
pub mod filter;
pub mod pivot;
