//! REST field-serialization layer.
//!
//! # Responsibility
//! - Resolve dotted attribute paths over loaded entity graphs.
//! - Turn entities into ordered JSON records through static field sets.
//!
//! # Invariants
//! - Serialization never touches storage; graphs arrive fully loaded.
//! - Field sets are immutable after first use and safe to share across threads.

pub mod fields;
pub mod fieldsets;
pub mod path;
