//! Typed life-log records.
//!
//! # Responsibility
//! - Mirror each log table as a plain Rust record for read paths and callers.
//!
//! # Invariants
//! - Cross-record references (`engage_log`, `moment_log`, `project_log`) are
//!   opaque strings. Nothing here checks that the referenced record exists.
//! - List fields are never `None`; an absent list is an empty `Vec`.
//!
//! # See also
//! - crate::schema

pub mod engagement;
pub mod moment;
pub mod project;
