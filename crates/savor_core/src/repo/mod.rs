//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the load/read contract over the life-log tables.
//! - Isolate SQLite query details from ingest orchestration.
//!
//! # Invariants
//! - Repository writes coerce cells through `crate::schema` column types.
//! - Repository APIs return semantic errors (`InvalidData`) in addition to DB
//!   transport errors.

pub mod log_repo;
