//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate ingest transforms and repository calls into use-case APIs.
//! - Keep the CLI decoupled from storage details.

pub mod ingest_service;
