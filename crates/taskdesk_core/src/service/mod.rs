//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate credential checks, validation and repository calls.
//! - Keep request-boundary callers decoupled from storage details.

pub mod record_service;
