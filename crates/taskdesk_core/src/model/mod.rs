//! Domain model for validated task/sub-task/todo records.
//!
//! # Responsibility
//! - Define the normalized record shapes produced by the validator.
//! - Keep explicit-null and absent values distinguishable in typed form.
//!
//! # Invariants
//! - A normalized record always carries a title of at least two characters
//!   and a resolved `status`.
//! - Records carry no identity beyond the optional storage `id`.

pub mod field;
pub mod record;
