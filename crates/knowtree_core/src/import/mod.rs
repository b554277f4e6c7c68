//! Bulk import of a hierarchy from tabular rows.
//!
//! # Responsibility
//! - Decode loosely-typed rows and validate the caller's column mapping.
//! - Reconstruct a single-rooted tree from ambiguous parent references.
//!
//! # Invariants
//! - Reconciliation never drops a row and never fails.
//! - Every import batch is wrapped by exactly one generated container.

pub mod reconciler;
pub mod rows;
