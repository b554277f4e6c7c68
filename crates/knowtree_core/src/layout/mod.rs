//! Radial diagram layout.
//!
//! # Responsibility
//! - Position any forest as non-overlapping points for node/edge diagrams.
//! - Keep occupancy scoped to one explicit session per invocation.
//!
//! # Invariants
//! - Layout never mutates input nodes and never fails.
//! - Identical input and config produce identical output.

pub mod grid;
pub mod radial;
