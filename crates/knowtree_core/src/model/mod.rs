//! Shared knowledge-tree data model.
//!
//! # Responsibility
//! - Define the node shape consumed by import, layout and search.
//! - Provide structural helpers (traversal, forest rebuild, progress).
//!
//! # Invariants
//! - Trees are acyclic and single-parented.
//! - Layout and search read nodes but never write derived data back.

pub mod node;
