//! Fuzzy search over a flattened knowledge tree.
//!
//! # Responsibility
//! - Flatten a forest into shallow node copies.
//! - Rank typo-tolerant matches over title, content and tags.
//!
//! # Invariants
//! - Search never mutates the source tree.
//! - Blank queries match nothing.

pub mod flatten;
pub mod fuzzy;
pub mod index;
