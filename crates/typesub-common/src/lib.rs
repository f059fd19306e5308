//! Common types and utilities shared by the typesub crates.
//!
//! - String interning (`Atom`, `ShardedInterner`)
//! - Centralized limits for parsing and normalization

// String interning for class and origin names
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Centralized limits and thresholds
pub mod limits;
