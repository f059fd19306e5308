//! Subtype rules, split by the shape of the nodes being compared.
//!
//! - `unions`: union sources and targets, type variables
//! - `generics`: classes against origins, origin capabilities and variance
//! - `tuples`: tuple element lists and callable signatures

mod generics;
mod tuples;
mod unions;
