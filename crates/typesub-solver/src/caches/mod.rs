//! Shared caches and query instrumentation.

pub mod query_trace;
pub mod relation_cache;

pub use relation_cache::{RelationCache, RelationCacheKey};
