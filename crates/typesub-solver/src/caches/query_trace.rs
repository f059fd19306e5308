//! Structured query tracing for top-level subtype decisions.
//!
//! Events use target `typesub::query_json` and are intended to be consumed
//! with: `TYPESUB_LOG=typesub::query_json=trace TYPESUB_LOG_FORMAT=json`.
//!
//! Environment:
//! - `TYPESUB_QUERY_RUN_ID`: optional run identifier attached to every event.

use crate::TypeId;
use crate::subtype::SubtypeResult;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Level, trace};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);
static QUERY_RUN_ID: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn enabled() -> bool {
    tracing::enabled!(target: "typesub::query_json", Level::TRACE)
}

#[inline]
pub(crate) fn next_query_id() -> u64 {
    NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
fn run_id() -> &'static str {
    QUERY_RUN_ID
        .get_or_init(|| {
            std::env::var("TYPESUB_QUERY_RUN_ID").unwrap_or_else(|_| "default".to_string())
        })
        .as_str()
}

#[inline]
pub(crate) fn relation_start(
    query_id: u64,
    op: &'static str,
    left: TypeId,
    right: TypeId,
    env_fingerprint: u64,
    flags: u8,
) {
    trace!(
        target: "typesub::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op,
        left_type_id = left.0,
        right_type_id = right.0,
        env_fingerprint,
        flags
    );
}

#[inline]
pub(crate) fn relation_end(
    query_id: u64,
    op: &'static str,
    verdict: SubtypeResult,
    depth_exceeded: bool,
    cache_hit: bool,
) {
    trace!(
        target: "typesub::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op,
        verdict = verdict.as_str(),
        depth_exceeded,
        cache_hit
    );
}

#[cfg(test)]
#[path = "../../tests/query_trace_tests.rs"]
mod tests;
