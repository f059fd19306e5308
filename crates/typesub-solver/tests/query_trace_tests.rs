use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::engine::TypeEngine;
use crate::relation_queries::SubtypePolicy;
use crate::resolve::ForwardRefEnv;

/// Collects everything a JSON formatter writes.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn events(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(|line| serde_json::from_str(line).expect("one JSON object per line"))
            .collect()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_queries(f: impl FnOnce()) -> Vec<Value> {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new("typesub::query_json=trace"))
        .with_writer(captured.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    captured.events()
}

#[test]
fn test_relate_emits_start_and_end_events() {
    let engine = TypeEngine::new();
    let env = ForwardRefEnv::new();
    let left = engine.normalize_str("List[bool]").unwrap();
    let right = engine.normalize_str("Sequence[int]").unwrap();

    let events = capture_queries(|| {
        engine.relate(left, right, &env).unwrap();
        engine.relate(left, right, &env).unwrap();
    });

    assert_eq!(events.len(), 4, "{events:#?}");
    for event in &events {
        assert_eq!(event["target"], "typesub::query_json");
        assert_eq!(event["fields"]["event"], "query");
        assert_eq!(event["fields"]["op"], "is_subtype");
    }

    let fields: Vec<&Value> = events.iter().map(|event| &event["fields"]).collect();
    assert_eq!(fields[0]["phase"], "start");
    assert_eq!(fields[0]["left_type_id"], left.0);
    assert_eq!(fields[0]["right_type_id"], right.0);
    assert_eq!(fields[1]["phase"], "end");
    assert_eq!(fields[1]["query_id"], fields[0]["query_id"]);
    assert_eq!(fields[1]["verdict"], "true");
    assert_eq!(fields[1]["depth_exceeded"], false);
    assert_eq!(fields[1]["cache_hit"], false);

    assert_eq!(fields[2]["phase"], "start");
    assert_ne!(fields[2]["query_id"], fields[0]["query_id"]);
    assert_eq!(fields[3]["query_id"], fields[2]["query_id"]);
    assert_eq!(fields[3]["cache_hit"], true);
}

#[test]
fn test_end_event_reports_the_recursion_limit() {
    let engine = TypeEngine::new().with_policy(SubtypePolicy::default().with_max_depth(1));
    let left = engine.normalize_str("List[List[bool]]").unwrap();
    let right = engine.normalize_str("Sequence[Sequence[int]]").unwrap();

    let events = capture_queries(|| {
        engine.relate(left, right, &ForwardRefEnv::new()).unwrap();
    });

    let end = &events.last().expect("an end event")["fields"];
    assert_eq!(end["phase"], "end");
    assert_eq!(end["verdict"], "unknown");
    assert_eq!(end["depth_exceeded"], true);
}
