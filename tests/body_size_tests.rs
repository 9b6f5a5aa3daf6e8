//! Integration tests for the payload size bound
//!
//! These tests verify that:
//! 1. The bound is strict - cumulative size reaching or exceeding it fails
//! 2. Cumulative size strictly below the bound always succeeds, byte-for-byte
//! 3. The handler is never invoked once the bound is violated
//! 4. `Ignore` routes never enforce the bound

mod tracing_util;

use http::Method;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use routecore::{DispatchError, Dispatcher, Exchange, ExchangeState, RouteHandler, RouteTable};
use tracing_util::TestTracing;

fn upload_table(bound: usize, calls: Arc<AtomicUsize>, sink: Arc<Mutex<Vec<u8>>>) -> RouteTable {
    let mut table = RouteTable::new();
    table
        .route(
            Method::POST,
            "/upload",
            RouteHandler::binary(0, move |_req, payload, _params| {
                calls.fetch_add(1, Ordering::SeqCst);
                sink.lock().unwrap().extend_from_slice(payload);
                Ok(())
            }),
            bound,
        )
        .unwrap();
    table
}

#[test]
fn scenario_b_three_chunks_trip_the_bound() {
    let _t = TestTracing::init();
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::new(upload_table(1024, Arc::clone(&calls), Arc::clone(&sink)));

    let mut ex = Exchange::new(Method::POST, "/upload");
    dispatcher.begin(&mut ex).unwrap();
    dispatcher.body_chunk(&mut ex, &[0u8; 400], false).unwrap();
    dispatcher.body_chunk(&mut ex, &[0u8; 400], false).unwrap();

    // Third chunk: cumulative 1200 >= 1024.
    let err = dispatcher
        .body_chunk(&mut ex, &[0u8; 400], false)
        .unwrap_err();
    match err {
        DispatchError::PayloadTooLarge { limit, attempted } => {
            assert_eq!(limit, 1024);
            assert_eq!(attempted, 1200);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ex.state(), ExchangeState::Failed);
    assert_eq!(calls.load(Ordering::SeqCst), 0, "handler must never run");
    dispatcher.complete(&mut ex);
}

#[test]
fn exactly_reaching_the_bound_fails() {
    let _t = TestTracing::init();
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::new(upload_table(800, Arc::clone(&calls), sink));

    let mut ex = Exchange::new(Method::POST, "/upload");
    dispatcher.begin(&mut ex).unwrap();
    dispatcher.body_chunk(&mut ex, &[1u8; 400], false).unwrap();
    // 400 + 400 == 800: strict inequality rejects this chunk.
    let err = dispatcher
        .body_chunk(&mut ex, &[1u8; 400], false)
        .unwrap_err();
    assert!(matches!(err, DispatchError::PayloadTooLarge { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn staying_strictly_below_the_bound_round_trips() {
    let _t = TestTracing::init();
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::new(upload_table(1024, Arc::clone(&calls), Arc::clone(&sink)));

    let mut ex = Exchange::new(Method::POST, "/upload");
    dispatcher.begin(&mut ex).unwrap();
    let mut expected = Vec::new();
    for i in 0..3u8 {
        let chunk = vec![i; 341]; // 3 * 341 = 1023 < 1024
        dispatcher.body_chunk(&mut ex, &chunk, false).unwrap();
        expected.extend_from_slice(&chunk);
    }
    dispatcher.body_chunk(&mut ex, b"", true).unwrap();

    assert_eq!(ex.state(), ExchangeState::Done);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*sink.lock().unwrap(), expected, "byte-for-byte concatenation");
}

#[test]
fn unbounded_route_accepts_large_bodies() {
    let _t = TestTracing::init();
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::new(upload_table(0, Arc::clone(&calls), Arc::clone(&sink)));

    let mut ex = Exchange::new(Method::POST, "/upload");
    dispatcher.begin(&mut ex).unwrap();
    for _ in 0..8 {
        dispatcher.body_chunk(&mut ex, &[9u8; 8192], false).unwrap();
    }
    dispatcher.body_chunk(&mut ex, b"", true).unwrap();
    assert_eq!(sink.lock().unwrap().len(), 8 * 8192);
}

#[test]
fn ignore_route_is_exempt_from_the_bound() {
    let _t = TestTracing::init();
    let mut table = RouteTable::new();
    table
        .route(
            Method::POST,
            "/discard",
            RouteHandler::no_payload(0, |_req, _params| Ok(())),
            16,
        )
        .unwrap();
    let dispatcher = Dispatcher::new(table);

    let mut ex = Exchange::new(Method::POST, "/discard");
    dispatcher.begin(&mut ex).unwrap();
    dispatcher.body_chunk(&mut ex, &[0u8; 4096], false).unwrap();
    dispatcher.body_chunk(&mut ex, b"", true).unwrap();
    assert_eq!(ex.state(), ExchangeState::Done);
}
