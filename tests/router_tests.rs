//! Routing-table behavior through the public API: registration-order
//! precedence, both template dialects, and registration-time validation.

mod tracing_util;

use http::Method;

use routecore::{RegistrationError, RouteHandler, RouteTable};
use tracing_util::TestTracing;

fn noop(arity: usize) -> RouteHandler {
    RouteHandler::no_payload(arity, |_req, _params| Ok(()))
}

fn assert_route_match(table: &RouteTable, method: Method, path: &str, expected_template: &str) {
    match table.find_match(&method, path) {
        Some(m) => assert_eq!(
            m.route.pattern.template(),
            expected_template,
            "template mismatch for {} {}",
            method,
            path
        ),
        None => assert_eq!(
            expected_template, "<none>",
            "expected a route to match {} {}",
            method, path
        ),
    }
}

fn zoo_table() -> RouteTable {
    let mut table = RouteTable::new();
    table.get("/", |_req, _p| Ok(())).unwrap();
    table.get("/zoo/animals", |_req, _p| Ok(())).unwrap();
    table.post("/zoo/animals", |_req, _p| Ok(())).unwrap();
    table.get("/zoo/animals/{id}", |_req, _p| Ok(())).unwrap();
    table.put("/zoo/animals/{id}", |_req, _p| Ok(())).unwrap();
    table.delete("/zoo/animals/{id}", |_req, _p| Ok(())).unwrap();
    table
}

#[test]
fn test_route_root() {
    let _t = TestTracing::init();
    let table = zoo_table();
    assert_route_match(&table, Method::GET, "/", "/");
}

#[test]
fn test_verbs_share_a_path() {
    let _t = TestTracing::init();
    let table = zoo_table();
    assert_route_match(&table, Method::GET, "/zoo/animals", "/zoo/animals");
    assert_route_match(&table, Method::POST, "/zoo/animals", "/zoo/animals");
    assert_route_match(&table, Method::GET, "/zoo/animals/123", "/zoo/animals/{id}");
    assert_route_match(&table, Method::PUT, "/zoo/animals/123", "/zoo/animals/{id}");
    assert_route_match(
        &table,
        Method::DELETE,
        "/zoo/animals/123",
        "/zoo/animals/{id}",
    );
}

#[test]
fn test_unregistered_method_does_not_match() {
    let _t = TestTracing::init();
    let table = zoo_table();
    assert_route_match(&table, Method::PATCH, "/zoo/animals/123", "<none>");
}

#[test]
fn test_prefix_paths_do_not_match() {
    let _t = TestTracing::init();
    let table = zoo_table();
    assert_route_match(&table, Method::GET, "/zoo", "<none>");
    assert_route_match(&table, Method::GET, "/zoo/animals/123/food", "<none>");
}

#[test]
fn test_registration_order_breaks_ambiguity() {
    let _t = TestTracing::init();
    let mut table = RouteTable::new();
    // Both patterns match /report/latest; position decides.
    table.get("/report/latest", |_req, _p| Ok(())).unwrap();
    table.get("/report/{name}", |_req, _p| Ok(())).unwrap();
    assert_route_match(&table, Method::GET, "/report/latest", "/report/latest");
    assert_route_match(&table, Method::GET, "/report/daily", "/report/{name}");
}

#[test]
fn test_regex_dialect_constrains_captures() {
    let _t = TestTracing::init();
    let mut table = RouteTable::new();
    table
        .route(Method::GET, r"/orders/(\d{4})-(\d{2})", noop(2), 0)
        .unwrap();

    let m = table.find_match(&Method::GET, "/orders/2026-08").unwrap();
    assert_eq!(m.captures.as_slice(), ["2026".to_string(), "08".to_string()]);
    assert!(table.find_match(&Method::GET, "/orders/26-8").is_none());
}

#[test]
fn test_registration_surfaces_errors_immediately() {
    let _t = TestTracing::init();
    let mut table = RouteTable::new();

    let err = table.route(Method::GET, r"/(\d+", noop(1), 0).unwrap_err();
    assert!(matches!(err, RegistrationError::InvalidPattern { .. }));

    let err = table
        .route(Method::GET, r"/users/(\d+)/posts/(\d+)", noop(1), 0)
        .unwrap_err();
    match err {
        RegistrationError::ArityMismatch {
            captures, declared, ..
        } => {
            assert_eq!((captures, declared), (2, 1));
        }
        other => panic!("unexpected error: {other}"),
    }

    // Nothing was appended on either failure.
    assert!(table.is_empty());
}
