//! End-to-end dispatch through the public API.

use trellis::pagination::{self, Paginated};
use trellis::{
    BuildInfo, EndpointDescriptor, IntoResponse, Method, Request, Response, RouteController,
    Service, ServiceConfig, Status,
};

async fn dummy_get(_req: Request) -> Response {
    Response::text("dummy for GET")
}

async fn dummy_post(_req: Request) -> Response {
    Response::text("dummy for POST")
}

async fn list_things(req: Request) -> Response {
    match pagination::limit_and_offset(&req.query_params()) {
        Ok(w) => Paginated::new(Vec::<u32>::new(), "thing", 26, w.limit, w.offset).into_response(),
        Err(e) => e.into_response(),
    }
}

fn service() -> Service {
    let config = ServiceConfig {
        build: BuildInfo {
            build: "abc123".to_owned(),
            build_date: "2026-10-16T00:00:00Z".to_owned(),
            command: "trellis-test".to_owned(),
        },
        ..ServiceConfig::default()
    };

    Service::new(config)
        .controller(
            RouteController::new("/dummyRoute")
                .on(Method::Get, dummy_get).unwrap()
                .on(Method::Post, dummy_post).unwrap(),
        )
        .controller(RouteController::new("/things").on(Method::Get, list_things).unwrap())
}

fn json(res: &Response) -> serde_json::Value {
    serde_json::from_slice(res.body()).unwrap()
}

#[tokio::test]
async fn test_should_provide_head_and_options() {
    let table = service().build_dispatch_table().unwrap();
    for method in ["OPTIONS", "HEAD"] {
        let res = table.handle(Request::new(method, "/dummyRoute")).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.header("allow"), Some("GET,HEAD,OPTIONS,POST"));
    }
}

#[tokio::test]
async fn test_should_give_method_not_allowed() {
    let table = service().build_dispatch_table().unwrap();
    let res = table.handle(Request::new("PUT", "/dummyRoute")).await;

    assert_eq!(res.status_code(), 405);
    assert_eq!(res.header("allow"), Some("GET,HEAD,OPTIONS,POST"));
    assert_eq!(
        json(&res),
        serde_json::json!({"error": "405 Method Not Allowed. Allowed: GET,HEAD,OPTIONS,POST"})
    );
}

#[tokio::test]
async fn test_should_provide_404_response() {
    let table = service().build_dispatch_table().unwrap();
    let res = table.handle(Request::new("GET", "/foobar")).await;

    assert_eq!(res.status_code(), 404);
    assert_eq!(json(&res), serde_json::json!({"error": "/foobar not found"}));
}

#[tokio::test]
async fn test_should_serve_version_and_heartbeat() {
    let table = service().build_dispatch_table().unwrap();
    let expected = serde_json::json!({
        "build": "abc123",
        "buildDate": "2026-10-16T00:00:00Z",
        "command": "trellis-test",
    });

    for path in ["/version", "/heartbeat"] {
        let res = table.handle(Request::new("GET", path)).await;
        assert_eq!(res.status_code(), 200, "{path}");
        assert_eq!(json(&res), expected, "{path}");
    }
}

#[tokio::test]
async fn test_should_override_version_endpoint() {
    let table = service()
        .controller(RouteController::new("/version").on(Method::Get, dummy_get).unwrap())
        .build_dispatch_table()
        .unwrap();

    let res = table.handle(Request::new("GET", "/version")).await;
    assert_eq!(res.body(), b"dummy for GET");
}

#[tokio::test]
async fn test_should_list_endpoints_at_root() {
    let table = service().build_dispatch_table().unwrap();
    let res = table.handle(Request::new("GET", "/")).await;
    let index: Vec<EndpointDescriptor> = serde_json::from_slice(res.body()).unwrap();

    assert_eq!(
        index,
        vec![
            EndpointDescriptor::new("/dummyRoute", "GET,HEAD,OPTIONS,POST"),
            EndpointDescriptor::new("/heartbeat", "GET,HEAD,OPTIONS"),
            EndpointDescriptor::new("/stats", "GET,HEAD,OPTIONS"),
            EndpointDescriptor::new("/things", "GET,HEAD,OPTIONS"),
            EndpointDescriptor::new("/version", "GET,HEAD,OPTIONS"),
        ]
    );
}

#[tokio::test]
async fn test_should_paginate_list_endpoint() {
    let table = service().build_dispatch_table().unwrap();

    let res = table.handle(Request::new("GET", "/things?limit=25&offset=25")).await;
    assert_eq!(res.status_code(), 200);
    let body = json(&res);
    assert_eq!(body["offset"], 25);
    assert_eq!(body["maxOffset"], 25);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["page"], 2);
    assert_eq!(body["type"], "thing");

    let res = table.handle(Request::new("GET", "/things?page=3&limit=20")).await;
    let body = json(&res);
    assert_eq!(body["limit"], 20);
    assert_eq!(body["offset"], 40);
}

#[tokio::test]
async fn test_should_reject_invalid_pagination_with_400() {
    let table = service().build_dispatch_table().unwrap();
    let res = table.handle(Request::new("GET", "/things?limit=7")).await;

    assert_eq!(res.status_code(), u16::from(Status::BadRequest));
    assert_eq!(json(&res), serde_json::json!({"error": "limit (7) must be a multiple of 5"}));
}

#[tokio::test]
async fn test_should_reject_huge_offset_and_page_with_400() {
    let table = service().build_dispatch_table().unwrap();

    let res = table.handle(Request::new("GET", "/things?offset=9223372036854775800")).await;
    assert_eq!(res.status_code(), 400);
    assert_eq!(
        json(&res),
        serde_json::json!({"error": "offset (9223372036854775800) is too large"})
    );

    let res = table.handle(Request::new("GET", "/things?page=9223372036854775807")).await;
    assert_eq!(res.status_code(), 400);
    assert_eq!(
        json(&res),
        serde_json::json!({"error": "page (9223372036854775807) is too large"})
    );
}
