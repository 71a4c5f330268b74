//! Requests over a real socket, through hyper's connection handling.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use trellis::pagination::{self, Paginated};
use trellis::{IntoResponse, Method, Request, Response, RouteController, Server, Service};

async fn list_things(req: Request) -> Response {
    match pagination::limit_and_offset(&req.query_params()) {
        Ok(w) => Paginated::new(Vec::<u32>::new(), "thing", 26, w.limit, w.offset).into_response(),
        Err(e) => e.into_response(),
    }
}

struct RawResponse {
    status: u16,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

/// Sends one HTTP/1.1 request with `Connection: close` and reads the whole
/// reply.
async fn send(addr: SocketAddr, method: &str, target: &str) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!("{method} {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(head.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();

    let split = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
    let head = std::str::from_utf8(&raw[..split]).unwrap();
    let mut lines = head.split("\r\n");
    let status = lines.next().unwrap().split(' ').nth(1).unwrap().parse().unwrap();
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_owned()))
        .collect();

    RawResponse { status, headers, body: raw[split + 4..].to_vec() }
}

#[tokio::test]
async fn test_should_serve_controller_semantics_over_the_wire() {
    let table = Service::default()
        .controller(RouteController::new("/things").on(Method::Get, list_things).unwrap())
        .build_dispatch_table()
        .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(Server::serve_listener(listener, table, async {
        let _ = stopped.await;
    }));

    let res = send(addr, "OPTIONS", "/things").await;
    assert_eq!(res.status, 200);
    assert_eq!(res.headers["allow"], "GET,HEAD,OPTIONS");
    assert_eq!(res.headers["content-length"], "0");
    assert!(res.body.is_empty());

    let res = send(addr, "HEAD", "/things").await;
    assert_eq!(res.status, 200);
    assert_eq!(res.headers["allow"], "GET,HEAD,OPTIONS");
    assert!(res.body.is_empty());

    let res = send(addr, "PUT", "/things").await;
    assert_eq!(res.status, 405);
    assert_eq!(res.headers["allow"], "GET,HEAD,OPTIONS");
    assert!(res.headers["content-type"].starts_with("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&res.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"error": "405 Method Not Allowed. Allowed: GET,HEAD,OPTIONS"})
    );

    let res = send(addr, "GET", "/things?limit=7").await;
    assert_eq!(res.status, 400);
    let body: serde_json::Value = serde_json::from_slice(&res.body).unwrap();
    assert_eq!(body, serde_json::json!({"error": "limit (7) must be a multiple of 5"}));

    let res = send(addr, "GET", "/things?page=2&limit=5").await;
    assert_eq!(res.status, 200);
    let body: serde_json::Value = serde_json::from_slice(&res.body).unwrap();
    assert_eq!(body["offset"], 5);

    let res = send(addr, "GET", "/things/").await;
    assert_eq!(res.status, 301);
    assert_eq!(res.headers["location"], "/things");

    let res = send(addr, "GET", "/missing").await;
    assert_eq!(res.status, 404);

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
