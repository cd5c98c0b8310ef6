use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glider::{mount, route, routes, send, Body, Error, Method, Request, Response, StatusCode};
use serde_json::Value;

fn raw(method: &str, uri: &str) -> http::Request<Body> {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_body(mut body: Body) -> Vec<u8> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.chunk().await {
        buf.extend_from_slice(&chunk.unwrap());
    }
    buf
}

#[tokio::test]
async fn first_match_wins_over_a_later_static_binding() {
    // `/a/:id` appears first, so it shadows `/a/static`; ordering in the
    // binding list is part of the contract.
    let app = mount(routes(vec![
        route(Method::GET, "/a/:id", |req: Request| async move {
            Ok(send(format!("h1:{}", req.params.get("id").unwrap_or(""))))
        }),
        route(Method::GET, "/a/static", |_: Request| async {
            Ok(send("h2"))
        }),
    ]));

    let res = app.serve_one(raw("GET", "/a/static")).await;
    assert_eq!(read_body(res.body).await, b"h1:static");
}

#[tokio::test]
async fn no_match_is_404_and_invokes_no_handler() {
    let invoked = Arc::new(AtomicBool::new(false));
    let flag = invoked.clone();

    let app = mount(routes(vec![route(
        Method::GET,
        "/present",
        move |_: Request| {
            let flag = flag.clone();
            async move {
                flag.store(true, Ordering::SeqCst);
                Ok(send("ok"))
            }
        },
    )]));

    let res = app.serve_one(raw("GET", "/absent")).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(!invoked.load(Ordering::SeqCst));

    let body: Value = serde_json::from_slice(&read_body(res.body).await).unwrap();
    assert_eq!(body["message"], "Not Found");
    assert_eq!(body["name"], "Error");
}

#[tokio::test]
async fn method_mismatch_falls_through_to_404_not_405() {
    let app = mount(routes(vec![route(
        Method::GET,
        "/resource",
        |_: Request| async { Ok(send("ok")) },
    )]));

    let res = app.serve_one(raw("POST", "/resource")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scanning_continues_past_a_method_mismatch() {
    let app = mount(routes(vec![
        route(Method::POST, "/x", |_: Request| async { Ok(send("post")) }),
        route(Method::GET, "/x", |_: Request| async { Ok(send("get")) }),
    ]));

    let res = app.serve_one(raw("GET", "/x")).await;
    assert_eq!(read_body(res.body).await, b"get");
}

#[tokio::test]
async fn named_segments_populate_params() {
    let app = mount(routes(vec![route(
        Method::GET,
        "/users/:id/books/:book",
        |req: Request| async move {
            Ok(send(format!(
                "{}/{}",
                req.params.get("id").unwrap_or(""),
                req.params.get("book").unwrap_or("")
            )))
        },
    )]));

    let res = app.serve_one(raw("GET", "/users/7/books/dune")).await;
    assert_eq!(read_body(res.body).await, b"7/dune");
}

#[tokio::test]
async fn splat_captures_the_remainder() {
    let app = mount(routes(vec![route(
        Method::GET,
        "/files/*path",
        |req: Request| async move {
            Ok(send(
                req.params.get("path").unwrap_or("").to_owned(),
            ))
        },
    )]));

    let res = app.serve_one(raw("GET", "/files/docs/readme.txt")).await;
    assert_eq!(read_body(res.body).await, b"docs/readme.txt");
}

#[tokio::test]
async fn static_segments_are_case_sensitive() {
    let app = mount(routes(vec![route(Method::GET, "/Users", |_: Request| {
        async { Ok(send("ok")) }
    })]));

    let res = app.serve_one(raw("GET", "/users")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn handlers_can_fail_through_the_router() {
    let app = mount(routes(vec![route(Method::GET, "/", |_: Request| async {
        Err::<Response, _>(Error::http(StatusCode::CONFLICT, "already exists"))
    })]));

    let res = app.serve_one(raw("GET", "/")).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}
