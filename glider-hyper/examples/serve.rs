use std::net::SocketAddr;

use glider::{html, json, mount, route, routes, Error, Method, Request, Response};
use glider_hyper::{make, Server};
use serde_json::json as value;

async fn home(_: Request) -> Result<Response, Error> {
    Ok(html("<h1>hello from glider</h1>"))
}

async fn greet(req: Request) -> Result<Response, Error> {
    let name = req.params.get("name").unwrap_or("stranger");
    json(&value!({ "greeting": format!("hello, {}", name) }))
}

#[tokio::main]
async fn main() {
    let app = routes(vec![
        route(Method::GET, "/", home),
        route(Method::GET, "/greet/:name", greet),
    ]);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    Server::bind(&addr).serve(make(mount(app))).await.unwrap()
}
