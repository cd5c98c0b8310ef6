//! Glider adapts a raw, callback-oriented HTTP connection into a single pure
//! transformation: an immutable [`Request`] goes in, a [`Response`] (or a
//! future resolving to one) comes out.
//!
//! The entire public surface is the [`Handler`] trait, one composition
//! primitive (plain function wrapping), and [`mount`], which binds a handler
//! to the transport callback shape. Everything else is plumbing around that:
//! request construction, route matching, error normalization, and response
//! finalization.
//!
//! ```no_run
//! use glider::{json, mount, route, routes, Error, Method, Request, Response};
//! use serde_json::json;
//!
//! async fn echo(req: Request) -> Result<Response, Error> {
//!     json(&json!({ "id": req.params.get("id") }))
//! }
//!
//! let app = mount(routes(vec![
//!     route(Method::GET, "/echo/:id", echo),
//! ]));
//! ```
//!
//! Failures surface as the tagged [`Error`] type and are normalized to a
//! canonical JSON wire body; the client never sees a raw panic message or a
//! hung connection for a recognized failure shape.

mod body;
mod error;
mod handler;
mod mount;
mod query;
mod request;
mod respond;
mod response;
mod router;

pub use async_trait::async_trait;
pub use body::{Body, BoxError};
pub use error::{Error, ValidationDetail};
pub use handler::{BoxHandler, Handler};
pub use mount::{mount, Mount};
pub use request::{Params, Protocol, Request, RequestBody};
pub use response::{html, json, redirect, redirect_with, send, Response};
pub use router::{route, routes, Route, Router};

pub use bytes::Bytes;
pub use http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
