use http::header::IF_NONE_MATCH;

use crate::body::Body;
use crate::handler::Handler;
use crate::request::{self, Protocol};
use crate::respond;
use crate::response::Response;

// ~256kB
const DEFAULT_BODY_LIMIT: usize = 262_144;

/// Bind a pure handler to the raw connection callback shape.
pub fn mount<H>(handler: H) -> Mount<H>
where
    H: Handler,
{
    Mount {
        handler,
        body_limit: DEFAULT_BODY_LIMIT,
        protocol: Protocol::Http,
    }
}

/// The top-level adapter between a raw connection and a [`Handler`].
///
/// One `Mount` is built at startup and shared across connections; it holds
/// no per-request state. For each connection it builds the request, invokes
/// the handler at most once, normalizes any failure, and finalizes exactly
/// one response.
pub struct Mount<H> {
    handler: H,
    body_limit: usize,
    protocol: Protocol,
}

impl<H> Mount<H>
where
    H: Handler,
{
    /// Cap the entity body at `limit` bytes; beyond it the request fails
    /// with 413 before the handler runs.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Mark inbound connections as TLS-terminated, which drives
    /// [`Request::protocol`](crate::Request::protocol).
    pub fn secure(mut self, secure: bool) -> Self {
        self.protocol = if secure {
            Protocol::Https
        } else {
            Protocol::Http
        };
        self
    }

    /// Serve one raw connection.
    ///
    /// The entity body is fully drained before the handler runs, and the
    /// handler's failure (or the builder's own) is normalized through the
    /// same path; either way the connection sees exactly one response.
    pub async fn serve_one(&self, raw: http::Request<Body>) -> Response {
        let method = raw.method().clone();
        let path = raw.uri().path().to_owned();
        let if_none_match = raw.headers().get(IF_NONE_MATCH).cloned();

        let result = match request::build(raw, self.protocol, self.body_limit).await {
            Ok(req) => self.handler.call(req).await,
            Err(err) => Err(err),
        };

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                if err.status().is_server_error() {
                    log::error!("{} {} failed: {}", method, path, err);
                }
                err.into_response()
            }
        };

        let response = respond::finalize(response, if_none_match);
        log::debug!("{} {} -> {}", method, path, response.status);
        response
    }
}
