use http::header::{HeaderValue, IntoHeaderName, CONTENT_TYPE, LOCATION};
use http::{HeaderMap, StatusCode};
use serde::Serialize;

use crate::body::Body;
use crate::error::Error;

/// An HTTP response: a plain value produced by a handler and consumed
/// exactly once by the writer.
#[derive(Debug, Default)]
pub struct Response {
    /// The response status, 200 by default.
    pub status: StatusCode,

    /// The response headers, applied to the connection as-is.
    pub headers: HeaderMap,

    /// The response body.
    pub body: Body,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Set a header, replacing any previous value for the same name.
    ///
    /// Values that are not valid header values are dropped.
    pub fn header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: IntoHeaderName,
        V: TryInto<HeaderValue>,
    {
        match value.try_into() {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => log::warn!("dropped invalid header value"),
        }

        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }
}

/// Respond with a plain body and status 200.
pub fn send(body: impl Into<Body>) -> Response {
    Response::new().body(body)
}

/// Respond with an HTML body.
pub fn html(body: impl Into<Body>) -> Response {
    Response::new()
        .header(CONTENT_TYPE, "text/html")
        .body(body)
}

/// Respond with a value serialized as JSON.
pub fn json<T>(value: &T) -> Result<Response, Error>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(value)?;

    Ok(Response::new()
        .header(CONTENT_TYPE, "application/json")
        .body(body))
}

/// Respond with a 302 redirect to the given location.
pub fn redirect(location: &str) -> Response {
    redirect_with(StatusCode::FOUND, location)
}

/// Respond with a redirect of the given status.
pub fn redirect_with(status: StatusCode, location: &str) -> Response {
    Response::new().status(status).header(LOCATION, location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_sets_content_type() {
        let response = json(&serde_json::json!({ "a": 1 })).unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn redirect_sets_location() {
        let response = redirect("/login");
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.headers.get(LOCATION).unwrap(), "/login");
    }
}
