use std::collections::HashMap;

use bytes::BytesMut;
use http::header::{CONTENT_TYPE, COOKIE};
use http::{HeaderMap, Method, Uri};
use mime::Mime;
use serde_json::{Map, Value};

use crate::body::Body;
use crate::error::Error;
use crate::query;

/// The connection security state the request arrived over.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// Route parameters extracted from named path segments.
#[derive(Clone, Debug, Default)]
pub struct Params(pub(crate) Vec<(String, String)>);

impl Params {
    pub fn get(&self, name: impl AsRef<str>) -> Option<&str> {
        let name = name.as_ref();
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (&**key, &**value))
    }
}

/// The decoded entity body, after content negotiation.
#[derive(Clone, Debug)]
pub enum RequestBody {
    Empty,
    /// A plain UTF-8 body.
    Text(String),
    /// A body parsed from `application/json`.
    Json(Value),
    /// A body parsed from `application/x-www-form-urlencoded`, using the
    /// same nested-key conventions as the query string.
    Form(Value),
}

impl RequestBody {
    /// The body as text; structured bodies and the empty body read as `""`.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            _ => "",
        }
    }

    /// The structured value of a JSON or form body.
    pub fn json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) | Self::Form(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// An inbound HTTP request.
///
/// Constructed once per connection by the mount adapter and owned by the
/// handler invocation that receives it; never mutated after construction.
/// Route parameters are merged in by building the effective request the
/// matched handler sees, not by mutating this one.
#[derive(Debug)]
pub struct Request {
    /// The request method.
    pub method: Method,

    /// The raw request target.
    pub uri: Uri,

    /// Whether the connection is TLS-terminated.
    pub protocol: Protocol,

    /// The request headers, names lower-cased by the transport stack.
    pub headers: HeaderMap,

    /// Cookies parsed from the `cookie` header; empty if absent or malformed.
    pub cookies: HashMap<String, String>,

    /// The parsed query string, nested-key notation expanded.
    pub query: Map<String, Value>,

    /// The decoded entity body.
    pub body: RequestBody,

    /// Named path segments; empty unless produced by the route matcher.
    pub params: Params,
}

impl Request {
    /// The path component of the request target.
    pub fn pathname(&self) -> &str {
        self.uri.path()
    }

    /// The full request target as a string.
    pub fn url(&self) -> String {
        self.uri.to_string()
    }

    /// The first value of a header, if present and valid UTF-8.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|value| value.to_str().ok())
    }

    pub fn cookie(&self, name: impl AsRef<str>) -> Option<&str> {
        self.cookies.get(name.as_ref()).map(|value| value.as_str())
    }

    /// Build the effective request passed to a matched handler.
    pub(crate) fn with_params(self, params: Params) -> Self {
        Self { params, ..self }
    }
}

/// Construct a [`Request`] from the raw connection pieces, draining the
/// entity-body stream completely before the handler can run.
pub(crate) async fn build(
    raw: http::Request<Body>,
    protocol: Protocol,
    body_limit: usize,
) -> Result<Request, Error> {
    let (parts, body) = raw.into_parts();
    let bytes = buffer(body, body_limit).await?;

    let cookies = parts
        .headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(parse_cookies)
        .unwrap_or_default();

    let query = parts
        .uri
        .query()
        .map(query::parse)
        .unwrap_or_default();

    let body = negotiate(&parts.headers, &bytes)?;

    Ok(Request {
        method: parts.method,
        uri: parts.uri,
        protocol,
        headers: parts.headers,
        cookies,
        query,
        body,
        params: Params::default(),
    })
}

async fn buffer(mut body: Body, limit: usize) -> Result<BytesMut, Error> {
    let mut buf = BytesMut::with_capacity(8192);

    while let Some(chunk) = body.chunk().await {
        let chunk = chunk
            .map_err(|err| Error::bad_request(format!("failed to read request body: {}", err)))?;

        if buf.len() + chunk.len() > limit {
            return Err(Error::PayloadTooLarge { limit });
        }

        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}

/// Decode the buffered body bytes according to the `content-type` header.
fn negotiate(headers: &HeaderMap, bytes: &[u8]) -> Result<RequestBody, Error> {
    if bytes.is_empty() {
        return Ok(RequestBody::Empty);
    }

    let mime = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Mime>().ok());

    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::bad_request("request body is not valid utf-8"))?;

    match mime {
        Some(mime) if is_json(&mime) => {
            let value = serde_json::from_str(text)
                .map_err(|err| Error::bad_request(format!("invalid json body: {}", err)))?;
            Ok(RequestBody::Json(value))
        }
        Some(mime) if is_form(&mime) => {
            let map = query::parse_form(text)?;
            Ok(RequestBody::Form(Value::Object(map)))
        }
        _ => Ok(RequestBody::Text(text.to_owned())),
    }
}

fn is_json(mime: &Mime) -> bool {
    mime.type_() == mime::APPLICATION
        && (mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON))
}

fn is_form(mime: &Mime) -> bool {
    mime.type_() == mime::APPLICATION && mime.subtype() == mime::WWW_FORM_URLENCODED
}

/// Parse a `cookie` header value. Malformed pairs are skipped, not fatal.
fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_owned(), value.trim().trim_matches('"').to_owned()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_parsing() {
        let cookies = parse_cookies("session=abc123; theme=dark");
        assert_eq!(cookies.get("session").map(String::as_str), Some("abc123"));
        assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));
    }

    #[test]
    fn malformed_cookie_pairs_are_skipped() {
        let cookies = parse_cookies("good=1; garbage; =nameless");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.get("good").map(String::as_str), Some("1"));
    }

    #[test]
    fn quoted_cookie_values() {
        let cookies = parse_cookies(r#"pref="a b""#);
        assert_eq!(cookies.get("pref").map(String::as_str), Some("a b"));
    }
}
