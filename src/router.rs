use async_trait::async_trait;
use http::Method;

use crate::error::Error;
use crate::handler::{BoxHandler, Handler};
use crate::request::{Params, Request};
use crate::response::Response;

/// A single `(method, pattern, handler)` binding.
pub struct Route {
    method: Method,
    pattern: Pattern,
    handler: BoxHandler,
}

/// Bind a handler to a method and path pattern.
///
/// Patterns are `/`-separated: static segments match case-sensitively,
/// `:name` matches a single segment and captures it, and a trailing `*` (or
/// `*name`) captures the whole remainder. At most one splat is allowed and
/// it must be the final segment.
///
/// # Panics
///
/// Panics if the pattern is invalid.
pub fn route<H>(method: Method, pattern: &str, handler: H) -> Route
where
    H: Handler + 'static,
{
    Route {
        method,
        pattern: Pattern::compile(pattern).expect("failed to compile route pattern"),
        handler: Box::new(handler),
    }
}

/// Compose an ordered binding list into a single handler.
///
/// Matching is first-match-wins over the list order. A binding whose path
/// matches but whose method does not is skipped like any other mismatch, so
/// an exhausted scan yields 404, never 405. Scanning in order means an
/// earlier `/a/:id` shadows a later `/a/static`; ordering in the binding
/// list is part of the routing contract.
pub fn routes(bindings: Vec<Route>) -> Router {
    Router { bindings }
}

/// The route-matching handler produced by [`routes`].
///
/// Read-only after construction, so one router is safely shared by every
/// connection.
pub struct Router {
    bindings: Vec<Route>,
}

#[async_trait]
impl Handler for Router {
    async fn call(&self, req: Request) -> Result<Response, Error> {
        for binding in &self.bindings {
            if binding.method != req.method {
                continue;
            }

            if let Some(params) = binding.pattern.matches(req.pathname()) {
                return binding.handler.call(req.with_params(params)).await;
            }
        }

        Err(Error::not_found())
    }
}

enum Segment {
    Static(String),
    Param(String),
    Splat(String),
}

struct Pattern {
    segments: Vec<Segment>,
}

#[derive(Debug)]
enum PatternError {
    Empty,
    SplatNotLast,
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "pattern must start with '/'"),
            Self::SplatNotLast => write!(f, "splat segment must be last"),
        }
    }
}

impl Pattern {
    fn compile(pattern: &str) -> Result<Self, PatternError> {
        let pattern = pattern.strip_prefix('/').ok_or(PatternError::Empty)?;

        let mut segments = Vec::new();
        for (i, raw) in pattern.split('/').enumerate() {
            if matches!(segments.last(), Some(Segment::Splat(_))) {
                return Err(PatternError::SplatNotLast);
            }

            segments.push(match raw {
                "" if i == 0 => continue,
                "*" => Segment::Splat("wildcard".to_owned()),
                raw if raw.starts_with('*') => Segment::Splat(raw[1..].to_owned()),
                raw if raw.starts_with(':') => Segment::Param(raw[1..].to_owned()),
                raw => Segment::Static(raw.to_owned()),
            });
        }

        Ok(Self { segments })
    }

    fn matches(&self, path: &str) -> Option<Params> {
        let path = path.strip_prefix('/')?;
        let parts: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };

        let mut params = Vec::new();
        let mut at = 0;

        for segment in &self.segments {
            match segment {
                Segment::Splat(name) => {
                    // The splat swallows the remainder, empty included.
                    params.push((name.clone(), parts[at..].join("/")));
                    return Some(Params(params));
                }
                Segment::Static(expect) => {
                    if parts.get(at).copied() != Some(expect.as_str()) {
                        return None;
                    }
                    at += 1;
                }
                Segment::Param(name) => {
                    let value = parts.get(at).copied()?;
                    if value.is_empty() {
                        return None;
                    }
                    params.push((name.clone(), value.to_owned()));
                    at += 1;
                }
            }
        }

        // Every pattern segment consumed; the path must be exhausted too.
        (at == parts.len()).then(|| Params(params))
    }
}
