use std::future::Future;

use async_trait::async_trait;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// An asynchronous `Request -> Response` function.
///
/// This is the framework's entire public surface: a handler owns the request
/// it receives and settles exactly once, with a response or a failure.
/// Extension is plain function composition, wrapping one handler in another:
///
/// ```
/// use std::sync::Arc;
/// use glider::{Error, Handler, Request, Response};
///
/// fn logged<H: Handler + 'static>(inner: H) -> impl Handler {
///     let inner = Arc::new(inner);
///     move |req: Request| {
///         let inner = inner.clone();
///         async move {
///             log::debug!("{} {}", req.method, req.pathname());
///             inner.call(req).await
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: Request) -> Result<Response, Error>;
}

/// A type-erased handler, as stored in a route binding table.
pub type BoxHandler = Box<dyn Handler>;

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    async fn call(&self, req: Request) -> Result<Response, Error> {
        (self)(req).await
    }
}
