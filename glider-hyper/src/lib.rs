//! Hyper transport binding for glider: wraps a [`Mount`] in the
//! `Service`/`MakeService` shape hyper's connection loop expects.

use std::convert::Infallible;
use std::future::{ready, Future, Ready};
use std::io;
use std::net::*;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use futures_core::Stream;
use glider::{Handler, Mount};
use hyper::server::conn::AddrIncoming;
use hyper::service::Service;

pub use hyper::Server;

/// Wrap a mounted handler in the make-service shape hyper's server loop
/// expects.
pub fn make<H>(mount: Mount<H>) -> GliderMakeService<H>
where
    H: Handler + 'static,
{
    mount.into_make_service()
}

pub trait Serve<H> {
    fn serve(self, addr: impl ToSocketAddr) -> Server<AddrIncoming, GliderMakeService<H>>;
    fn into_make_service(self) -> GliderMakeService<H>;
    fn into_service(self) -> GliderService<H>;
}

impl<H> Serve<H> for Mount<H>
where
    H: Handler + 'static,
{
    fn serve(self, addr: impl ToSocketAddr) -> Server<AddrIncoming, GliderMakeService<H>> {
        let addr = addr.to_socket_addr().expect("failed to create socket addr");
        hyper::Server::bind(&addr).serve(self.into_make_service())
    }

    fn into_make_service(self) -> GliderMakeService<H> {
        GliderMakeService {
            service: self.into_service(),
        }
    }

    fn into_service(self) -> GliderService<H> {
        GliderService {
            mount: Arc::new(self),
        }
    }
}

pub struct GliderMakeService<H> {
    service: GliderService<H>,
}

impl<T, H> Service<T> for GliderMakeService<H> {
    type Response = GliderService<H>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Infallible>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _: T) -> Self::Future {
        ready(Ok(self.service.clone()))
    }
}

pub struct GliderService<H> {
    mount: Arc<Mount<H>>,
}

impl<H> Service<hyper::Request<hyper::Body>> for GliderService<H>
where
    H: Handler + 'static,
{
    type Response = hyper::Response<GliderHttpBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: hyper::Request<hyper::Body>) -> Self::Future {
        let (parts, body) = req.into_parts();
        let req = hyper::Request::from_parts(parts, glider::Body::stream(body));
        let mount = self.mount.clone();

        Box::pin(async move {
            let res = mount.serve_one(req).await;

            let mut out = hyper::Response::new(GliderHttpBody { inner: res.body });
            *out.status_mut() = res.status;
            *out.headers_mut() = res.headers;
            Ok(out)
        })
    }
}

impl<H> Clone for GliderService<H> {
    fn clone(&self) -> Self {
        Self {
            mount: self.mount.clone(),
        }
    }
}

pub struct GliderHttpBody {
    inner: glider::Body,
}

impl http_body::Body for GliderHttpBody {
    type Data = glider::Bytes;
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn poll_data(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Self::Data, Self::Error>>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn poll_trailers(
        self: Pin<&mut Self>,
        _: &mut Context<'_>,
    ) -> Poll<Result<Option<hyper::HeaderMap>, Self::Error>> {
        Poll::Ready(Ok(None))
    }

    fn size_hint(&self) -> http_body::SizeHint {
        let (lower, upper) = self.inner.size_hint();

        let mut hint = http_body::SizeHint::new();
        hint.set_lower(lower as _);
        if let Some(upper) = upper {
            hint.set_upper(upper as _);
        }

        hint
    }
}

pub trait ToSocketAddr {
    fn to_socket_addr(self) -> io::Result<SocketAddr>;
}

impl ToSocketAddr for SocketAddr {
    fn to_socket_addr(self) -> io::Result<SocketAddr> {
        Ok(self)
    }
}

macro_rules! to_socket_addr {
    ($($ty:ty),*) => {$(
        impl ToSocketAddr for $ty {
            fn to_socket_addr(self) -> io::Result<SocketAddr> {
                let mut addrs = self.to_socket_addrs()?;
                addrs.next().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "no socket address resolved")
                })
            }
        }
    )*}
}

to_socket_addr! {
    &str,
    String,
    (&str, u16),
    (IpAddr, u16),
    (String, u16),
    (Ipv4Addr, u16),
    (Ipv6Addr, u16),
    SocketAddrV4,
    SocketAddrV6
}
