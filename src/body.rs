use std::error::Error as StdError;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::{fmt, mem};

use bytes::Bytes;
use futures_core::Stream;

pub type BoxError = Box<dyn StdError + Send + Sync>;
pub(crate) type BoxStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send + Sync>>;

/// Represents the body of an HTTP message.
///
/// A body is either empty, a single chunk of bytes, or a lazy stream of
/// chunks. The variant decides the serialization path: buffered bodies get a
/// computed `content-length` and an etag, streamed bodies are piped to the
/// connection as-is.
pub enum Body {
    Stream(BoxStream),
    Once(Bytes),
    Empty,
}

impl Body {
    /// Create a `Body` from a stream of bytes.
    pub fn stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + Sync + 'static,
        E: StdError + Send + Sync + 'static,
    {
        pub struct MapErr<S>(S);

        impl<T, E, S> Stream for MapErr<S>
        where
            E: StdError + Send + Sync + 'static,
            S: Stream<Item = Result<T, E>>,
        {
            type Item = Result<T, BoxError>;

            fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
                unsafe { self.map_unchecked_mut(|s| &mut s.0) }
                    .poll_next(cx)
                    .map_err(|err| Box::new(err) as _)
            }
        }

        Self::Stream(Box::pin(MapErr(stream)))
    }

    /// Create a body directly from bytes.
    pub fn once(bytes: impl Into<Bytes>) -> Self {
        Self::Once(bytes.into())
    }

    /// Create an empty `Body`.
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Await the next chunk of the body.
    pub async fn chunk(&mut self) -> Option<Result<Bytes, BoxError>> {
        std::future::poll_fn(|cx| Pin::new(&mut *self).poll_next(cx)).await
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::once(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::once(bytes)
    }
}

impl From<String> for Body {
    fn from(string: String) -> Self {
        Self::once(string)
    }
}

impl From<&'static str> for Body {
    fn from(string: &'static str) -> Self {
        Self::once(string)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").finish()
    }
}

impl Stream for Body {
    type Item = Result<Bytes, BoxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match &mut *self {
            Self::Stream(stream) => stream.as_mut().poll_next(cx),
            Self::Once(bytes) => {
                let bytes = mem::take(bytes);
                *self = Self::Empty;
                Some(Ok(bytes)).into()
            }
            Self::Empty => None.into(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &*self {
            Self::Stream(stream) => stream.size_hint(),
            Self::Once(bytes) => (bytes.len(), Some(bytes.len())),
            Self::Empty => (0, Some(0)),
        }
    }
}
