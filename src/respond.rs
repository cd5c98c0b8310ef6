//! Response finalization: body dispatch, `content-length`, and the
//! conditional-GET (`etag`/`if-none-match`) short-circuit.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use http::header::{HeaderValue, CONTENT_LENGTH, ETAG};
use http::StatusCode;
use sha1::{Digest, Sha1};

use crate::body::Body;
use crate::response::Response;

/// Prepare a response for the wire.
///
/// Buffered bodies get a computed `content-length` and, when the handler set
/// none, an etag derived from the bytes; a matching `if-none-match` on a
/// success status short-circuits to 304 with no body. Streamed bodies pass
/// through untouched: no length, no etag.
pub(crate) fn finalize(mut res: Response, if_none_match: Option<HeaderValue>) -> Response {
    match &res.body {
        Body::Empty => {
            if !res.headers.contains_key(CONTENT_LENGTH) {
                res.headers
                    .insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
            }
            res
        }
        Body::Once(bytes) => {
            let len = bytes.len();

            if !res.headers.contains_key(ETAG) {
                if let Ok(value) = HeaderValue::try_from(etag(bytes)) {
                    res.headers.insert(ETAG, value);
                }
            }

            if res.status.is_success() {
                let fresh = match (&if_none_match, res.headers.get(ETAG)) {
                    (Some(inm), Some(tag)) => inm == tag,
                    _ => false,
                };

                if fresh {
                    res.status = StatusCode::NOT_MODIFIED;
                    res.body = Body::Empty;
                    res.headers.remove(CONTENT_LENGTH);
                    return res;
                }
            }

            res.headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
            res
        }
        Body::Stream(_) => res,
    }
}

/// A strong etag over the body bytes: hex length, then the first 27
/// characters of the base64 sha-1 digest.
fn etag(bytes: &[u8]) -> String {
    let hash = STANDARD_NO_PAD.encode(Sha1::digest(bytes));
    format!("\"{:x}-{}\"", bytes.len(), &hash[..27])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_is_deterministic() {
        assert_eq!(etag(b"hello"), etag(b"hello"));
        assert_ne!(etag(b"hello"), etag(b"world"));
    }

    #[test]
    fn empty_body_gets_zero_length() {
        let res = finalize(Response::new(), None);
        assert_eq!(res.headers.get(CONTENT_LENGTH).unwrap(), "0");
    }

    #[test]
    fn buffered_body_gets_length_and_etag() {
        let res = finalize(Response::new().body("hello"), None);
        assert_eq!(res.headers.get(CONTENT_LENGTH).unwrap(), "5");
        assert!(res.headers.contains_key(ETAG));
    }

    #[test]
    fn matching_if_none_match_short_circuits() {
        let first = finalize(Response::new().body("hello"), None);
        let tag = first.headers.get(ETAG).unwrap().clone();

        let second = finalize(Response::new().body("hello"), Some(tag));
        assert_eq!(second.status, StatusCode::NOT_MODIFIED);
        assert!(matches!(second.body, Body::Empty));
        assert!(!second.headers.contains_key(CONTENT_LENGTH));
    }

    #[test]
    fn handler_supplied_etag_wins() {
        let res = finalize(
            Response::new().header(ETAG, "\"custom\"").body("hello"),
            None,
        );
        assert_eq!(res.headers.get(ETAG).unwrap(), "\"custom\"");
    }
}
