use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::body::BoxError;
use crate::response::Response;

/// A single field-level validation failure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationDetail {
    pub message: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl ValidationDetail {
    pub fn new(
        message: impl Into<String>,
        path: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
            kind: kind.into(),
            context: None,
        }
    }

    pub fn context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// A failure raised anywhere along the handler chain.
///
/// Every recognized failure shape of the taxonomy has its own variant, so
/// normalization is a plain `match` instead of structural sniffing. Foreign
/// error values enter through the `From` adapters at the bottom of this
/// module and never reach the normalizer untagged.
#[derive(Debug)]
pub enum Error {
    /// The entity body exceeded the configured limit. Maps to 413.
    PayloadTooLarge { limit: usize },
    /// The entity body or another request component was malformed. Maps to 400.
    BadRequest { message: String },
    /// A structured, field-level validation failure. Maps to 400.
    Validation { details: Vec<ValidationDetail> },
    /// A failure explicitly tagged with an HTTP status by the handler.
    Http { status: StatusCode, message: String },
    /// No route matched the request. Maps to 404.
    NotFound,
    /// Anything else. Maps to 500.
    Internal { message: String },
}

impl Error {
    /// Tag a failure with an explicit HTTP status.
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn validation(details: Vec<ValidationDetail>) -> Self {
        Self::Validation { details }
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The status code this failure normalizes to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BadRequest { .. } | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Http { status, .. } => *status,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Normalize into the canonical JSON error response.
    ///
    /// Always JSON regardless of what the successful path would have
    /// produced; never fails, falling back to a generic 500 body if the
    /// wire shape cannot be serialized.
    pub fn into_response(self) -> Response {
        let status = self.status();
        let wire = match &self {
            Self::Validation { details } => Wire {
                message: details
                    .iter()
                    .map(|detail| detail.message.as_str())
                    .collect::<Vec<_>>()
                    .join(". "),
                name: "ValidationError",
                details: Some(details),
            },
            Self::PayloadTooLarge { .. } => Wire::bare("Payload Too Large"),
            Self::BadRequest { message } => Wire::bare(message.as_str()),
            Self::Http { message, .. } => Wire::bare(message.as_str()),
            Self::NotFound => Wire::bare("Not Found"),
            Self::Internal { message } => Wire::bare(message.as_str()),
        };

        let body = serde_json::to_vec(&wire)
            .unwrap_or_else(|_| br#"{"message":"Internal Server Error","name":"Error"}"#.to_vec());

        Response::new()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body)
    }
}

#[derive(Serialize)]
struct Wire<'a> {
    message: String,
    name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [ValidationDetail]>,
}

impl<'a> Wire<'a> {
    fn bare(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            "Internal Server Error".to_owned()
        } else {
            message
        };

        Self {
            message,
            name: "Error",
            details: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadTooLarge { limit } => {
                write!(f, "entity body larger than the {} byte limit", limit)
            }
            Self::BadRequest { message } => write!(f, "{}", message),
            Self::Validation { details } => {
                write!(f, "validation failed for {} field(s)", details.len())
            }
            Self::Http { status, message } => write!(f, "{}: {}", status, message),
            Self::NotFound => write!(f, "no route matched the request"),
            Self::Internal { message } => write!(f, "{}", message),
        }
    }
}

impl StdError for Error {}

// Adapters from foreign error representations. Anything not already tagged
// comes through here as an untagged internal failure.

impl From<BoxError> for Error {
    fn from(err: BoxError) -> Self {
        match err.downcast::<Error>() {
            Ok(err) => *err,
            Err(err) => Self::internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_status_is_kept() {
        let err = Error::http(StatusCode::IM_A_TEAPOT, "I'm a teapot");
        assert_eq!(err.status(), StatusCode::IM_A_TEAPOT);

        let response = err.into_response();
        assert_eq!(response.status, StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn validation_carries_details() {
        let err = Error::validation(vec![ValidationDetail::new(
            r#""foo" must be a string"#,
            "foo",
            "string.base",
        )]);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn untagged_errors_become_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: Error = (Box::new(io) as BoxError).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn tagged_errors_survive_boxing() {
        let boxed: BoxError = Box::new(Error::not_found());
        let err: Error = boxed.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
