//! Error types for request building, response validation and transport.
//!
//! # Design
//! Every error that concerns a request or response carries it as a type-erased
//! view, so callers can inspect what was sent or received without the error
//! type depending on the request flavor. Status failures are a value
//! (`StatusError`) with a closed `StatusKind`; callers match on the kind they
//! care about instead of catching per-status types.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::body::JsonData;
use crate::request::AnyRequest;
use crate::response::AnyResponse;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by requests, responses and clients.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A POST-like request was dispatched without a body.
    #[error("Body required.")]
    BodyRequired { request: Arc<dyn AnyRequest> },

    /// The JSON body could not be serialized.
    #[error("JSON encoding failed: {source}")]
    JsonEncode {
        data: JsonData,
        #[source]
        source: serde_json::Error,
    },

    /// A form body could not be built from the given struct.
    #[error("Form encoding failed: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    /// The response content type is not one of the expected ones.
    #[error("Unexpected ContentType.")]
    UnexpectedContentType { response: Arc<dyn AnyResponse> },

    /// The response status is not one of the allowed codes.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// The response body is not valid JSON (or nests too deeply).
    #[error("Not valid json.")]
    JsonDecode {
        response: Arc<dyn AnyResponse>,
        #[source]
        source: serde_json::Error,
    },

    /// The transport executor failed before producing a response.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    /// The response this error was raised for, if any.
    pub fn response(&self) -> Option<&Arc<dyn AnyResponse>> {
        match self {
            Error::UnexpectedContentType { response } | Error::JsonDecode { response, .. } => {
                Some(response)
            }
            Error::Status(status) => Some(&status.response),
            _ => None,
        }
    }

    pub fn request(&self) -> Option<&Arc<dyn AnyRequest>> {
        match self {
            Error::BodyRequired { request } => Some(request),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<&StatusError> {
        match self {
            Error::Status(status) => Some(status),
            _ => None,
        }
    }
}

/// Failure reported by a transport executor. Never interpreted by the core.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub code: i32,
}

impl TransportError {
    pub fn new(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

/// Closed mapping from HTTP status code to error kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    ProxyAuthenticationRequired,
    TooManyRequests,
    InternalServerError,
    NotImplemented,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    /// Any other code; carries every code that would have been accepted.
    UnexpectedHttpCode { allowed: Vec<u16> },
}

impl StatusKind {
    pub fn from_code(code: u16, allowed: Vec<u16>) -> Self {
        match code {
            400 => StatusKind::BadRequest,
            401 => StatusKind::Unauthorized,
            403 => StatusKind::Forbidden,
            404 => StatusKind::NotFound,
            405 => StatusKind::MethodNotAllowed,
            406 => StatusKind::NotAcceptable,
            407 => StatusKind::ProxyAuthenticationRequired,
            429 => StatusKind::TooManyRequests,
            500 => StatusKind::InternalServerError,
            501 => StatusKind::NotImplemented,
            502 => StatusKind::BadGateway,
            503 => StatusKind::ServiceUnavailable,
            504 => StatusKind::GatewayTimeout,
            _ => StatusKind::UnexpectedHttpCode { allowed },
        }
    }

    fn reason(&self) -> Option<&'static str> {
        let reason = match self {
            StatusKind::BadRequest => "Bad Request.",
            StatusKind::Unauthorized => "Unauthorized.",
            StatusKind::Forbidden => "Forbidden.",
            StatusKind::NotFound => "Not Found.",
            StatusKind::MethodNotAllowed => "Method Not Allowed.",
            StatusKind::NotAcceptable => "Not Acceptable.",
            StatusKind::ProxyAuthenticationRequired => "Proxy Authentication Required.",
            StatusKind::TooManyRequests => "Too Many Requests.",
            StatusKind::InternalServerError => "Internal Server Error.",
            StatusKind::NotImplemented => "Not Implemented.",
            StatusKind::BadGateway => "Bad Gateway.",
            StatusKind::ServiceUnavailable => "Service Unavailable.",
            StatusKind::GatewayTimeout => "Gateway Timeout.",
            StatusKind::UnexpectedHttpCode { .. } => return None,
        };
        Some(reason)
    }
}

/// A response whose status failed `check_http_code`.
#[derive(Debug, Clone)]
pub struct StatusError {
    pub kind: StatusKind,
    pub response: Arc<dyn AnyResponse>,
}

impl StatusError {
    pub fn http_code(&self) -> u16 {
        self.response.http_code()
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = self.kind.reason() {
            return f.write_str(reason);
        }
        let received = self.http_code();
        match &self.kind {
            StatusKind::UnexpectedHttpCode { allowed } if allowed.len() == 1 => write!(
                f,
                "Expected http code {}, but received http code {received}.",
                allowed[0]
            ),
            StatusKind::UnexpectedHttpCode { allowed } => {
                let codes: Vec<String> = allowed.iter().map(u16::to_string).collect();
                write!(
                    f,
                    "Expected http codes [{}], but received http code {received}.",
                    codes.join(",")
                )
            }
            _ => Ok(()),
        }
    }
}

impl std::error::Error for StatusError {}
