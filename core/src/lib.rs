//! HTTP request/response model with pluggable transports.
//!
//! # Overview
//! Requests are built as values, handed to an [`HttpClient`] and come back as
//! typed responses that know how to validate themselves. The network sits
//! behind the [`Transport`] trait; [`UreqTransport`] is the bundled
//! implementation.
//!
//! # Design
//! - `Request<F>` always yields `Response<F>`; the flavor `F` fixes the
//!   request defaults and whether the response can decode JSON.
//! - Validation (`check_http_code`, `check_content_type`, `data`) is explicit
//!   and returns a discriminated [`Error`]. The one implicit check is the
//!   content type, verified once before `data` decodes.
//! - Decorators ([`MiddlewareClient`], [`DebugClient`]) implement the same
//!   `HttpClient` contract as the transport client, so they nest freely.
//!
//! ```no_run
//! use simple_http::{HttpClient, JsonHttpRequest, TransportClient, UreqTransport};
//!
//! # fn main() -> simple_http::Result<()> {
//! let client = TransportClient::new(UreqTransport::new());
//! let response = client.request(JsonHttpRequest::get("https://example.com/api"))?;
//! response.check_http_code(200)?;
//! let data = response.data()?;
//! # let _ = data;
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod client;
pub mod config;
pub mod debug;
pub mod error;
mod finite;
pub mod http;
pub mod json_client;
pub mod oauth;
pub mod request;
pub mod response;
pub mod transport;
#[cfg(feature = "ureq")]
pub mod ureq_transport;
pub mod url_helper;

pub use body::{Body, BodyEncoder, JsonBody, NoBody, UrlencodedBody};
pub use client::{AddHeaders, Chain, Forward, HttpClient, Interceptor, MiddlewareClient};
pub use config::ClientConfig;
pub use debug::{DebugClient, DebugSink};
pub use error::{Error, Result, StatusError, StatusKind, TransportError};
pub use http::{
    AllowedCodes, ExpectedContentType, HeaderKey, HeaderLines, HttpMethod, QueryParams,
    QueryValue,
};
pub use json_client::JsonClient;
pub use request::{
    AnyRequest, Flavor, HttpRequest, Json, JsonDecoding, JsonHttpRequest, Plain, Request,
};
pub use response::{AnyResponse, HttpResponse, JsonHttpResponse, Response, ResponseParts};
pub use transport::{Transport, TransportClient, TransportRequest, TransportResponse};
#[cfg(feature = "ureq")]
pub use ureq_transport::UreqTransport;
