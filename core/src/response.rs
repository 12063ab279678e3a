//! Response model: immutable transport output plus validators.
//!
//! # Design
//! A `Response<F>` is created once by `Request::make_response` and never
//! changes afterwards. It is a cheap handle (`Arc` inside) so that errors and
//! debug sinks can keep it alive without copying the body. The only derived
//! state is whether the request's own content-type expectation has already
//! been verified.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;

use crate::error::{Error, Result, StatusError, StatusKind};
use crate::http::{AllowedCodes, ExpectedContentType, ResponseHeaders};
use crate::request::{AnyRequest, Flavor, JsonDecoding, Json, Plain, Request};

pub type HttpResponse = Response<Plain>;
pub type JsonHttpResponse = Response<Json>;

/// Raw transport output used to build a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseParts {
    pub http_code: u16,
    /// URL the request was sent to.
    pub url: String,
    /// URL the response was finally served from, after redirects.
    pub effective_url: String,
    pub redirect_url: Option<String>,
    pub headers: ResponseHeaders,
    pub content_type: Option<String>,
    pub body: String,
}

impl ResponseParts {
    /// Parts for a response served directly from `url`.
    pub fn new(http_code: u16, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            http_code,
            effective_url: url.clone(),
            url,
            ..Self::default()
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_lowercase())
            .or_default()
            .push(value.into());
        self
    }
}

/// Flavor-independent view of a response, carried by errors and debug sinks.
pub trait AnyResponse: fmt::Debug + Send + Sync {
    fn http_code(&self) -> u16;

    fn url(&self) -> &str;

    fn effective_url(&self) -> &str;

    fn redirect_url(&self) -> Option<&str>;

    fn headers(&self) -> &ResponseHeaders;

    fn content_type(&self) -> Option<&str>;

    fn body(&self) -> &str;

    fn request(&self) -> &dyn AnyRequest;

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug)]
struct Inner<F: Flavor> {
    request: Arc<Request<F>>,
    parts: ResponseParts,
    content_type_validated: AtomicBool,
}

/// Response to a `Request<F>`.
#[derive(Debug)]
pub struct Response<F: Flavor = Plain> {
    inner: Arc<Inner<F>>,
}

impl<F: Flavor> Clone for Response<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: Flavor> Response<F> {
    pub(crate) fn new(request: Arc<Request<F>>, parts: ResponseParts) -> Self {
        Self {
            inner: Arc::new(Inner {
                request,
                parts,
                content_type_validated: AtomicBool::new(false),
            }),
        }
    }

    pub fn request(&self) -> &Request<F> {
        &self.inner.request
    }

    pub fn http_code(&self) -> u16 {
        self.inner.parts.http_code
    }

    pub fn url(&self) -> &str {
        &self.inner.parts.url
    }

    pub fn effective_url(&self) -> &str {
        &self.inner.parts.effective_url
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.inner.parts.redirect_url.as_deref()
    }

    pub fn headers(&self) -> &ResponseHeaders {
        &self.inner.parts.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.inner.parts.content_type.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.inner.parts.body
    }

    /// First value of a header, looked up case-insensitively.
    pub fn first_header(&self, name: &str) -> Option<&str> {
        self.headers()
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Check the content type against the request's expectation. Passes when
    /// the request has none; runs at most once per response.
    pub fn check_content_type(&self) -> Result<()> {
        if self.inner.content_type_validated.load(Ordering::Acquire) {
            return Ok(());
        }
        if let Some(expected) = self.request().expected_content_type() {
            self.verify_content_type(expected)?;
        }
        self.inner.content_type_validated.store(true, Ordering::Release);
        Ok(())
    }

    /// Check the content type against an explicit expectation.
    pub fn check_content_type_against(
        &self,
        expected: impl Into<ExpectedContentType>,
    ) -> Result<()> {
        self.verify_content_type(&expected.into())
    }

    /// Fail unless the status is one of `allowed`. Known failure codes map to
    /// their own `StatusKind`; anything else is `UnexpectedHttpCode`.
    pub fn check_http_code(&self, allowed: impl Into<AllowedCodes>) -> Result<()> {
        let allowed = allowed.into();
        let code = self.http_code();
        if allowed.contains(code) {
            return Ok(());
        }
        Err(StatusError {
            kind: StatusKind::from_code(code, allowed.to_vec()),
            response: self.shared(),
        }
        .into())
    }

    fn verify_content_type(&self, expected: &ExpectedContentType) -> Result<()> {
        if expected.matches(self.content_type()) {
            Ok(())
        } else {
            Err(Error::UnexpectedContentType {
                response: self.shared(),
            })
        }
    }

    pub(crate) fn shared(&self) -> Arc<dyn AnyResponse> {
        Arc::new(self.clone())
    }
}

impl<F: JsonDecoding> Response<F> {
    /// Body decoded as a dynamic JSON value, after the content-type check.
    pub fn data(&self) -> Result<Value> {
        self.check_content_type()?;
        let value: Value = serde_json::from_str(self.body()).map_err(|e| self.decode_error(e))?;
        if nesting_depth(&value) > F::DECODE_DEPTH {
            let source = serde_json::Error::custom(format_args!(
                "maximum nesting depth of {} exceeded",
                F::DECODE_DEPTH
            ));
            return Err(self.decode_error(source));
        }
        Ok(value)
    }

    /// Body decoded into a concrete type.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.data()?;
        serde_json::from_value(value).map_err(|e| self.decode_error(e))
    }

    fn decode_error(&self, source: serde_json::Error) -> Error {
        Error::JsonDecode {
            response: self.shared(),
            source,
        }
    }
}

fn nesting_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(nesting_depth).max().unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(nesting_depth).max().unwrap_or(0),
        _ => 0,
    }
}

impl<F: Flavor> AnyResponse for Response<F> {
    fn http_code(&self) -> u16 {
        Response::http_code(self)
    }

    fn url(&self) -> &str {
        Response::url(self)
    }

    fn effective_url(&self) -> &str {
        Response::effective_url(self)
    }

    fn redirect_url(&self) -> Option<&str> {
        Response::redirect_url(self)
    }

    fn headers(&self) -> &ResponseHeaders {
        Response::headers(self)
    }

    fn content_type(&self) -> Option<&str> {
        Response::content_type(self)
    }

    fn body(&self) -> &str {
        Response::body(self)
    }

    fn request(&self) -> &dyn AnyRequest {
        Response::request(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
