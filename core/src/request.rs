//! Request model: a mutable builder describing one HTTP call.
//!
//! # Design
//! `Request<F>` is parameterized by a flavor marker. The flavor supplies the
//! request defaults (accept header, content type, expected response content
//! types) and fixes the response type at compile time: a `Request<F>` always
//! produces a `Response<F>`. Decoding capabilities hang off the flavor, so a
//! JSON request yields a response with `data()` while a plain one does not.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;

use crate::body::{Body, JsonBody, NoBody, UrlencodedBody};
use crate::error::{Error, Result};
use crate::http::{
    ExpectedContentType, HeaderKey, HeaderLines, HttpMethod, QueryParams, APPLICATION_JSON,
};
use crate::response::{AnyResponse, Response, ResponseParts};

/// Defaults a flavor applies to every new request.
#[derive(Debug, Clone, Default)]
pub struct RequestDefaults {
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub expected_content_type: Option<ExpectedContentType>,
}

/// Compile-time pairing of a request kind with its response kind.
pub trait Flavor: fmt::Debug + Clone + Send + Sync + 'static {
    fn defaults() -> RequestDefaults {
        RequestDefaults::default()
    }
}

/// Flavors whose responses decode their body as JSON.
pub trait JsonDecoding: Flavor {
    /// Maximum nesting of arrays and objects accepted when decoding.
    const DECODE_DEPTH: usize = 16;
}

/// Plain request: no negotiation defaults, no decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Flavor for Plain {}

/// JSON request: asks for JSON and decodes the response body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Flavor for Json {
    fn defaults() -> RequestDefaults {
        RequestDefaults {
            accept: Some(APPLICATION_JSON.to_string()),
            content_type: Some(APPLICATION_JSON.to_string()),
            expected_content_type: Some(ExpectedContentType::json()),
        }
    }
}

impl JsonDecoding for Json {}

pub type HttpRequest = Request<Plain>;
pub type JsonHttpRequest = Request<Json>;

/// Flavor-independent view of a request, carried by errors and debug sinks.
pub trait AnyRequest: fmt::Debug + Send + Sync {
    /// Full URL including the encoded query.
    fn url(&self) -> String;

    fn method(&self) -> HttpMethod;

    fn headers(&self) -> Vec<String>;

    fn as_any(&self) -> &dyn Any;
}

/// Description of one HTTP call.
#[derive(Debug, Clone)]
pub struct Request<F: Flavor = Plain> {
    url: String,
    query: Option<QueryParams>,
    method: HttpMethod,
    headers: HeaderLines,
    body: Option<Body>,
    accept: Option<String>,
    content_type: Option<String>,
    expected_content_type: Option<ExpectedContentType>,
    response_headers_required: Option<bool>,
    max_redirects: Option<i32>,
    follow_location: Option<bool>,
    flavor: PhantomData<F>,
}

impl<F: Flavor> Request<F> {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Get)
    }

    pub fn with_method(url: impl Into<String>, method: HttpMethod) -> Self {
        let defaults = F::defaults();
        Self {
            url: url.into(),
            query: None,
            method,
            headers: HeaderLines::new(),
            body: None,
            accept: defaults.accept,
            content_type: defaults.content_type,
            expected_content_type: defaults.expected_content_type,
            response_headers_required: None,
            max_redirects: None,
            follow_location: None,
            flavor: PhantomData,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Get)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Post)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Put)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Patch)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Delete)
    }

    /// Base URL with the query appended. An existing `?` in the base URL makes
    /// the new parameters join with `&`.
    pub fn url(&self) -> String {
        let mut url = self.url.clone();
        if let Some(query) = self.query.as_ref().filter(|q| !q.is_empty()) {
            url.push(if self.url.contains('?') { '&' } else { '?' });
            url.push_str(&query.encode());
        }
        url
    }

    pub fn base_url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = url.into();
        self
    }

    pub fn query(&self) -> Option<&QueryParams> {
        self.query.as_ref()
    }

    pub fn set_query(&mut self, query: Option<QueryParams>) -> &mut Self {
        self.query = query;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn set_method(&mut self, method: HttpMethod) -> &mut Self {
        self.method = method;
        self
    }

    pub fn is_post(&self) -> bool {
        self.method.is_post()
    }

    /// Wire body. Methods without a body always yield `None`, whatever was
    /// set; POST-like methods fail with `BodyRequired` when nothing was set.
    pub fn body(&self) -> Result<Option<String>> {
        if !self.is_post() {
            return Ok(None);
        }
        match &self.body {
            Some(body) => body.encode().map(Some),
            None => Err(Error::BodyRequired {
                request: Arc::new(self.clone()),
            }),
        }
    }

    pub fn raw_body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn set_body(&mut self, body: impl Into<Body>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    pub fn clear_body(&mut self) -> &mut Self {
        self.body = None;
        self
    }

    pub fn set_no_body(&mut self) -> &mut Self {
        self.set_body(NoBody)
    }

    /// JSON body sent as `application/json; charset=utf-8`.
    pub fn set_json_body<T>(&mut self, data: T) -> &mut Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.set_body(JsonBody::new(data))
    }

    pub fn set_urlencoded_body(&mut self, params: impl Into<QueryParams>) -> &mut Self {
        self.set_body(UrlencodedBody::new(params))
    }

    /// Header lines sent with the request, judged by its own method.
    pub fn headers(&self) -> Vec<String> {
        self.headers_for(self.is_post())
    }

    /// Header lines for a body-bearing (`is_post`) or bodiless dispatch.
    ///
    /// Empty lines are dropped. `Accept` is appended when set. `Content-Type`
    /// is appended only for body-bearing calls, taken from the body encoder
    /// when there is one and from the content-type override otherwise.
    pub fn headers_for(&self, is_post: bool) -> Vec<String> {
        let mut lines = self.headers.lines();

        if let Some(accept) = self.accept.as_deref().filter(|a| !a.is_empty()) {
            lines.push(format!("Accept: {accept}"));
        }

        if is_post {
            let content_type = match &self.body {
                Some(Body::Encoded(encoder)) => encoder.content_type(),
                _ => self.content_type.as_deref(),
            };
            if let Some(content_type) = content_type.filter(|c| !c.is_empty()) {
                lines.push(format!("Content-Type: {content_type}"));
            }
        }

        lines
    }

    pub fn header_lines(&self) -> &HeaderLines {
        &self.headers
    }

    pub fn add_header(&mut self, line: impl Into<String>) -> &mut Self {
        self.headers.add(line);
        self
    }

    /// Replace the line at `key`, or append it under that key.
    pub fn set_header(&mut self, key: impl Into<HeaderKey>, line: impl Into<String>) -> &mut Self {
        self.headers.set(key, line);
        self
    }

    pub fn set_headers(&mut self, headers: impl Into<HeaderLines>) -> &mut Self {
        self.headers = headers.into();
        self
    }

    pub fn set_referer(&mut self, referer: &str) -> &mut Self {
        self.set_header("referer", format!("Referer: {referer}"))
    }

    /// Use the URL a previous response was finally served from as referer.
    pub fn set_referer_from_response(&mut self, response: &dyn AnyResponse) -> &mut Self {
        let referer = response.effective_url().to_string();
        self.set_referer(&referer)
    }

    /// Use another request's full URL, query included, as referer.
    pub fn set_referer_from_request(&mut self, request: &dyn AnyRequest) -> &mut Self {
        let referer = request.url();
        self.set_referer(&referer)
    }

    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    pub fn set_accept(&mut self, accept: Option<&str>) -> &mut Self {
        self.accept = accept.map(str::to_string);
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn set_content_type(&mut self, content_type: Option<&str>) -> &mut Self {
        self.content_type = content_type.map(str::to_string);
        self
    }

    pub fn expected_content_type(&self) -> Option<&ExpectedContentType> {
        self.expected_content_type.as_ref()
    }

    pub fn set_expected_content_type(
        &mut self,
        expected: Option<ExpectedContentType>,
    ) -> &mut Self {
        self.expected_content_type = expected;
        self
    }

    pub fn response_headers_required(&self) -> Option<bool> {
        self.response_headers_required
    }

    pub fn set_response_headers_required(&mut self, value: Option<bool>) -> &mut Self {
        self.response_headers_required = value;
        self
    }

    /// `-1` means unlimited.
    pub fn max_redirects(&self) -> Option<i32> {
        self.max_redirects
    }

    pub fn set_max_redirects(&mut self, max_redirects: Option<i32>) -> &mut Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn follow_location(&self) -> Option<bool> {
        self.follow_location
    }

    pub fn set_follow_location(&mut self, follow: Option<bool>) -> &mut Self {
        self.follow_location = follow;
        self
    }

    /// Build the response for this request from raw transport output.
    pub fn make_response(self, parts: ResponseParts) -> Response<F> {
        Response::new(Arc::new(self), parts)
    }
}

impl<F: Flavor> AnyRequest for Request<F> {
    fn url(&self) -> String {
        Request::url(self)
    }

    fn method(&self) -> HttpMethod {
        self.method
    }

    fn headers(&self) -> Vec<String> {
        Request::headers(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
