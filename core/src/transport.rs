//! Transport executor boundary and the client that drives it.
//!
//! # Design
//! A `Transport` performs exactly one network round-trip. It receives fully
//! resolved input (final URL, header lines, encoded body, redirect policy) and
//! returns raw output or a `TransportError`. Everything else (defaults,
//! body encoding, turning output into a typed response) happens in
//! `TransportClient`, so a transport never sees a request that could still
//! fail to encode.

use std::time::Duration;

use crate::client::HttpClient;
use crate::config::ClientConfig;
use crate::error::{Result, TransportError};
use crate::http::{HttpMethod, ResponseHeaders};
use crate::request::{Flavor, Request};
use crate::response::{Response, ResponseParts};

/// Input handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Raw `"Name: value"` lines.
    pub headers: Vec<String>,
    pub body: Option<String>,
    pub follow_location: bool,
    /// `-1` means unlimited.
    pub max_redirects: i32,
    /// Whether response headers must be captured.
    pub capture_headers: bool,
    /// Whole-call deadline; `None` leaves the transport's own setting.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

/// Raw output of a transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub http_code: u16,
    pub effective_url: String,
    pub redirect_url: Option<String>,
    pub content_type: Option<String>,
    /// Empty unless capture was requested.
    pub headers: ResponseHeaders,
    pub body: String,
}

/// Performs one HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

impl<T> Transport for T
where
    T: Fn(&TransportRequest) -> Result<TransportResponse, TransportError>,
{
    fn execute(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        self(request)
    }
}

/// `HttpClient` backed by a transport executor.
#[derive(Debug, Clone)]
pub struct TransportClient<T> {
    transport: T,
    config: ClientConfig,
}

impl<T: Transport> TransportClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve a request against the client defaults. Fails before any IO if
    /// the body cannot be produced.
    pub fn prepare<F: Flavor>(&self, request: &Request<F>) -> Result<TransportRequest> {
        let body = request.body()?;

        let mut headers: Vec<String> = self
            .config
            .headers
            .iter()
            .filter(|line| !line.is_empty())
            .cloned()
            .collect();
        headers.extend(request.headers());

        // an explicit User-Agent line replaces the configured one
        if let Some(user_agent) = self.config.user_agent.as_deref().filter(|ua| !ua.is_empty()) {
            if !headers.iter().any(|line| is_user_agent(line)) {
                headers.insert(0, format!("User-Agent: {user_agent}"));
            }
        }

        Ok(TransportRequest {
            method: request.method(),
            url: request.url(),
            headers,
            body,
            follow_location: request
                .follow_location()
                .unwrap_or(self.config.follow_location),
            max_redirects: request
                .max_redirects()
                .unwrap_or(self.config.max_redirects)
                .max(-1),
            capture_headers: request
                .response_headers_required()
                .unwrap_or(self.config.response_headers_required),
            timeout: self.config.timeout(),
            connect_timeout: self.config.connect_timeout(),
        })
    }
}

fn is_user_agent(line: &str) -> bool {
    line.split_once(':')
        .is_some_and(|(name, _)| name.trim().eq_ignore_ascii_case("user-agent"))
}

impl<T: Transport> HttpClient for TransportClient<T> {
    fn request<F: Flavor>(&self, request: Request<F>) -> Result<Response<F>> {
        let input = self.prepare(&request)?;
        tracing::debug!(method = %input.method, url = %input.url, "dispatching request");

        let output = self.transport.execute(&input).map_err(|e| {
            tracing::debug!(url = %input.url, code = e.code, error = %e, "transport failed");
            e
        })?;
        tracing::debug!(url = %input.url, http_code = output.http_code, "response received");

        Ok(request.make_response(ResponseParts {
            http_code: output.http_code,
            url: input.url,
            effective_url: output.effective_url,
            redirect_url: output.redirect_url,
            headers: output.headers,
            content_type: output.content_type,
            body: output.body,
        }))
    }
}
