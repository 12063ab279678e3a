//! Blocking transport built on ureq.
//!
//! Statuses are returned as data, never as errors. Redirects are followed per
//! request according to `follow_location`/`max_redirects`; when a redirect is
//! not followed its absolute target is reported as the redirect URL.

use ureq::http::header::{HeaderName, CONTENT_TYPE, LOCATION};
use ureq::http::Response as WireResponse;
use ureq::{Agent, Body, RequestBuilder, ResponseExt};
use url::Url;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, ResponseHeaders};
use crate::transport::{Transport, TransportRequest, TransportResponse};

/// Error codes reported in [`TransportError::code`], numbered like libcurl's.
pub mod codes {
    pub const UNSUPPORTED: i32 = 1;
    pub const URL_MALFORMAT: i32 = 3;
    pub const COULDNT_RESOLVE_HOST: i32 = 6;
    pub const COULDNT_CONNECT: i32 = 7;
    pub const OPERATION_TIMEDOUT: i32 = 28;
    pub const TOO_MANY_REDIRECTS: i32 = 47;
    pub const RECV_ERROR: i32 = 56;
}

/// [`Transport`] executing requests with a shared ureq agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::from_config(&ClientConfig::default())
    }

    /// Agent with the timeouts of `config` as its defaults. Redirect policy,
    /// and timeouts carried by a request, are set per request.
    pub fn from_config(config: &ClientConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout())
            .timeout_connect(config.connect_timeout())
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }

    fn prepare<B>(builder: RequestBuilder<B>, request: &TransportRequest) -> RequestBuilder<B> {
        let max_redirects = if request.follow_location {
            u32::try_from(request.max_redirects).unwrap_or(u32::MAX)
        } else {
            0
        };
        let mut config = builder.config().max_redirects(max_redirects);
        if let Some(timeout) = request.timeout {
            config = config.timeout_global(Some(timeout));
        }
        if let Some(timeout) = request.connect_timeout {
            config = config.timeout_connect(Some(timeout));
        }
        let mut builder = config.build();
        for line in &request.headers {
            match line.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    builder = builder.header(name.trim(), value.trim());
                }
                _ => tracing::warn!(line = %line, "dropping malformed header line"),
            }
        }
        builder
    }

    fn send(&self, request: &TransportRequest) -> Result<WireResponse<Body>, ureq::Error> {
        let url = request.url.as_str();
        let body = request.body.as_deref().unwrap_or("");
        match request.method {
            HttpMethod::Get => Self::prepare(self.agent.get(url), request).call(),
            HttpMethod::Delete => Self::prepare(self.agent.delete(url), request).call(),
            HttpMethod::Post => Self::prepare(self.agent.post(url), request).send(body),
            HttpMethod::Put => Self::prepare(self.agent.put(url), request).send(body),
            HttpMethod::Patch => Self::prepare(self.agent.patch(url), request).send(body),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut response = self.send(request).map_err(map_error)?;

        let http_code = response.status().as_u16();
        let effective_url = response.get_uri().to_string();
        let header_str = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        };
        let content_type = header_str(CONTENT_TYPE);
        let redirect_url = if response.status().is_redirection() {
            header_str(LOCATION).map(|location| resolve_location(&effective_url, &location))
        } else {
            None
        };

        let mut headers = ResponseHeaders::new();
        if request.capture_headers {
            for (name, value) in response.headers() {
                headers
                    .entry(name.as_str().to_string())
                    .or_default()
                    .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
            }
        }

        let body = response.body_mut().read_to_string().map_err(map_error)?;

        Ok(TransportResponse {
            http_code,
            effective_url,
            redirect_url,
            content_type,
            headers,
            body,
        })
    }
}

fn resolve_location(base: &str, location: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(location))
        .map(String::from)
        .unwrap_or_else(|_| location.to_string())
}

fn map_error(err: ureq::Error) -> TransportError {
    let code = match &err {
        ureq::Error::BadUri(_) => codes::URL_MALFORMAT,
        ureq::Error::HostNotFound => codes::COULDNT_RESOLVE_HOST,
        ureq::Error::ConnectionFailed => codes::COULDNT_CONNECT,
        ureq::Error::Timeout(_) => codes::OPERATION_TIMEDOUT,
        ureq::Error::TooManyRedirects => codes::TOO_MANY_REDIRECTS,
        ureq::Error::Io(_) => codes::RECV_ERROR,
        _ => codes::UNSUPPORTED,
    };
    TransportError::new(err.to_string(), code)
}
