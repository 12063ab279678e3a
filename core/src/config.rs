//! Client-level defaults applied when a request leaves a setting unset.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default `User-Agent` sent by [`TransportClient`](crate::TransportClient).
pub const DEFAULT_USER_AGENT: &str = concat!("simple-http/", env!("CARGO_PKG_VERSION"));

/// Configuration for a transport client.
///
/// Can be loaded from any serde format; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub follow_location: bool,
    /// `-1` means unlimited.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: i32,
    pub response_headers_required: bool,
    /// Raw header lines sent before the request's own lines.
    pub headers: Vec<String>,
    /// `None` sends no `User-Agent` line.
    #[serde(default = "default_user_agent")]
    pub user_agent: Option<String>,
    /// Deadline for a whole call, applied to every request.
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            follow_location: false,
            max_redirects: default_max_redirects(),
            response_headers_required: false,
            headers: Vec::new(),
            user_agent: default_user_agent(),
            timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

fn default_max_redirects() -> i32 {
    20
}

fn default_user_agent() -> Option<String> {
    Some(DEFAULT_USER_AGENT.to_string())
}
