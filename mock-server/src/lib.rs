//! Echo and inspection server used to exercise HTTP clients end to end.
//!
//! # Design
//! Every route is stateless and reflects the request back in some form, so a
//! client test can assert on exactly what went over the wire. Statuses and
//! redirects are produced on demand.

use std::collections::BTreeMap;

use axum::{
    extract::Path,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

/// What `/inspect` saw of a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Lowercase name to every value received, in order.
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/inspect", any(inspect))
        .route("/status/{code}", any(status))
        .route("/redirect", get(redirect))
        .route("/multi-header", get(multi_header))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

/// Body back verbatim, with the request's content type (or none).
async fn echo(headers: HeaderMap, body: String) -> Response {
    let content_type = headers.get(CONTENT_TYPE).cloned();
    let mut response = body.into_response();
    match content_type {
        Some(value) => {
            response.headers_mut().insert(CONTENT_TYPE, value);
        }
        None => {
            response.headers_mut().remove(CONTENT_TYPE);
        }
    }
    response
}

async fn inspect(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Inspection> {
    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in &headers {
        seen.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    tracing::debug!(%method, %uri, "inspect");
    Json(Inspection {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: seen,
        body,
    })
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}

async fn redirect() -> Redirect {
    Redirect::to("/inspect")
}

async fn multi_header() -> impl IntoResponse {
    let request_id = HeaderValue::from_str(&Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("invalid"));
    (
        AppendHeaders([
            ("x-multi", HeaderValue::from_static("first")),
            ("x-multi", HeaderValue::from_static("second")),
            ("x-request-id", request_id),
        ]),
        "ok",
    )
}
