//! Small URL helpers: URL-safe base64 and query parameter extraction.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use thiserror::Error;
use url::{ParseError, Url};

use crate::http::{QueryParams, QueryValue};

// Only the query matters, so relative URLs resolve against any host.
const RELATIVE_BASE: &str = "http://localhost/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlHelperError {
    #[error("Invalid url.")]
    InvalidUrl(#[source] ParseError),

    #[error("Required parameter \"{0}\" in url not found.")]
    MissingParam(String),
}

/// Base64 with the URL-safe alphabet and no padding.
pub fn base64_url_encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Every query parameter of `url`, decoded.
///
/// `key[]` and `key[n]` entries collect into a list under `key`; a repeated
/// plain key keeps its last value. Relative URLs such as `/cb?code=x` or
/// `?a=1` are accepted.
pub fn extract_params_from_url(url: &str) -> Result<QueryParams, UrlHelperError> {
    let url = match Url::parse(url) {
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
            .and_then(|base| base.join(url)),
        parsed => parsed,
    }
    .map_err(UrlHelperError::InvalidUrl)?;

    let mut params: Vec<(String, QueryValue)> = Vec::new();
    for (key, value) in url.query_pairs() {
        let value = value.into_owned();
        let (name, is_list) = match list_key(&key) {
            Some(name) => (name.to_string(), true),
            None => (key.into_owned(), false),
        };
        let slot = params.iter_mut().find(|(k, _)| *k == name);
        match (slot, is_list) {
            (Some((_, QueryValue::List(items))), true) => items.push(value),
            (Some(slot), true) => slot.1 = QueryValue::List(vec![value]),
            (Some(slot), false) => slot.1 = QueryValue::Scalar(value),
            (None, true) => params.push((name, QueryValue::List(vec![value]))),
            (None, false) => params.push((name, QueryValue::Scalar(value))),
        }
    }
    Ok(params.into_iter().collect())
}

pub fn extract_param_from_url(url: &str, name: &str) -> Result<Option<QueryValue>, UrlHelperError> {
    Ok(extract_params_from_url(url)?.get(name).cloned())
}

pub fn extract_required_param_from_url(url: &str, name: &str) -> Result<QueryValue, UrlHelperError> {
    extract_param_from_url(url, name)?.ok_or_else(|| UrlHelperError::MissingParam(name.to_string()))
}

/// `name` for `name[]` or `name[...]`.
fn list_key(key: &str) -> Option<&str> {
    let open = key.find('[')?;
    (open > 0 && key.ends_with(']')).then(|| &key[..open])
}
