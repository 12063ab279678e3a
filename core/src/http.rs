//! Plain-data HTTP building blocks shared by requests and responses.
//!
//! # Design
//! Request headers are kept as raw `"Name: value"` lines addressed either by
//! position or by a caller-chosen key, mirroring how they are handed to the
//! transport. Response headers are structured: lowercase name to the ordered
//! list of values received.

use std::collections::BTreeMap;
use std::fmt;

use url::form_urlencoded;

/// Content type sent with JSON bodies and requested by JSON requests.
pub const APPLICATION_JSON: &str = "application/json; charset=utf-8";

/// Content type sent with URL-encoded form bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Content types accepted from a JSON endpoint unless configured otherwise.
pub const JSON_CONTENT_TYPES: [&str; 3] = [
    "application/json; charset=utf-8",
    "application/json;charset=utf-8",
    "application/json",
];

/// Response headers: lowercase name to every value received, in order.
pub type ResponseHeaders = BTreeMap<String, Vec<String>>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Wire name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry a body.
    pub fn is_post(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a header line: positional index or named slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HeaderKey {
    Index(usize),
    Name(String),
}

impl From<usize> for HeaderKey {
    fn from(index: usize) -> Self {
        HeaderKey::Index(index)
    }
}

impl From<&str> for HeaderKey {
    fn from(name: &str) -> Self {
        HeaderKey::Name(name.to_string())
    }
}

impl From<String> for HeaderKey {
    fn from(name: String) -> Self {
        HeaderKey::Name(name)
    }
}

/// Ordered, keyed list of raw `"Name: value"` header lines.
///
/// Duplicate logical headers are allowed: two lines only collide when they
/// share a key, never because they share a header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderLines {
    entries: Vec<(HeaderKey, String)>,
}

impl HeaderLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line at the next free positional index.
    pub fn add(&mut self, line: impl Into<String>) -> &mut Self {
        let index = self.next_index();
        self.entries.push((HeaderKey::Index(index), line.into()));
        self
    }

    /// Replace the line stored under `key`, or append it when the key is new.
    pub fn set(&mut self, key: impl Into<HeaderKey>, line: impl Into<String>) -> &mut Self {
        let key = key.into();
        let line = line.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = line,
            None => self.entries.push((key, line)),
        }
        self
    }

    pub fn remove(&mut self, key: impl Into<HeaderKey>) -> Option<String> {
        let key = key.into();
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, key: impl Into<HeaderKey>) -> Option<&str> {
        let key = key.into();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, line)| line.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderKey, &str)> {
        self.entries.iter().map(|(k, line)| (k, line.as_str()))
    }

    /// Non-empty lines in insertion order.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, line)| !line.is_empty())
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn next_index(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|(k, _)| match k {
                HeaderKey::Index(i) => Some(i + 1),
                HeaderKey::Name(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

impl<S: Into<String>> FromIterator<S> for HeaderLines {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut lines = HeaderLines::new();
        for line in iter {
            lines.add(line);
        }
        lines
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for HeaderLines {
    fn from(lines: [S; N]) -> Self {
        lines.into_iter().collect()
    }
}

/// Value of a query or form parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Scalar(String),
    /// Serialized as `key[0]=..&key[1]=..`.
    List(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Scalar(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Scalar(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Scalar(value.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Scalar(if value { "1" } else { "0" }.to_string())
    }
}

macro_rules! scalar_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(value: $t) -> Self {
                QueryValue::Scalar(value.to_string())
            }
        })*
    };
}

scalar_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl<T: ToString> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for QueryValue {
    fn from(values: [T; N]) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

/// Ordered query (or form) parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, QueryValue)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `application/x-www-form-urlencoded` serialization; lists use indexed
    /// bracket keys.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            match value {
                QueryValue::Scalar(v) => {
                    serializer.append_pair(key, v);
                }
                QueryValue::List(items) => {
                    for (i, v) in items.iter().enumerate() {
                        serializer.append_pair(&format!("{key}[{i}]"), v);
                    }
                }
            }
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        QueryParams(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<QueryValue>, const N: usize> From<[(K, V); N]> for QueryParams {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Content types a response is allowed to carry. Values are lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedContentType {
    Exact(String),
    /// `None` as a member accepts a response without a content type.
    AnyOf(Vec<Option<String>>),
}

impl ExpectedContentType {
    pub fn any_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExpectedContentType::AnyOf(values.into_iter().map(|v| Some(v.into())).collect())
    }

    /// Also accept a response that has no content type at all.
    pub fn or_missing(self) -> Self {
        let mut members = match self {
            ExpectedContentType::Exact(v) => vec![Some(v)],
            ExpectedContentType::AnyOf(members) => members,
        };
        if !members.contains(&None) {
            members.push(None);
        }
        ExpectedContentType::AnyOf(members)
    }

    /// Compare against an actual content type, case-insensitively.
    pub fn matches(&self, actual: Option<&str>) -> bool {
        let actual = actual.map(str::to_lowercase);
        match self {
            ExpectedContentType::Exact(expected) => actual.as_deref() == Some(expected.as_str()),
            ExpectedContentType::AnyOf(members) => members.contains(&actual),
        }
    }

    pub fn json() -> Self {
        Self::any_of(JSON_CONTENT_TYPES)
    }
}

impl From<&str> for ExpectedContentType {
    fn from(value: &str) -> Self {
        ExpectedContentType::Exact(value.to_string())
    }
}

impl From<String> for ExpectedContentType {
    fn from(value: String) -> Self {
        ExpectedContentType::Exact(value)
    }
}

impl<const N: usize> From<[&str; N]> for ExpectedContentType {
    fn from(values: [&str; N]) -> Self {
        ExpectedContentType::any_of(values)
    }
}

impl From<Vec<Option<String>>> for ExpectedContentType {
    fn from(members: Vec<Option<String>>) -> Self {
        ExpectedContentType::AnyOf(members)
    }
}

/// HTTP codes a caller accepts from a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedCodes {
    One(u16),
    AnyOf(Vec<u16>),
}

impl AllowedCodes {
    pub fn contains(&self, code: u16) -> bool {
        match self {
            AllowedCodes::One(allowed) => *allowed == code,
            AllowedCodes::AnyOf(allowed) => allowed.contains(&code),
        }
    }

    pub fn to_vec(&self) -> Vec<u16> {
        match self {
            AllowedCodes::One(allowed) => vec![*allowed],
            AllowedCodes::AnyOf(allowed) => allowed.clone(),
        }
    }
}

impl Default for AllowedCodes {
    fn default() -> Self {
        AllowedCodes::One(200)
    }
}

impl From<u16> for AllowedCodes {
    fn from(code: u16) -> Self {
        AllowedCodes::One(code)
    }
}

impl From<Vec<u16>> for AllowedCodes {
    fn from(codes: Vec<u16>) -> Self {
        AllowedCodes::AnyOf(codes)
    }
}

impl From<&[u16]> for AllowedCodes {
    fn from(codes: &[u16]) -> Self {
        AllowedCodes::AnyOf(codes.to_vec())
    }
}

impl<const N: usize> From<[u16; N]> for AllowedCodes {
    fn from(codes: [u16; N]) -> Self {
        AllowedCodes::AnyOf(codes.to_vec())
    }
}
