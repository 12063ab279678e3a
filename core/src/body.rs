//! Request body strategies.
//!
//! A body is either a raw string or an encoder that produces the wire body
//! together with its own content type. Encoders are shared behind `Arc` so a
//! request stays cheap to clone for debug capture.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::finite;
use crate::http::{QueryParams, APPLICATION_JSON, FORM_URLENCODED};

/// Turns application data into a wire body plus an optional content type.
pub trait BodyEncoder: fmt::Debug + Send + Sync {
    fn encode(&self) -> Result<String>;

    fn content_type(&self) -> Option<&str>;
}

/// Body attached to a request.
#[derive(Debug, Clone)]
pub enum Body {
    /// Sent as-is; the content type comes from the request override.
    Raw(String),
    Encoded(Arc<dyn BodyEncoder>),
}

impl Body {
    pub fn encode(&self) -> Result<String> {
        match self {
            Body::Raw(raw) => Ok(raw.clone()),
            Body::Encoded(encoder) => encoder.encode(),
        }
    }
}

impl From<String> for Body {
    fn from(raw: String) -> Self {
        Body::Raw(raw)
    }
}

impl From<&str> for Body {
    fn from(raw: &str) -> Self {
        Body::Raw(raw.to_string())
    }
}

impl From<NoBody> for Body {
    fn from(body: NoBody) -> Self {
        Body::Encoded(Arc::new(body))
    }
}

impl From<JsonBody> for Body {
    fn from(body: JsonBody) -> Self {
        Body::Encoded(Arc::new(body))
    }
}

impl From<UrlencodedBody> for Body {
    fn from(body: UrlencodedBody) -> Self {
        Body::Encoded(Arc::new(body))
    }
}

/// Explicitly empty body without a content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBody;

impl BodyEncoder for NoBody {
    fn encode(&self) -> Result<String> {
        Ok(String::new())
    }

    fn content_type(&self) -> Option<&str> {
        None
    }
}

trait ErasedJson: Send + Sync {
    fn to_json(&self) -> serde_json::Result<String>;
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T> ErasedJson for T
where
    T: Serialize + Send + Sync + 'static,
{
    fn to_json(&self) -> serde_json::Result<String> {
        finite::check(self)?;
        serde_json::to_string(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Data held by a [`JsonBody`], kept so encode failures can hand it back.
#[derive(Clone)]
pub struct JsonData(Arc<dyn ErasedJson>);

impl JsonData {
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

impl fmt::Debug for JsonData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JsonData").field(&self.type_name()).finish()
    }
}

/// Serializes its data with `serde_json` every time the body is requested.
#[derive(Debug, Clone)]
pub struct JsonBody {
    data: JsonData,
    content_type: Option<String>,
}

impl JsonBody {
    pub fn new<T>(data: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self {
            data: JsonData(Arc::new(data)),
            content_type: Some(APPLICATION_JSON.to_string()),
        }
    }

    /// `None` sends the body without a `Content-Type` line.
    pub fn with_content_type(mut self, content_type: Option<&str>) -> Self {
        self.content_type = content_type.map(str::to_string);
        self
    }

    pub fn data(&self) -> &JsonData {
        &self.data
    }
}

impl BodyEncoder for JsonBody {
    fn encode(&self) -> Result<String> {
        self.data.0.to_json().map_err(|source| Error::JsonEncode {
            data: self.data.clone(),
            source,
        })
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// `application/x-www-form-urlencoded` body.
#[derive(Debug, Clone)]
pub struct UrlencodedBody {
    encoded: String,
    content_type: Option<String>,
}

impl UrlencodedBody {
    pub fn new(params: impl Into<QueryParams>) -> Self {
        Self {
            encoded: params.into().encode(),
            content_type: Some(FORM_URLENCODED.to_string()),
        }
    }

    /// Encode a flat struct or map; nested values are rejected.
    pub fn from_struct<T: Serialize + ?Sized>(data: &T) -> Result<Self> {
        Ok(Self {
            encoded: serde_urlencoded::to_string(data)?,
            content_type: Some(FORM_URLENCODED.to_string()),
        })
    }

    pub fn with_content_type(mut self, content_type: Option<&str>) -> Self {
        self.content_type = content_type.map(str::to_string);
        self
    }
}

impl BodyEncoder for UrlencodedBody {
    fn encode(&self) -> Result<String> {
        Ok(self.encoded.clone())
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}
