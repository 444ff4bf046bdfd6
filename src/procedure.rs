//! Procedure abstraction for colocated route definitions.
//!
//! A `Procedure` combines input schema, output schema, metadata (path, method,
//! summary, tags), and an async handler into a single type. Registering a
//! procedure on the router wires up both the HTTP handler and OpenAPI
//! metadata.

use std::future::Future;

use hyper::Method;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::router::Context;

/// Route metadata builder.
pub struct Meta {
    pub path: &'static str,
    pub method: Method,
    pub summary: &'static str,
    pub tag: &'static str,
    pub status: u16,
    pub secured: bool,
}

impl Meta {
    fn new(method: Method, path: &'static str) -> Self {
        Self {
            path,
            method,
            summary: "",
            tag: "",
            status: 200,
            secured: true,
        }
    }

    pub fn get(path: &'static str) -> Self {
        Self::new(Method::GET, path)
    }
    pub fn post(path: &'static str) -> Self {
        Self::new(Method::POST, path)
    }
    pub fn patch(path: &'static str) -> Self {
        Self::new(Method::PATCH, path)
    }
    pub fn delete(path: &'static str) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn summary(mut self, s: &'static str) -> Self {
        self.summary = s;
        self
    }
    pub fn tag(mut self, t: &'static str) -> Self {
        self.tag = t;
        self
    }
    pub fn status(mut self, s: u16) -> Self {
        self.status = s;
        self
    }
    /// Mark the operation as reachable without a bearer token.
    pub fn public(mut self) -> Self {
        self.secured = false;
        self
    }
}

/// Marker type for procedures that take no request body.
///
/// Deserializes from any JSON value (or empty body) and produces a null JSON
/// Schema so the OpenAPI generator omits the `requestBody`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

impl<'de> serde::Deserialize<'de> for Empty {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let _ = serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(Empty)
    }
}

impl JsonSchema for Empty {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "Empty".into()
    }

    fn json_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::Schema::default()
    }
}

/// Response body for deletions.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Deleted {
    pub id: String,
    pub deleted: bool,
}

impl Deleted {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            deleted: true,
        }
    }
}

/// A procedure is a self-contained endpoint definition: metadata + input +
/// output + handler.
pub trait Procedure: Send + Sync + 'static {
    /// Route metadata (path, method, summary, tag, status code).
    fn meta() -> Meta;

    /// Request body type. Use `Empty` for procedures with no request body.
    type Input: DeserializeOwned + JsonSchema + Send + 'static;

    /// Response body type.
    type Output: Serialize + JsonSchema;

    /// The async handler.
    fn handle(
        ctx: Context,
        input: Self::Input,
    ) -> impl Future<Output = crate::Result<Self::Output>> + Send;
}
