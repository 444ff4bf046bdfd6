//! HTTP routing with matchit.
//!
//! Provides the router handlers are registered on and the per-request
//! [`Context`] they receive.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use hyper::Method;
use libsql::Connection;
use serde::de::DeserializeOwned;

use crate::Result;
use crate::auth::Identity;
use crate::config::SharedConfig;
use crate::model::Profile;
use crate::response::HttpResponse;

/// Boxed future for async handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Handler context passed to route handlers.
pub struct Context {
    /// The HTTP method.
    pub method: Method,
    /// The request URI.
    pub uri: hyper::Uri,
    /// The request headers.
    pub headers: hyper::http::HeaderMap,
    /// Route parameters (e.g., {id} from path).
    pub params: HashMap<String, String>,
    /// The request body, pre-read as bytes.
    pub body: Bytes,
    /// Database handle. Absent only in routing tests.
    pub db: Option<crate::db::Handle>,
    /// Server configuration.
    pub config: SharedConfig,
}

impl Context {
    /// Parse the request body as JSON.
    ///
    /// An empty body reads as `{}`, so inputs whose fields are all optional
    /// need no body at all.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.is_empty() {
            serde_json::from_value(serde_json::Value::Object(serde_json::Map::new()))
                .map_err(|e| crate::Error::BadRequest(format!("Invalid request body: {e}")))
        } else {
            serde_json::from_slice(&self.body)
                .map_err(|e| crate::Error::BadRequest(format!("Invalid request body: {e}")))
        }
    }

    /// Get a route parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    /// Get a required route parameter, returning BadRequest if missing.
    pub fn require_param(&self, name: &str) -> Result<&str> {
        self.param(name)
            .ok_or_else(|| crate::Error::BadRequest(format!("Missing parameter: {name}")))
    }

    /// The identity asserted by the bearer token, or `Unauthorized`.
    pub fn identity(&self) -> Result<Identity> {
        crate::auth::extract_identity(&self.headers, &self.config.auth)
    }

    /// Require a database connection, returning Internal error if not configured.
    pub fn conn(&self) -> Result<&Connection> {
        self.db
            .as_ref()
            .map(|db| db.conn())
            .ok_or_else(|| crate::Error::Internal("Database not configured".to_string()))
    }

    /// The acting profile for this request, created on first sign-in.
    ///
    /// Resolve once per request and pass the result down.
    pub async fn actor(&self) -> Result<Profile> {
        let identity = self.identity()?;
        crate::profiles::ensure(self.conn()?, &identity).await
    }
}

/// Handler function type.
/// Takes a Context and returns a future resolving to a Response.
pub type Handler = Box<dyn Fn(Context) -> BoxFuture<'static, Result<HttpResponse>> + Send + Sync>;

/// A registered route with method-specific handlers.
struct RouteEntry {
    handlers: HashMap<Method, Handler>,
}

/// HTTP router for registering and dispatching requests.
pub struct Router {
    routes: matchit::Router<usize>,
    /// Entry index per registered path template.
    paths: HashMap<String, usize>,
    entries: Vec<RouteEntry>,
    pub(crate) operations: Vec<crate::operation::Meta>,
}

impl Router {
    /// Create a new router.
    pub fn new() -> Self {
        Self {
            routes: matchit::Router::new(),
            paths: HashMap::new(),
            entries: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Register a handler for a method and path.
    pub fn route<F, Fut>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        let entry_idx = match self.paths.get(path) {
            Some(idx) => *idx,
            None => {
                let idx = self.entries.len();
                self.entries.push(RouteEntry {
                    handlers: HashMap::new(),
                });
                if let Err(e) = self.routes.insert(path, idx) {
                    tracing::error!(path, "Route rejected: {e}");
                }
                self.paths.insert(path.to_string(), idx);
                idx
            }
        };

        let boxed: Handler = Box::new(move |ctx| Box::pin(handler(ctx)));
        self.entries[entry_idx].handlers.insert(method, boxed);
    }

    /// Convenience method for GET requests.
    pub fn get<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.route(Method::GET, path, handler);
    }

    /// Register a [`Procedure`](crate::procedure::Procedure): wires up both
    /// the HTTP handler and OpenAPI metadata in one call.
    pub fn procedure<P: crate::procedure::Procedure>(&mut self) {
        use hyper::StatusCode;

        let meta = P::meta();
        let method = meta.method.clone();
        let path = meta.path;
        let status = meta.status;

        self.route(method, path, move |ctx| async move {
            let input: P::Input = ctx.json()?;
            let output = P::handle(ctx, input).await?;
            crate::response::json(
                StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
                &output,
            )
        });

        let input_schema = if std::any::TypeId::of::<P::Input>()
            == std::any::TypeId::of::<crate::procedure::Empty>()
        {
            None
        } else {
            Some(schemars::schema_for!(P::Input))
        };

        let output_schema = schemars::schema_for!(P::Output);

        self.operations.push(crate::operation::Meta {
            path: meta.path.to_string(),
            method: meta.method.to_string().to_lowercase(),
            summary: meta.summary.to_string(),
            tag: meta.tag.to_string(),
            status: meta.status,
            secured: meta.secured,
            input_schema,
            output_schema,
        });
    }

    /// Register a GET route that serves the OpenAPI JSON document built from
    /// all previously registered procedures.
    pub fn openapi(&mut self, path: &str, info: crate::openapi::Info) {
        let spec = crate::openapi::generate(&info, &self.operations);
        self.get(path, move |_ctx| {
            let spec = spec.clone();
            async move { crate::response::ok(&spec) }
        });
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe router handle for use in request handling.
pub struct RouterHandle {
    routes: matchit::Router<usize>,
    entries: Vec<RouteEntry>,
}

impl Router {
    /// Convert to a thread-safe handle for use in request handling.
    pub fn into_handle(self) -> Arc<RouterHandle> {
        Arc::new(RouterHandle {
            routes: self.routes,
            entries: self.entries,
        })
    }
}

/// Result of matching a request to a route.
pub enum RouteMatch<'a> {
    /// Route matched with handler.
    Matched {
        handler: &'a Handler,
        params: HashMap<String, String>,
    },
    /// Path matched but method not allowed.
    MethodNotAllowed,
    /// Path not found.
    NotFound,
}

impl RouterHandle {
    /// Match a request to a route.
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        match self.routes.at(path) {
            Ok(matched) => {
                let entry = &self.entries[*matched.value];

                let params: HashMap<String, String> = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();

                match entry.handlers.get(method) {
                    Some(handler) => RouteMatch::Matched { handler, params },
                    None => RouteMatch::MethodNotAllowed,
                }
            }
            Err(_) => RouteMatch::NotFound,
        }
    }
}
