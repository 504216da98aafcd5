//! Resource definitions.
//!
//! # Responsibilities
//! - Bind handlers to HTTP methods (case-insensitive)
//! - Carry the resource's access policy (anonymous access, strategy)
//! - Carry the post-success output hooks
//!
//! # Design Decisions
//! - Resources are plain values built at startup and shared behind `Arc`;
//!   no lookup by name at request time
//! - Handlers are async; a handler that has its answer ready simply returns
//!   a ready future
//! - A missing method handler is a structural 405, not a handler error

pub mod collection;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::auth::Authenticator;
use crate::codec::Value;
use crate::http::{ApiResponse, HandlerError, RequestHead};
use crate::routing::Captures;

pub use collection::MemoryCollection;

/// Everything a handler receives.
#[derive(Debug, Clone)]
pub struct Call {
    pub head: Arc<RequestHead>,
    /// Decoded body; `None` for bodiless methods or an empty body.
    pub input: Option<Value>,
    /// Route captures.
    pub args: Captures,
}

impl Call {
    /// Named route capture.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name)
    }
}

/// Future returned by a handler.
pub type HandlerFuture = BoxFuture<'static, Result<ApiResponse, HandlerError>>;

/// A method handler.
///
/// Implemented for `Fn(Call) -> impl Future<Output = Result<R, HandlerError>>`
/// where `R: Into<ApiResponse>`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, call: Call) -> HandlerFuture;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Call) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
    R: Into<ApiResponse>,
{
    fn call(&self, call: Call) -> HandlerFuture {
        let future = (self)(call);
        Box::pin(async move { future.await.map(Into::into) })
    }
}

/// Validation and serialization steps run on a successful handler result.
///
/// Either step may still fail the request, e.g. with `Conflict`.
pub trait OutputHooks: Send + Sync + 'static {
    fn validate(&self, _head: &RequestHead, _response: &ApiResponse) -> Result<(), HandlerError> {
        Ok(())
    }

    fn serialize(&self, _head: &RequestHead, response: ApiResponse) -> Result<ApiResponse, HandlerError> {
        Ok(response)
    }
}

/// Hooks that pass every response through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl OutputHooks for NoHooks {}

/// An endpoint: method handlers plus access policy.
pub struct Resource {
    name: String,
    handlers: HashMap<String, Arc<dyn Handler>>,
    allow_anonymous: bool,
    authenticator: Option<Arc<dyn Authenticator>>,
    hooks: Arc<dyn OutputHooks>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: HashMap::new(),
            allow_anonymous: true,
            authenticator: None,
            hooks: Arc::new(NoHooks),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind `handler` to `method`; the name is matched case-insensitively.
    pub fn on(mut self, method: &str, handler: impl Handler) -> Self {
        self.handlers.insert(method.to_ascii_lowercase(), Arc::new(handler));
        self
    }

    pub fn get(self, handler: impl Handler) -> Self {
        self.on("get", handler)
    }

    pub fn put(self, handler: impl Handler) -> Self {
        self.on("put", handler)
    }

    pub fn post(self, handler: impl Handler) -> Self {
        self.on("post", handler)
    }

    pub fn patch(self, handler: impl Handler) -> Self {
        self.on("patch", handler)
    }

    pub fn delete(self, handler: impl Handler) -> Self {
        self.on("delete", handler)
    }

    /// Whether requests may proceed without a resolved identity (default true).
    pub fn allow_anonymous(mut self, allow: bool) -> Self {
        self.allow_anonymous = allow;
        self
    }

    /// Authentication strategy for this resource.
    pub fn authenticate_with(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    pub fn hooks(mut self, hooks: impl OutputHooks) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn handler(&self, method: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(&method.to_ascii_lowercase()).cloned()
    }

    /// Upper-cased method names, sorted, for the `Allow` header.
    pub fn allowed_methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self.handlers.keys().map(|m| m.to_ascii_uppercase()).collect();
        methods.sort();
        methods
    }

    pub fn is_anonymous_allowed(&self) -> bool {
        self.allow_anonymous
    }

    pub fn authenticator(&self) -> Option<&Arc<dyn Authenticator>> {
        self.authenticator.as_ref()
    }

    pub fn output_hooks(&self) -> &dyn OutputHooks {
        self.hooks.as_ref()
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("methods", &self.allowed_methods())
            .field("allow_anonymous", &self.allow_anonymous)
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    fn call() -> Call {
        Call {
            head: Arc::new(RequestHead::new(Method::GET, "/")),
            input: None,
            args: Captures::default(),
        }
    }

    #[tokio::test]
    async fn test_closure_handler() {
        let resource = Resource::new("greeting").get(|_call: Call| async { Ok::<_, HandlerError>(json!("hi")) });
        let handler = resource.handler("GET").unwrap();
        let response = handler.call(call()).await.unwrap();
        assert_eq!(response.status, 0);
        assert_eq!(response.payload, crate::http::Payload::Value(json!("hi")));
    }

    #[test]
    fn test_method_lookup_is_case_insensitive() {
        let resource = Resource::new("r")
            .on("GET", |_call: Call| async { Ok::<_, HandlerError>(()) })
            .delete(|_call: Call| async { Ok::<_, HandlerError>(()) });
        assert!(resource.handler("get").is_some());
        assert!(resource.handler("Delete").is_some());
        assert!(resource.handler("put").is_none());
        assert_eq!(resource.allowed_methods(), vec!["DELETE", "GET"]);
    }

    #[test]
    fn test_defaults() {
        let resource = Resource::new("r");
        assert!(resource.is_anonymous_allowed());
        assert!(resource.authenticator().is_none());
        let response = resource.output_hooks().serialize(&call().head, ApiResponse::ok(json!(1))).unwrap();
        assert_eq!(response.status, 200);
    }
}
