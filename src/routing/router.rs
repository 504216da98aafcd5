//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Look up the resource for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan, first match wins
//! - A path that misses every route is retried with its trailing slash
//!   toggled (`/foo/` ↔ `/foo`)

use std::sync::Arc;

use crate::resource::Resource;
use crate::routing::matcher::{Captures, RoutePattern};
use crate::routing::RouteError;

/// A route resolved for a request.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub resource: Arc<Resource>,
    pub captures: Captures,
}

#[derive(Debug, Clone)]
struct Route {
    pattern: RoutePattern,
    resource: Arc<Resource>,
}

/// Ordered table of route patterns.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route; earlier routes take precedence.
    pub fn route(mut self, pattern: &str, resource: impl Into<Arc<Resource>>) -> Result<Self, RouteError> {
        self.add(pattern, resource)?;
        Ok(self)
    }

    pub fn add(&mut self, pattern: &str, resource: impl Into<Arc<Resource>>) -> Result<(), RouteError> {
        let pattern = RoutePattern::new(pattern)?;
        let resource = resource.into();
        tracing::debug!(pattern = %pattern.as_str(), resource = %resource.name(), "Route registered");
        self.routes.push(Route { pattern, resource });
        Ok(())
    }

    /// Find the resource for `path`.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        self.find(path).or_else(|| self.find(&toggle_trailing_slash(path)))
    }

    fn find(&self, path: &str) -> Option<RouteMatch> {
        self.routes.iter().find_map(|route| {
            route.pattern.captures(path).map(|captures| RouteMatch {
                resource: route.resource.clone(),
                captures,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn toggle_trailing_slash(path: &str) -> String {
    match path.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => format!("{}/", path),
    }
}
