//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! pipeline Authenticate stage
//!     → Authenticator::authenticate(head)   (may await an external check)
//!     → Ok(Principal)  → stored on the request head for the handler
//!     → Err(401/403)   → error channel
//!
//! Error classifier, on Unauthorized:
//!     → Authenticator::auth_failed(error)   (protocol challenge response)
//! ```
//!
//! # Design Decisions
//! - Strategies are injected per resource or once into the engine, never
//!   looked up from global state
//! - The credential check itself belongs to the embedding application

pub mod basic;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::http::{ApiResponse, HandlerError, HttpError, RequestHead};

pub use basic::{CredentialCheck, HttpBasic, SyncCheck};

/// Identity resolved for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An authentication strategy.
#[async_trait]
pub trait Authenticator: Send + Sync + Debug {
    /// Resolve the caller's identity or fail with `Unauthorized`/`Forbidden`.
    async fn authenticate(&self, head: &RequestHead) -> Result<Principal, HandlerError>;

    /// Response sent when classification ends in `Unauthorized`.
    fn auth_failed(&self, error: &HttpError) -> ApiResponse {
        ApiResponse::text(error.status().as_u16(), error.content.clone().unwrap_or_default())
    }
}
