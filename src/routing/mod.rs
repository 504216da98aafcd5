//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (ordered scan, trailing-slash retry)
//!     → matcher.rs (regex match, capture extraction)
//!     → Return: RouteMatch { resource, captures } or no match (404)
//!
//! Route Compilation (at startup):
//!     (pattern, Resource) pairs
//!     → Compile regexes
//!     → Freeze as immutable Router behind Arc
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod matcher;
pub mod router;

pub use matcher::{Captures, RoutePattern};
pub use router::{RouteMatch, Router};

/// Errors raised while building the route table.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
