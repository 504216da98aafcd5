//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, route lookup)
//!     → request.rs (request ID, head/body split, query parsing)
//!     → pipeline::Engine (negotiate, authenticate, decode, dispatch, encode)
//!     → response.rs / error.rs (handler results and failures)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::{ErrorKind, HandlerError, HttpError};
pub use request::{ApiRequest, RequestHead, UuidRequestId, X_REQUEST_ID};
pub use response::{ApiResponse, Payload};
pub use server::{AppState, HttpServer};
