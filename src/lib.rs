//! Multi-format REST resource engine.
//!
//! Resources declare method handlers that work on plain [`codec::Value`]s;
//! the engine negotiates the wire format (JSON, XML, YAML, XML-RPC, text),
//! authenticates, decodes the body, dispatches, and encodes the reply.

pub mod auth;
pub mod codec;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod negotiation;
pub mod observability;
pub mod pipeline;
pub mod resource;
pub mod routing;

pub use config::schema::ApiConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::Engine;
pub use resource::Resource;
