//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ApiConfig (validated, immutable)
//!     → lifecycle::startup builds the registry, negotiator and engine from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the codec registry built from it is
//!   never mutated while serving
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ApiConfig, AuthConfig, CodecConfig, ListenerConfig, NegotiationConfig, ObservabilityConfig,
    SecurityConfig, TimeoutConfig,
};
pub use validation::ValidationError;
