//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the codec registry, negotiator and engine from a validated config
//! - Bind the listener last, once everything else is ready

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::codec::{Charset, CodecRegistry};
use crate::config::ApiConfig;
use crate::negotiation::{NegotiationError, Negotiator};
use crate::pipeline::Engine;

/// Errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("negotiation setup failed: {0}")]
    Negotiation(#[from] NegotiationError),

    #[error("unsupported charset '{0}'")]
    Charset(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Assemble the engine described by `config`.
pub fn build_engine(config: &ApiConfig) -> Result<Engine, StartupError> {
    let charset = Charset::from_label(&config.codecs.default_charset)
        .ok_or_else(|| StartupError::Charset(config.codecs.default_charset.clone()))?;

    let registry = Arc::new(CodecRegistry::with_defaults(&config.codecs));
    tracing::debug!(codecs = registry.len(), "Codec registry built");

    let negotiator = Negotiator::new(registry, &config.negotiation)?;
    Ok(Engine::new(negotiator, charset).max_body_size(config.security.max_body_size))
}

/// Bind the configured listener address.
pub async fn bind_listener(config: &ApiConfig) -> Result<TcpListener, StartupError> {
    let address = &config.listener.bind_address;
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_engine_from_defaults() {
        let engine = build_engine(&ApiConfig::default()).unwrap();
        assert!(engine.negotiator().registry().lookup("yaml").is_some());
    }

    #[test]
    fn test_unknown_default_format_is_fatal() {
        let mut config = ApiConfig::default();
        config.negotiation.default_format = "msgpack".to_string();
        assert!(matches!(build_engine(&config), Err(StartupError::Negotiation(_))));
    }

    #[test]
    fn test_unknown_charset_is_fatal() {
        let mut config = ApiConfig::default();
        config.codecs.default_charset = "ebcdic".to_string();
        assert!(matches!(build_engine(&config), Err(StartupError::Charset(_))));
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let mut config = ApiConfig::default();
        config.listener.bind_address = "127.0.0.1:0".to_string();
        let listener = bind_listener(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
