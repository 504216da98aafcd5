//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check that named formats and charsets are ones the server knows
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ApiConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::codec::{xml, CodecRegistry, Charset};
use crate::config::schema::ApiConfig;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ApiConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let registry = CodecRegistry::with_defaults(&config.codecs);
    if registry.lookup(&config.negotiation.default_format).is_none() {
        errors.push(ValidationError::new(
            "negotiation.default_format",
            format!("unknown format '{}'", config.negotiation.default_format),
        ));
    }
    if config.negotiation.format_param.trim().is_empty() {
        errors.push(ValidationError::new("negotiation.format_param", "must not be empty"));
    }

    if Charset::from_label(&config.codecs.default_charset).is_none() {
        errors.push(ValidationError::new(
            "codecs.default_charset",
            format!("unsupported charset '{}'", config.codecs.default_charset),
        ));
    }
    if !xml::is_valid_name(&config.codecs.xml_root) {
        errors.push(ValidationError::new(
            "codecs.xml_root",
            format!("'{}' is not a valid XML element name", config.codecs.xml_root),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than zero"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&ApiConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ApiConfig::default();
        config.listener.bind_address = "nowhere".to_string();
        config.negotiation.default_format = "msgpack".to_string();
        config.negotiation.format_param = " ".to_string();
        config.security.max_body_size = 0;
        config.codecs.default_charset = "utf-16".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "negotiation.default_format",
                "negotiation.format_param",
                "codecs.default_charset",
                "security.max_body_size",
            ]
        );
    }

    #[test]
    fn test_xml_root_must_be_element_name() {
        let mut config = ApiConfig::default();
        for root in ["", "1root", "a b"] {
            config.codecs.xml_root = root.to_string();
            let errors = validate_config(&config).unwrap_err();
            assert_eq!(errors[0].field, "codecs.xml_root");
        }
        config.codecs.xml_root = "payload".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ApiConfig::default();
        config.observability.metrics_address = "bad".to_string();
        assert!(validate_config(&config).is_err());
        config.observability.metrics_enabled = false;
        assert!(validate_config(&config).is_ok());
    }
}
