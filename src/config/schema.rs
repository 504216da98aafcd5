//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::codec::{NumberMode, YamlStyle};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ApiConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Format selection rules.
    pub negotiation: NegotiationConfig,

    /// Per-format codec settings.
    pub codecs: CodecConfig,

    /// Authentication settings.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request size limits.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Content negotiation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Format token used when no signal selects one.
    pub default_format: String,

    /// Query parameter carrying an explicit format token.
    pub format_param: String,

    /// Honor a trailing `.token` on the last path segment.
    pub url_suffix: bool,

    /// Reply 406 when an `Accept` header is present but nothing in it resolves.
    pub strict: bool,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            default_format: "json".to_string(),
            format_param: "format".to_string(),
            url_suffix: true,
            strict: false,
        }
    }
}

/// Codec configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Indent JSON output.
    pub pretty_json: bool,

    /// Root element name for XML documents.
    pub xml_root: String,

    /// How untyped XML text is read back.
    pub xml_number_mode: NumberMode,

    /// YAML output layout.
    pub yaml_style: YamlStyle,

    /// Allow `<nil/>` in XML-RPC payloads.
    pub xmlrpc_allow_none: bool,

    /// Charset used to encode response bodies.
    pub default_charset: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            pretty_json: false,
            xml_root: "response".to_string(),
            xml_number_mode: NumberMode::Basic,
            yaml_style: YamlStyle::Flow,
            xmlrpc_allow_none: true,
            default_charset: "utf-8".to_string(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Realm advertised in `WWW-Authenticate` challenges.
    pub realm: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            realm: "restmux".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: ApiConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.negotiation.default_format, "json");
        assert!(!config.negotiation.strict);
        assert_eq!(config.codecs.yaml_style, YamlStyle::Flow);
        assert_eq!(config.security.max_body_size, 2 * 1024 * 1024);
    }

    #[test]
    fn test_partial_sections() {
        let config: ApiConfig = toml::from_str(
            r#"
            [negotiation]
            strict = true

            [codecs]
            yaml_style = "block"
            xml_number_mode = "off"
            "#,
        )
        .unwrap();
        assert!(config.negotiation.strict);
        assert_eq!(config.negotiation.format_param, "format");
        assert_eq!(config.codecs.yaml_style, YamlStyle::Block);
        assert_eq!(config.codecs.xml_number_mode, NumberMode::Off);
        assert_eq!(config.codecs.xml_root, "response");
    }
}
