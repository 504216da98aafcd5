//! Content negotiation resolver.
//!
//! # Responsibilities
//! - Pick the codec that decodes the request body (`Content-Type`)
//! - Pick the codec that encodes the response body (override → `Accept` → default)
//! - Report the canonical `Content-Type` for the response
//!
//! # Design Decisions
//! - Decoding is best-effort: an unknown or missing `Content-Type` falls back
//!   to the registry's plain text codec, never an error
//! - Unresolvable `Accept` entries are skipped; exhausting the list falls
//!   back to the default codec unless strict mode is on
//! - Entries with `q=0` are refusals and never selected

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::{header, HeaderMap};

use crate::codec::{charset, Codec, CodecRegistry};
use crate::config::NegotiationConfig;
use crate::negotiation::accept::parse_accept;

/// Errors raised while negotiating.
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    /// The configured default format is not registered.
    #[error("default format '{0}' is not registered")]
    UnknownDefault(String),

    /// Strict mode: nothing in the `Accept` header can be produced.
    #[error("none of the accepted media types can be produced: {0}")]
    NotAcceptable(String),
}

/// Which signal picked the response codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Override,
    Accept,
    Default,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Selection::Override => "override",
            Selection::Accept => "accept",
            Selection::Default => "default",
        };
        f.write_str(label)
    }
}

/// The request signals negotiation looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals {
    /// Value of the reserved format query parameter.
    pub format_param: Option<String>,
    /// Trailing `.token` of the last path segment.
    pub url_suffix: Option<String>,
    pub content_type: Option<String>,
    pub accept: Option<String>,
}

/// Codecs chosen for one request.
#[derive(Debug, Clone)]
pub struct NegotiationResult {
    pub decode: Arc<dyn Codec>,
    pub encode: Arc<dyn Codec>,
    /// Outgoing `Content-Type`, the encode codec's canonical string.
    pub content_type: String,
    /// Raw `charset` label from the request `Content-Type`.
    pub request_charset: Option<String>,
    pub source: Selection,
}

/// Selects decode/encode codecs from request signals.
#[derive(Debug, Clone)]
pub struct Negotiator {
    registry: Arc<CodecRegistry>,
    default: Arc<dyn Codec>,
    format_param: String,
    url_suffix: bool,
    strict: bool,
}

impl Negotiator {
    /// Create a negotiator; the configured default format must be registered.
    pub fn new(registry: Arc<CodecRegistry>, config: &NegotiationConfig) -> Result<Self, NegotiationError> {
        let default = registry
            .lookup(&config.default_format)
            .ok_or_else(|| NegotiationError::UnknownDefault(config.default_format.clone()))?;

        Ok(Self {
            registry,
            default,
            format_param: config.format_param.clone(),
            url_suffix: config.url_suffix,
            strict: config.strict,
        })
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// Collect the signals for a request.
    pub fn signals(&self, path: &str, query: &HashMap<String, String>, headers: &HeaderMap) -> Signals {
        let header_value = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Signals {
            format_param: query.get(&self.format_param).filter(|v| !v.is_empty()).cloned(),
            url_suffix: if self.url_suffix { path_suffix(path).map(str::to_string) } else { None },
            content_type: header_value(header::CONTENT_TYPE),
            accept: header_value(header::ACCEPT),
        }
    }

    /// Choose the decode and encode codecs.
    pub fn negotiate(&self, signals: &Signals) -> Result<NegotiationResult, NegotiationError> {
        let (encode, source) = self.select_encoder(signals)?;
        let decode = self.select_decoder(signals.content_type.as_deref());
        let request_charset = signals
            .content_type
            .as_deref()
            .and_then(charset::charset_param)
            .map(str::to_string);

        tracing::debug!(
            decode = decode.name(),
            encode = encode.name(),
            source = %source,
            "Negotiated codecs"
        );

        Ok(NegotiationResult {
            content_type: encode.content_type().to_string(),
            decode,
            encode,
            request_charset,
            source,
        })
    }

    fn select_decoder(&self, content_type: Option<&str>) -> Arc<dyn Codec> {
        content_type
            .and_then(|ct| self.registry.lookup(ct))
            .or_else(|| self.registry.fallback())
            .unwrap_or_else(|| self.default.clone())
    }

    fn select_encoder(&self, signals: &Signals) -> Result<(Arc<dyn Codec>, Selection), NegotiationError> {
        // query parameter outranks the URL suffix
        let forced = [&signals.format_param, &signals.url_suffix]
            .into_iter()
            .flatten()
            .find_map(|token| self.registry.lookup(token));
        if let Some(codec) = forced {
            return Ok((codec, Selection::Override));
        }

        let Some(accept) = signals.accept.as_deref() else {
            return Ok((self.default.clone(), Selection::Default));
        };

        for range in parse_accept(Some(accept)) {
            if range.quality <= 0.0 {
                continue;
            }
            let codec = if range.is_full_wildcard() {
                Some(self.default.clone())
            } else if range.is_subtype_wildcard() {
                self.registry.lookup_type_wildcard(&range.main_type)
            } else {
                self.registry.lookup(&range.essence())
            };
            if let Some(codec) = codec {
                return Ok((codec, Selection::Accept));
            }
        }

        if self.strict {
            return Err(NegotiationError::NotAcceptable(accept.to_string()));
        }
        Ok((self.default.clone(), Selection::Default))
    }
}

/// Extension after the last `.` of the final path segment.
fn path_suffix(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use axum::http::HeaderValue;
    use rstest::rstest;

    fn negotiator(strict: bool) -> Negotiator {
        let registry = Arc::new(CodecRegistry::with_defaults(&CodecConfig::default()));
        let config = NegotiationConfig {
            strict,
            ..NegotiationConfig::default()
        };
        Negotiator::new(registry, &config).unwrap()
    }

    fn accept(header: &str) -> Signals {
        Signals {
            accept: Some(header.to_string()),
            ..Signals::default()
        }
    }

    #[rstest]
    #[case("application/json;q=0.5, text/xml;q=0.9", "xml")]
    #[case("text/*;q=0.8, text/xml;q=0.8", "xml")]
    #[case("*/*", "json")]
    #[case("image/png, application/yaml;q=0.2", "yaml")]
    #[case("text/*", "text")]
    #[case("application/x-yaml", "yaml")]
    #[case("text/xml;q=0, application/json;q=0.1", "json")]
    fn test_accept_selection(#[case] header: &str, #[case] expected: &str) {
        let result = negotiator(false).negotiate(&accept(header)).unwrap();
        assert_eq!(result.encode.name(), expected);
    }

    #[test]
    fn test_override_beats_accept() {
        let signals = Signals {
            format_param: Some("xml".to_string()),
            accept: Some("application/json".to_string()),
            ..Signals::default()
        };
        let result = negotiator(false).negotiate(&signals).unwrap();
        assert_eq!(result.encode.name(), "xml");
        assert_eq!(result.source, Selection::Override);
        assert_eq!(result.content_type, "text/xml");
    }

    #[test]
    fn test_query_beats_suffix() {
        let signals = Signals {
            format_param: Some("yaml".to_string()),
            url_suffix: Some("xml".to_string()),
            ..Signals::default()
        };
        assert_eq!(negotiator(false).negotiate(&signals).unwrap().encode.name(), "yaml");
    }

    #[test]
    fn test_unregistered_override_is_ignored() {
        let signals = Signals {
            format_param: Some("msgpack".to_string()),
            accept: Some("application/yaml".to_string()),
            ..Signals::default()
        };
        let result = negotiator(false).negotiate(&signals).unwrap();
        assert_eq!(result.encode.name(), "yaml");
        assert_eq!(result.source, Selection::Accept);
    }

    #[test]
    fn test_no_signals_use_default() {
        let result = negotiator(false).negotiate(&Signals::default()).unwrap();
        assert_eq!(result.encode.name(), "json");
        assert_eq!(result.decode.name(), "text");
        assert_eq!(result.source, Selection::Default);
    }

    #[test]
    fn test_canonical_content_type_for_alias() {
        let result = negotiator(false).negotiate(&accept("text/x-json")).unwrap();
        assert_eq!(result.content_type, "application/json");
    }

    #[test]
    fn test_unresolvable_accept() {
        let lenient = negotiator(false).negotiate(&accept("image/png")).unwrap();
        assert_eq!(lenient.encode.name(), "json");
        assert_eq!(lenient.source, Selection::Default);

        let strict = negotiator(true).negotiate(&accept("image/png"));
        assert!(matches!(strict, Err(NegotiationError::NotAcceptable(_))));
        assert!(negotiator(true).negotiate(&Signals::default()).is_ok());
    }

    #[test]
    fn test_deterministic() {
        let negotiator = negotiator(false);
        let signals = accept("text/*, application/*;q=0.9");
        let first = negotiator.negotiate(&signals).unwrap().encode.name();
        for _ in 0..10 {
            assert_eq!(negotiator.negotiate(&signals).unwrap().encode.name(), first);
        }
    }

    #[test]
    fn test_decoder_from_content_type() {
        let signals = Signals {
            content_type: Some("application/json; charset=ISO-8859-1".to_string()),
            ..Signals::default()
        };
        let result = negotiator(false).negotiate(&signals).unwrap();
        assert_eq!(result.decode.name(), "json");
        assert_eq!(result.request_charset.as_deref(), Some("ISO-8859-1"));

        let unknown = Signals {
            content_type: Some("application/octet-stream".to_string()),
            ..Signals::default()
        };
        assert_eq!(negotiator(false).negotiate(&unknown).unwrap().decode.name(), "text");
    }

    #[rstest]
    #[case("/items/key1.yaml", Some("yaml"))]
    #[case("/items.json", Some("json"))]
    #[case("/items/", None)]
    #[case("/v1.2/items", None)]
    #[case("/items/.hidden", None)]
    fn test_path_suffix(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(path_suffix(path), expected);
    }

    #[test]
    fn test_signals_from_request() {
        let negotiator = negotiator(false);
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/xml"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let query = HashMap::from([("format".to_string(), "yaml".to_string())]);

        let signals = negotiator.signals("/items/a.xml", &query, &headers);
        assert_eq!(signals.format_param.as_deref(), Some("yaml"));
        assert_eq!(signals.url_suffix.as_deref(), Some("xml"));
        assert_eq!(signals.accept.as_deref(), Some("text/xml"));
        assert_eq!(signals.content_type.as_deref(), Some("application/json"));
    }
}
