//! Lookup table from MIME types and format tokens to codecs.
//!
//! # Responsibilities
//! - Map every accepted MIME string and short token to a codec
//! - Provide the plain text fallback for unknown request content types
//! - Resolve `type/*` media ranges deterministically (registration order)
//!
//! # Design Decisions
//! - Built once at startup, shared read-only behind `Arc` while serving
//! - Last registration for a key wins
//! - No removal

use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::{Codec, JsonCodec, TextCodec, XmlCodec, XmlRpcCodec, YamlCodec};
use crate::config::CodecConfig;

/// Codec lookup table.
#[derive(Debug, Clone, Default)]
pub struct CodecRegistry {
    entries: HashMap<String, Arc<dyn Codec>>,
    /// Keys in first-registration order.
    order: Vec<String>,
    fallback: Option<Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in formats.
    ///
    /// Permissive JSON aliases go in first so the strict registrations that
    /// follow override them.
    pub fn with_defaults(config: &CodecConfig) -> Self {
        let mut registry = Self::new();

        let json: Arc<dyn Codec> = Arc::new(JsonCodec::new().pretty(config.pretty_json));
        let text: Arc<dyn Codec> = Arc::new(TextCodec);
        let xml: Arc<dyn Codec> = Arc::new(
            XmlCodec::new()
                .root(config.xml_root.clone())
                .number_mode(config.xml_number_mode),
        );
        let yaml: Arc<dyn Codec> = Arc::new(YamlCodec::new(config.yaml_style));
        let xmlrpc: Arc<dyn Codec> = Arc::new(XmlRpcCodec::new().allow_none(config.xmlrpc_allow_none));

        // we'll be tolerant on what we receive
        registry.register(
            json.clone(),
            &["application/x-javascript", "text/javascript", "text/x-javascript", "text/x-json", "json"],
        );

        registry.register(text.clone(), &["text/plain", "text"]);
        registry.set_fallback(text);

        registry.register(xml, &["application/xml", "text/xml", "xml"]);
        registry.register(json, &["application/json", "json"]);
        registry.register(yaml, &["text/yaml", "application/yaml", "application/x-yaml", "yaml", "yml"]);
        registry.register(xmlrpc, &["xmlrpc"]);

        tracing::debug!(keys = registry.len(), "Codec registry initialized");
        registry
    }

    /// Register a codec under each of `keys`, replacing earlier entries.
    pub fn register(&mut self, codec: Arc<dyn Codec>, keys: &[&str]) {
        for key in keys {
            let key = normalize_key(key);
            if key.is_empty() {
                continue;
            }
            if !self.entries.contains_key(&key) {
                self.order.push(key.clone());
            }
            self.entries.insert(key, codec.clone());
        }
    }

    /// Codec used to decode bodies whose content type is unknown.
    pub fn set_fallback(&mut self, codec: Arc<dyn Codec>) {
        self.fallback = Some(codec);
    }

    pub fn fallback(&self) -> Option<Arc<dyn Codec>> {
        self.fallback.clone()
    }

    /// Look up a MIME type (parameters ignored) or a format token.
    pub fn lookup(&self, key: &str) -> Option<Arc<dyn Codec>> {
        self.entries.get(&normalize_key(key)).cloned()
    }

    /// Resolve a `type/*` range: the first registered `type/...` key whose
    /// codec also answers with a `type/...` content type.
    pub fn lookup_type_wildcard(&self, main_type: &str) -> Option<Arc<dyn Codec>> {
        let prefix = format!("{}/", main_type.to_ascii_lowercase());
        self.order
            .iter()
            .filter(|key| key.starts_with(&prefix))
            .filter_map(|key| self.entries.get(key))
            .find(|codec| codec.content_type().starts_with(&prefix))
            .cloned()
    }

    /// Registered keys in first-registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strip parameters and lower-case: `Text/XML; charset=utf-8` → `text/xml`.
pub fn normalize_key(key: &str) -> String {
    key.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}
