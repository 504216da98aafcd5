//! Wire format codecs.
//!
//! # Data Flow
//! ```text
//! request bytes ──(charset)──▶ text ──(codec.decode)──▶ Value ──▶ handler
//! handler Value ──(codec.encode)──▶ text ──(charset)──▶ response bytes
//!
//! Bootstrap (registry.rs):
//!     permissive JSON aliases → text → XML → strict JSON → YAML → XML-RPC token
//!     → frozen behind Arc, read-only while serving
//! ```
//!
//! # Design Decisions
//! - One language-neutral value model (`serde_json::Value`) shared by all formats
//! - Codecs are stateless apart from their formatting options
//! - Registry keys are normalized (charset stripped, lower-cased) on both
//!   insert and lookup
//! - Later registrations win, so strict MIME types override permissive aliases

pub mod charset;
pub mod json;
pub mod registry;
pub mod text;
pub mod xml;
pub mod xmlrpc;
pub mod yaml;

mod tree;

use thiserror::Error;

pub use charset::Charset;
pub use json::JsonCodec;
pub use registry::CodecRegistry;
pub use text::TextCodec;
pub use xml::{NumberMode, XmlCodec};
pub use xmlrpc::XmlRpcCodec;
pub use yaml::{YamlCodec, YamlStyle};

/// The structured value every codec reads and writes.
pub type Value = serde_json::Value;

/// Errors raised while transcoding payloads.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload is not valid for the format.
    #[error("unable to decode {format} payload: {reason}")]
    Decode { format: &'static str, reason: String },

    /// The value cannot be represented in the format.
    #[error("unable to encode {format} payload: {reason}")]
    Encode { format: &'static str, reason: String },

    /// The charset label is unknown.
    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// The bytes are not valid text in the declared charset.
    #[error("payload is not valid {charset} text")]
    InvalidText { charset: Charset },

    /// The text holds characters the target charset cannot carry.
    #[error("payload contains characters not representable in {charset}")]
    Unrepresentable { charset: Charset },
}

impl CodecError {
    pub(crate) fn decode(format: &'static str, reason: impl ToString) -> Self {
        CodecError::Decode {
            format,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn encode(format: &'static str, reason: impl ToString) -> Self {
        CodecError::Encode {
            format,
            reason: reason.to_string(),
        }
    }
}

/// Paired encode/decode capability for one wire format.
///
/// Implementations must satisfy `decode(encode(v, c), c) == v` for the
/// values their format can represent natively.
pub trait Codec: Send + Sync + std::fmt::Debug {
    /// Short format token, e.g. `json`.
    fn name(&self) -> &'static str;

    /// Canonical MIME type, without parameters.
    fn content_type(&self) -> &str;

    /// Serialize a value into bytes in the given charset.
    fn encode(&self, value: &Value, charset: Charset) -> Result<Vec<u8>, CodecError>;

    /// Parse raw bytes in the given charset into a value.
    fn decode(&self, bytes: &[u8], charset: Charset) -> Result<Value, CodecError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn sample() -> Value {
        json!({
            "name": "luke skywalker",
            "occupation": "jedi",
            "age": 19,
            "height": 1.72,
            "tags": ["pilot", "farmer"],
            "ship": {"model": "x-wing", "crew": 1},
            "zip": "02134",
            "serial": "+358",
            "padded": " 7 "
        })
    }

    #[test]
    fn test_round_trip_every_default_codec() {
        let registry = CodecRegistry::with_defaults(&Default::default());
        let codecs: Vec<Arc<dyn Codec>> = ["json", "xml", "yaml", "xmlrpc"]
            .iter()
            .map(|token| registry.lookup(token).unwrap())
            .collect();

        for codec in codecs {
            let bytes = codec.encode(&sample(), Charset::Utf8).unwrap();
            let back = codec.decode(&bytes, Charset::Utf8).unwrap();
            assert_eq!(back, sample(), "round trip through {}", codec.name());
        }
    }

    #[test]
    fn test_error_display() {
        let err = CodecError::decode("json", "expected value");
        assert_eq!(err.to_string(), "unable to decode json payload: expected value");

        let err = CodecError::Unrepresentable { charset: Charset::Ascii };
        assert!(err.to_string().contains("us-ascii"));
    }
}
