//! Plain text codec, the fallback for unknown request content types.

use crate::codec::{Charset, Codec, CodecError, Value};

pub const CONTENT_TYPE: &str = "text/plain";

/// Passes text through unchanged.
///
/// Strings are written verbatim; any other value is written in its JSON
/// notation. Decoding never interprets the body, it always yields a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl TextCodec {
    /// Render a value as plain text.
    pub fn render(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl Codec for TextCodec {
    fn name(&self) -> &'static str {
        "text"
    }

    fn content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn encode(&self, value: &Value, charset: Charset) -> Result<Vec<u8>, CodecError> {
        charset.encode(&Self::render(value))
    }

    fn decode(&self, bytes: &[u8], charset: Charset) -> Result<Value, CodecError> {
        Ok(Value::String(charset.decode(bytes)?))
    }
}
