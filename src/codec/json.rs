//! JSON codec.

use crate::codec::{Charset, Codec, CodecError, Value};

pub const CONTENT_TYPE: &str = "application/json";

/// JSON objects, arrays and scalars.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit indented output instead of the compact form.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn encode(&self, value: &Value, charset: Charset) -> Result<Vec<u8>, CodecError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(|e| CodecError::encode("json", e))?;
        charset.encode(&text)
    }

    fn decode(&self, bytes: &[u8], charset: Charset) -> Result<Value, CodecError> {
        let text = charset.decode(bytes)?;
        serde_json::from_str(&text).map_err(|e| CodecError::decode("json", e))
    }
}
