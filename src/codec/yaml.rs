//! YAML codec.

use serde::{Deserialize, Serialize};

use crate::codec::{Charset, Codec, CodecError, Value};

pub const CONTENT_TYPE: &str = "application/yaml";

/// Output layout for YAML documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum YamlStyle {
    /// Single-line flow collections: `{"name":"value","list":[1,2]}`.
    #[default]
    Flow,
    /// Indented block collections.
    Block,
}

/// YAML documents in block or flow style.
#[derive(Debug, Clone, Default)]
pub struct YamlCodec {
    style: YamlStyle,
}

impl YamlCodec {
    pub fn new(style: YamlStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> YamlStyle {
        self.style
    }
}

impl Codec for YamlCodec {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn encode(&self, value: &Value, charset: Charset) -> Result<Vec<u8>, CodecError> {
        let text = match self.style {
            YamlStyle::Block => serde_yaml::to_string(value).map_err(|e| CodecError::encode("yaml", e))?,
            YamlStyle::Flow => {
                // JSON notation is valid YAML flow style, with every scalar quoted
                let mut text = serde_json::to_string(value).map_err(|e| CodecError::encode("yaml", e))?;
                text.push('\n');
                text
            }
        };
        charset.encode(&text)
    }

    fn decode(&self, bytes: &[u8], charset: Charset) -> Result<Value, CodecError> {
        let text = charset.decode(bytes)?;
        serde_yaml::from_str(&text).map_err(|e| CodecError::decode("yaml", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_style() {
        let codec = YamlCodec::new(YamlStyle::Block);
        let bytes = codec.encode(&json!({"name": "John", "age": 30}), Charset::Utf8).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "age: 30\nname: John\n");
    }

    #[test]
    fn test_flow_style() {
        let codec = YamlCodec::new(YamlStyle::Flow);
        let bytes = codec.encode(&json!({"items": [1, 2]}), Charset::Utf8).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\"items\":[1,2]}\n");
    }

    #[test]
    fn test_decode_block_document() {
        let yaml = b"person:\n  name: John\n  roles:\n    - admin\n    - dev\n";
        let value = YamlCodec::default().decode(yaml, Charset::Utf8).unwrap();
        assert_eq!(value, json!({"person": {"name": "John", "roles": ["admin", "dev"]}}));
    }

    #[test]
    fn test_decode_invalid() {
        let err = YamlCodec::default().decode(b"invalid: [unclosed", Charset::Utf8).unwrap_err();
        assert!(matches!(err, CodecError::Decode { format: "yaml", .. }));
    }
}
