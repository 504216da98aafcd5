//! XML-RPC envelope codec.
//!
//! Encodes a single value as the only parameter of a `methodResponse`.
//! Decoding accepts `methodResponse`, `methodCall` and bare `params`
//! documents; one parameter yields that value, several yield a list.
//!
//! Only reachable through an explicit format override (`?format=xmlrpc`):
//! it shares `text/xml` with the plain XML codec and is never registered
//! under a MIME key.

use base64::Engine as _;

use crate::codec::tree::{self, Element};
use crate::codec::{Charset, Codec, CodecError, Value};

pub const CONTENT_TYPE: &str = "text/xml";

/// XML-RPC `methodResponse` payloads.
#[derive(Debug, Clone)]
pub struct XmlRpcCodec {
    method_response: bool,
    allow_none: bool,
}

impl Default for XmlRpcCodec {
    fn default() -> Self {
        Self {
            method_response: true,
            allow_none: true,
        }
    }
}

impl XmlRpcCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap parameters in `<methodResponse>` (default) or emit bare `<params>`.
    pub fn method_response(mut self, enabled: bool) -> Self {
        self.method_response = enabled;
        self
    }

    /// Allow `null` values via the `<nil/>` extension.
    pub fn allow_none(mut self, allow: bool) -> Self {
        self.allow_none = allow;
        self
    }

    fn write_value(&self, out: &mut String, value: &Value) -> Result<(), CodecError> {
        out.push_str("<value>");
        match value {
            Value::Null if self.allow_none => out.push_str("<nil/>"),
            Value::Null => {
                return Err(CodecError::encode("xmlrpc", "cannot marshal null unless allow_none is enabled"));
            }
            Value::Bool(b) => out.push_str(&format!("<boolean>{}</boolean>", u8::from(*b))),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    if i32::try_from(i).is_ok() {
                        out.push_str(&format!("<int>{}</int>", i));
                    } else {
                        out.push_str(&format!("<i8>{}</i8>", i));
                    }
                } else if n.is_u64() {
                    return Err(CodecError::encode("xmlrpc", format!("integer {} out of range", n)));
                } else {
                    out.push_str(&format!("<double>{}</double>", n));
                }
            }
            Value::String(s) => {
                out.push_str(&format!("<string>{}</string>", quick_xml::escape::escape(s.as_str())));
            }
            Value::Array(items) => {
                out.push_str("<array><data>");
                for item in items {
                    self.write_value(out, item)?;
                }
                out.push_str("</data></array>");
            }
            Value::Object(map) => {
                out.push_str("<struct>");
                for (key, member) in map {
                    out.push_str(&format!("<member><name>{}</name>", quick_xml::escape::escape(key.as_str())));
                    self.write_value(out, member)?;
                    out.push_str("</member>");
                }
                out.push_str("</struct>");
            }
        }
        out.push_str("</value>");
        Ok(())
    }
}

impl Codec for XmlRpcCodec {
    fn name(&self) -> &'static str {
        "xmlrpc"
    }

    fn content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn encode(&self, value: &Value, charset: Charset) -> Result<Vec<u8>, CodecError> {
        let mut out = format!("<?xml version=\"1.0\" encoding=\"{}\"?>", charset.name());
        if self.method_response {
            out.push_str("<methodResponse>");
        }
        out.push_str("<params><param>");
        self.write_value(&mut out, value)?;
        out.push_str("</param></params>");
        if self.method_response {
            out.push_str("</methodResponse>");
        }
        charset.encode(&out)
    }

    fn decode(&self, bytes: &[u8], charset: Charset) -> Result<Value, CodecError> {
        let text = charset.decode(bytes)?;
        let root = tree::parse(&text).map_err(|e| CodecError::decode("xmlrpc", e))?;

        let params = match root.name.as_str() {
            "params" => &root,
            "methodResponse" | "methodCall" => {
                if root.child("fault").is_some() {
                    return Err(CodecError::decode("xmlrpc", "document carries a fault"));
                }
                match root.child("params") {
                    Some(params) => params,
                    None => return Ok(Value::Null),
                }
            }
            other => {
                return Err(CodecError::decode("xmlrpc", format!("unexpected root element <{}>", other)));
            }
        };

        let mut values = params
            .children_named("param")
            .map(|param| {
                param
                    .child("value")
                    .ok_or_else(|| CodecError::decode("xmlrpc", "<param> without <value>"))
                    .and_then(read_value)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match values.len() {
            0 => Value::Null,
            1 => values.remove(0),
            _ => Value::Array(values),
        })
    }
}

fn read_value(value: &Element) -> Result<Value, CodecError> {
    // a <value> without a type element is a string
    let Some(typed) = value.children.first() else {
        return Ok(Value::String(value.text.clone()));
    };
    let text = typed.text.trim();

    match typed.name.as_str() {
        "string" | "dateTime.iso8601" => Ok(Value::String(typed.text.clone())),
        "int" | "i4" | "i8" => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| CodecError::decode("xmlrpc", format!("bad integer '{}': {}", text, e))),
        "double" => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| CodecError::decode("xmlrpc", format!("bad double '{}'", text))),
        "boolean" => match text {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(CodecError::decode("xmlrpc", format!("bad boolean '{}'", other))),
        },
        "nil" => Ok(Value::Null),
        "base64" => {
            let raw = base64::engine::general_purpose::STANDARD
                .decode(text)
                .map_err(|e| CodecError::decode("xmlrpc", e))?;
            String::from_utf8(raw)
                .map(Value::String)
                .map_err(|_| CodecError::decode("xmlrpc", "base64 payload is not utf-8 text"))
        }
        "array" => typed
            .child("data")
            .map(|data| data.children_named("value").map(read_value).collect::<Result<Vec<_>, _>>())
            .unwrap_or_else(|| Ok(Vec::new()))
            .map(Value::Array),
        "struct" => {
            let mut map = serde_json::Map::new();
            for member in typed.children_named("member") {
                let name = member
                    .child("name")
                    .ok_or_else(|| CodecError::decode("xmlrpc", "<member> without <name>"))?;
                let value = member
                    .child("value")
                    .ok_or_else(|| CodecError::decode("xmlrpc", "<member> without <value>"))?;
                map.insert(name.text.clone(), read_value(value)?);
            }
            Ok(Value::Object(map))
        }
        other => Err(CodecError::decode("xmlrpc", format!("unknown value type <{}>", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope() {
        let bytes = XmlRpcCodec::new().encode(&json!("hi"), Charset::Utf8).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?><methodResponse><params><param>\
             <value><string>hi</string></value></param></params></methodResponse>"
        );
    }

    #[test]
    fn test_bare_params() {
        let codec = XmlRpcCodec::new().method_response(false);
        let bytes = codec.encode(&json!(1), Charset::Utf8).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(!text.contains("methodResponse"));
        assert_eq!(codec.decode(&bytes, Charset::Utf8).unwrap(), json!(1));
    }

    #[test]
    fn test_none_requires_allow_none() {
        let strict = XmlRpcCodec::new().allow_none(false);
        assert!(strict.encode(&json!({"a": null}), Charset::Utf8).is_err());
        let lenient = XmlRpcCodec::new();
        let bytes = lenient.encode(&json!({"a": null}), Charset::Utf8).unwrap();
        assert_eq!(lenient.decode(&bytes, Charset::Utf8).unwrap(), json!({"a": null}));
    }

    #[test]
    fn test_decode_method_call() {
        let doc = b"<?xml version=\"1.0\"?><methodCall><methodName>add</methodName><params>\
            <param><value><i4>2</i4></value></param>\
            <param><value>untyped</value></param>\
            <param><value><boolean>1</boolean></value></param>\
            <param><value><base64>aGVsbG8=</base64></value></param>\
            </params></methodCall>";
        let value = XmlRpcCodec::new().decode(doc, Charset::Utf8).unwrap();
        assert_eq!(value, json!([2, "untyped", true, "hello"]));
    }

    #[test]
    fn test_large_integers_use_i8() {
        let bytes = XmlRpcCodec::new().encode(&json!(5_000_000_000i64), Charset::Utf8).unwrap();
        assert!(String::from_utf8(bytes.clone()).unwrap().contains("<i8>5000000000</i8>"));
        assert_eq!(XmlRpcCodec::new().decode(&bytes, Charset::Utf8).unwrap(), json!(5_000_000_000i64));
    }

    #[test]
    fn test_fault_is_rejected() {
        let doc = b"<methodResponse><fault><value><struct></struct></value></fault></methodResponse>";
        assert!(XmlRpcCodec::new().decode(doc, Charset::Utf8).is_err());
    }
}
