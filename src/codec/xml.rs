//! XML codec.
//!
//! # Document Shape
//! ```text
//! {"name": "luke", "tags": ["a"], "ok": true, "n": 3}
//!
//! <?xml version="1.0" encoding="utf-8"?>
//! <response>
//!   <name>luke</name>
//!   <tags type="list"><item>a</item></tags>
//!   <ok type="bool">true</ok>
//!   <n>3</n>
//! </response>
//! ```
//! (written without the indentation shown above)
//!
//! # Design Decisions
//! - Lists, booleans, null and empty objects carry a `type` attribute, so
//!   they survive a round trip
//! - Numbers carry no marker; `NumberMode::Basic` reads integer-looking text
//!   as integers and decimal-looking text as floats
//! - Strings that would read back as numbers are written with `type="str"`
//! - The root element name is ignored when decoding

use serde::{Deserialize, Serialize};

use crate::codec::tree::{self, Element};
use crate::codec::{Charset, Codec, CodecError, Value};

pub const CONTENT_TYPE: &str = "text/xml";

const LIST_ITEM: &str = "item";

/// How untyped element text is interpreted when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberMode {
    /// Integer text becomes an integer, decimal text a float.
    #[default]
    Basic,
    /// All text stays a string.
    Off,
}

/// Element-tree XML.
#[derive(Debug, Clone)]
pub struct XmlCodec {
    root: String,
    number_mode: NumberMode,
}

impl Default for XmlCodec {
    fn default() -> Self {
        Self {
            root: "response".to_string(),
            number_mode: NumberMode::Basic,
        }
    }
}

impl XmlCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn number_mode(mut self, mode: NumberMode) -> Self {
        self.number_mode = mode;
        self
    }

    fn write_element(&self, out: &mut String, name: &str, value: &Value) -> Result<(), CodecError> {
        if !is_valid_name(name) {
            return Err(CodecError::encode("xml", format!("'{}' is not a valid element name", name)));
        }

        match value {
            Value::Null => {
                out.push_str(&format!("<{} type=\"null\"/>", name));
            }
            Value::Bool(b) => {
                out.push_str(&format!("<{0} type=\"bool\">{1}</{0}>", name, b));
            }
            Value::Number(n) => {
                out.push_str(&format!("<{0}>{1}</{0}>", name, n));
            }
            Value::String(s) => {
                let marker = if parse_number(s).is_some() { " type=\"str\"" } else { "" };
                out.push_str(&format!("<{0}{1}>{2}</{0}>", name, marker, quick_xml::escape::escape(s.as_str())));
            }
            Value::Array(items) => {
                out.push_str(&format!("<{} type=\"list\">", name));
                for item in items {
                    self.write_element(out, LIST_ITEM, item)?;
                }
                out.push_str(&format!("</{}>", name));
            }
            Value::Object(map) if map.is_empty() => {
                out.push_str(&format!("<{} type=\"dict\"/>", name));
            }
            Value::Object(map) => {
                out.push_str(&format!("<{}>", name));
                for (key, member) in map {
                    self.write_element(out, key, member)?;
                }
                out.push_str(&format!("</{}>", name));
            }
        }
        Ok(())
    }

    fn read_element(&self, element: &Element) -> Result<Value, CodecError> {
        match element.attribute("type") {
            Some("null") => Ok(Value::Null),
            Some("str") => Ok(Value::String(element.text.clone())),
            Some("bool") => match element.text.trim() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                other => Err(CodecError::decode("xml", format!("'{}' is not a boolean", other))),
            },
            Some("list") => element
                .children
                .iter()
                .map(|child| self.read_element(child))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Some("dict") => self.read_members(element),
            _ if !element.children.is_empty() => self.read_members(element),
            _ => Ok(self.read_text(&element.text)),
        }
    }

    fn read_members(&self, element: &Element) -> Result<Value, CodecError> {
        let mut map = serde_json::Map::new();
        for child in &element.children {
            let value = self.read_element(child)?;
            // repeated sibling names collapse into a list
            match map.get_mut(&child.name) {
                Some(Value::Array(existing)) => existing.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(child.name.clone(), value);
                }
            }
        }
        Ok(Value::Object(map))
    }

    fn read_text(&self, text: &str) -> Value {
        match self.number_mode {
            NumberMode::Basic => parse_number(text).unwrap_or_else(|| Value::String(text.to_string())),
            NumberMode::Off => Value::String(text.to_string()),
        }
    }
}

impl Codec for XmlCodec {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn content_type(&self) -> &str {
        CONTENT_TYPE
    }

    fn encode(&self, value: &Value, charset: Charset) -> Result<Vec<u8>, CodecError> {
        let mut out = format!("<?xml version=\"1.0\" encoding=\"{}\"?>", charset.name());
        self.write_element(&mut out, &self.root, value)?;
        charset.encode(&out)
    }

    fn decode(&self, bytes: &[u8], charset: Charset) -> Result<Value, CodecError> {
        let text = charset.decode(bytes)?;
        let root = tree::parse(&text).map_err(|e| CodecError::decode("xml", e))?;
        self.read_element(&root)
    }
}

/// XML element name rule used for every written element.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// The number `NumberMode::Basic` reads from untyped text, if any.
fn parse_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::from(i));
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Some(Value::from(u));
    }
    if looks_decimal(trimmed) {
        return trimmed
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number);
    }
    None
}

fn looks_decimal(text: &str) -> bool {
    let digits = text.trim_start_matches(['-', '+']);
    digits.starts_with(|c: char| c.is_ascii_digit())
        && text.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(value: &Value) -> String {
        String::from_utf8(XmlCodec::new().encode(value, Charset::Utf8).unwrap()).unwrap()
    }

    #[test]
    fn test_encode_document() {
        let xml = encode(&json!({"name": "luke", "tags": ["a"], "ok": true, "n": 3}));
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?><response><n>3</n><name>luke</name>\
             <ok type=\"bool\">true</ok><tags type=\"list\"><item>a</item></tags></response>"
        );
    }

    #[test]
    fn test_escaping() {
        let xml = encode(&json!({"q": "a < b & c"}));
        assert!(xml.contains("<q>a &lt; b &amp; c</q>"));
        let back = XmlCodec::new().decode(xml.as_bytes(), Charset::Utf8).unwrap();
        assert_eq!(back, json!({"q": "a < b & c"}));
    }

    #[test]
    fn test_number_modes() {
        let xml = b"<doc><i>42</i><f>2.5</f><s>4th</s></doc>";
        let basic = XmlCodec::new().decode(xml, Charset::Utf8).unwrap();
        assert_eq!(basic, json!({"i": 42, "f": 2.5, "s": "4th"}));
        assert!(basic["i"].is_i64());
        assert!(basic["f"].is_f64());

        let off = XmlCodec::new().number_mode(NumberMode::Off).decode(xml, Charset::Utf8).unwrap();
        assert_eq!(off, json!({"i": "42", "f": "2.5", "s": "4th"}));
    }

    #[test]
    fn test_float_keeps_float_encoding() {
        let xml = encode(&json!({"f": 3.0}));
        assert!(xml.contains("<f>3.0</f>"));
        let back = XmlCodec::new().decode(xml.as_bytes(), Charset::Utf8).unwrap();
        assert!(back["f"].is_f64());
    }

    #[test]
    fn test_empty_containers_and_null() {
        let value = json!({"none": null, "list": [], "dict": {}, "text": ""});
        let xml = encode(&value);
        let back = XmlCodec::new().decode(xml.as_bytes(), Charset::Utf8).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_repeated_siblings_become_list() {
        let back = XmlCodec::new()
            .decode(b"<r><k>a</k><k>b</k><k>c</k></r>", Charset::Utf8)
            .unwrap();
        assert_eq!(back, json!({"k": ["a", "b", "c"]}));
    }

    #[test]
    fn test_numeric_looking_strings_survive() {
        let value = json!({"zip": "02134", "phone": "+358", "code": " 7 ", "ratio": "1.50", "n": 5});
        let xml = encode(&value);
        assert!(xml.contains("<zip type=\"str\">02134</zip>"));
        assert!(xml.contains("<n>5</n>"));
        let back = XmlCodec::new().decode(xml.as_bytes(), Charset::Utf8).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_invalid_element_name() {
        let err = XmlCodec::new().encode(&json!({"1st": 1}), Charset::Utf8).unwrap_err();
        assert!(matches!(err, CodecError::Encode { format: "xml", .. }));
    }

    #[test]
    fn test_malformed_document() {
        assert!(XmlCodec::new().decode(b"<r><a></r>", Charset::Utf8).is_err());
    }
}
