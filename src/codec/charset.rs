//! Character set handling for text-based wire formats.
//!
//! Codecs work on text internally; the charset decides how that text maps
//! to and from the bytes that travel over the wire.

use std::fmt;
use std::str::FromStr;

use crate::codec::CodecError;

/// Character sets the codecs can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Ascii,
    Latin1,
}

impl Charset {
    /// Canonical label, as used in XML declarations and config files.
    pub fn name(self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Ascii => "us-ascii",
            Charset::Latin1 => "iso-8859-1",
        }
    }

    /// Resolve a charset label (case-insensitive, surrounding quotes allowed).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().trim_matches('"').to_ascii_lowercase();
        match label.as_str() {
            "utf-8" | "utf8" => Some(Charset::Utf8),
            "us-ascii" | "ascii" => Some(Charset::Ascii),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Some(Charset::Latin1),
            _ => None,
        }
    }

    /// Decode raw bytes into text.
    pub fn decode(self, bytes: &[u8]) -> Result<String, CodecError> {
        match self {
            Charset::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|_| CodecError::InvalidText { charset: self }),
            Charset::Ascii => {
                if bytes.is_ascii() {
                    // ASCII is a strict subset of UTF-8
                    Ok(String::from_utf8_lossy(bytes).into_owned())
                } else {
                    Err(CodecError::InvalidText { charset: self })
                }
            }
            Charset::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    /// Encode text into bytes, failing on characters the charset cannot represent.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, CodecError> {
        match self {
            Charset::Utf8 => Ok(text.as_bytes().to_vec()),
            Charset::Ascii => {
                if text.is_ascii() {
                    Ok(text.as_bytes().to_vec())
                } else {
                    Err(CodecError::Unrepresentable { charset: self })
                }
            }
            Charset::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).map_err(|_| CodecError::Unrepresentable { charset: self }))
                .collect(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Charset::from_label(s).ok_or_else(|| CodecError::UnsupportedCharset(s.to_string()))
    }
}

/// Extract the `charset` parameter from a `Content-Type` value.
///
/// `application/json; charset=UTF-8` → `Some("UTF-8")`.
pub fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}
