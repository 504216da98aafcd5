//! `Accept` header parsing.

use std::cmp::Ordering;
use std::fmt;

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub main_type: String,
    pub subtype: String,
    /// Parameters other than `q`, in declaration order.
    pub params: Vec<(String, String)>,
    /// Preference weight in `[0, 1]`, 1.0 when unspecified.
    pub quality: f32,
}

impl MediaRange {
    /// Parse one comma-separated segment, e.g. `text/xml; level=1; q=0.8`.
    ///
    /// Returns `None` for malformed segments; a lone `*` is read as `*/*`.
    pub fn parse(segment: &str) -> Option<Self> {
        let mut parts = segment.split(';');
        let essence = parts.next()?.trim();
        let (main_type, subtype) = match essence {
            "*" => ("*", "*"),
            _ => essence.split_once('/')?,
        };
        let (main_type, subtype) = (main_type.trim(), subtype.trim());
        if main_type.is_empty() || subtype.is_empty() || (main_type == "*" && subtype != "*") {
            return None;
        }

        let mut params = Vec::new();
        let mut quality = 1.0;
        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part.split_once('=')?;
            let (key, value) = (key.trim(), value.trim().trim_matches('"'));
            if key.eq_ignore_ascii_case("q") {
                let q: f32 = value.parse().ok()?;
                if !q.is_finite() {
                    return None;
                }
                quality = q.clamp(0.0, 1.0);
            } else {
                params.push((key.to_ascii_lowercase(), value.to_string()));
            }
        }

        Some(Self {
            main_type: main_type.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params,
            quality,
        })
    }

    /// `type/subtype` without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main_type, self.subtype)
    }

    pub fn is_full_wildcard(&self) -> bool {
        self.main_type == "*"
    }

    pub fn is_subtype_wildcard(&self) -> bool {
        self.main_type != "*" && self.subtype == "*"
    }

    /// 2 for `type/subtype`, 1 for `type/*`, 0 for `*/*`.
    pub fn specificity(&self) -> u8 {
        if self.is_full_wildcard() {
            0
        } else if self.is_subtype_wildcard() {
            1
        } else {
            2
        }
    }

    /// Most preferred first: higher quality, then the more specific range.
    fn preference(&self, other: &Self) -> Ordering {
        other
            .quality
            .partial_cmp(&self.quality)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.specificity().cmp(&self.specificity()))
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.subtype)?;
        for (key, value) in &self.params {
            write!(f, ";{}={}", key, value)?;
        }
        if self.quality < 1.0 {
            write!(f, ";q={}", self.quality)?;
        }
        Ok(())
    }
}

/// Parse an `Accept` header into media ranges, most preferred first.
///
/// Equal quality ties break on specificity (exact > `type/*` > `*/*`) and
/// then on declaration order. Malformed segments are skipped; an absent or
/// blank header yields an empty list.
pub fn parse_accept(header: Option<&str>) -> Vec<MediaRange> {
    let Some(header) = header else {
        return Vec::new();
    };

    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let range = MediaRange::parse(segment);
            if range.is_none() {
                tracing::debug!(segment = %segment, "Ignoring malformed Accept segment");
            }
            range
        })
        .collect();

    // stable sort keeps declaration order among equals
    ranges.sort_by(MediaRange::preference);
    ranges
}
