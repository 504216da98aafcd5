//! Route pattern matching.
//!
//! # Responsibilities
//! - Compile a route's regular expression once, anchored at the path start
//! - Extract named and positional capture groups from a matching path
//!
//! # Design Decisions
//! - Patterns anchor at the start only; a pattern wanting a full match ends
//!   with `$`
//! - Named groups become keyword captures, unnamed groups positional ones
//! - Groups that did not participate in the match are left out

use std::collections::HashMap;

use regex::Regex;

use crate::routing::RouteError;

/// Values captured from the request path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    /// Unnamed groups, in pattern order.
    pub positional: Vec<String>,
    /// Named groups.
    pub named: HashMap<String, String>,
}

impl Captures {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
}

impl RoutePattern {
    pub fn new(pattern: &str) -> Result<Self, RouteError> {
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|e| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match `path`, returning its captures.
    pub fn captures(&self, path: &str) -> Option<Captures> {
        let caps = self.regex.captures(path)?;
        let mut captures = Captures::default();

        // group 0 is the whole match
        for (index, name) in self.regex.capture_names().enumerate().skip(1) {
            let Some(value) = caps.get(index) else {
                continue;
            };
            match name {
                Some(name) => {
                    captures.named.insert(name.to_string(), value.as_str().to_string());
                }
                None => captures.positional.push(value.as_str().to_string()),
            }
        }
        Some(captures)
    }
}
