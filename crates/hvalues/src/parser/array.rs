// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Parsers for fixed-size scalar arrays.
//!
//! Elements are written joined by `", "` and read back by splitting the
//! trimmed text on commas with surrounding whitespace. Path arrays use the
//! platform path-list separator instead.

use super::scalar::parse_non_empty;
use super::{Parser, Scalar};
use crate::error::ParseError;
use crate::value::Value;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

#[cfg(windows)]
const PATH_LIST_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_LIST_SEPARATOR: &str = ":";

#[allow(clippy::expect_used)] // constant pattern
fn element_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\s*,\s*").expect("valid separator pattern"))
}

/// Parser for an array of scalars.
#[derive(Debug, Clone, Copy)]
pub struct ArrayParser {
    element: Scalar,
}

impl ArrayParser {
    pub const fn new(element: Scalar) -> Self {
        Self { element }
    }

    pub fn element(&self) -> Scalar {
        self.element
    }

    fn parse_element(&self, token: &str) -> Result<Value, ParseError> {
        if token.is_empty() {
            return Ok(self.element.zero());
        }
        parse_non_empty(self.element, token).map_err(|mut e| {
            e.type_name = format!("{}[]", self.element.name());
            e
        })
    }
}

impl Parser for ArrayParser {
    fn parse(&self, text: &str) -> Result<Value, ParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(self.default_value());
        }
        if self.element == Scalar::Path {
            let items = std::env::split_paths(trimmed).map(Value::Path).collect();
            return Ok(Value::Array(items));
        }
        let items = element_separator()
            .split(trimmed)
            .map(|token| self.parse_element(token))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(items))
    }

    fn unparse(&self, value: &Value) -> String {
        match value {
            Value::Array(items) if self.element == Scalar::Path => items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(PATH_LIST_SEPARATOR),
            other => other.to_string(),
        }
    }

    fn default_value(&self) -> Value {
        Value::Array(Vec::new())
    }

    // Element-wise, like a list hash.
    fn hash_code(&self, value: &Value) -> u64 {
        let element = super::ScalarParser::plain(self.element);
        match value {
            Value::Array(items) => items.iter().fold(1u64, |h, item| {
                h.wrapping_mul(31).wrapping_add(element.hash_code(item))
            }),
            Value::Null => 0,
            other => element.hash_code(other),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Array(items) => items.iter().all(|item| self.element.matches(item)),
            _ => false,
        }
    }
}

/// Build a path array value.
pub fn paths<I, P>(items: I) -> Value
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    Value::Array(items.into_iter().map(|p| Value::Path(p.into())).collect())
}
