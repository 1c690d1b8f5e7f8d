// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Parsers for single scalar values.

use super::{Parser, Scalar};
use crate::error::ParseError;
use crate::value::{Value, DATE_FORMAT};
use chrono::NaiveDateTime;
use std::path::PathBuf;

/// Parser for a [`Scalar`], in its plain or boxed form.
#[derive(Debug, Clone, Copy)]
pub struct ScalarParser {
    scalar: Scalar,
    nullable: bool,
}

impl ScalarParser {
    /// Plain form: initialised to the scalar's zero value.
    pub const fn plain(scalar: Scalar) -> Self {
        Self {
            scalar,
            nullable: false,
        }
    }

    /// Boxed form: initialised to absent.
    pub const fn boxed(scalar: Scalar) -> Self {
        Self {
            scalar,
            nullable: true,
        }
    }

    pub fn scalar(&self) -> Scalar {
        self.scalar
    }
}

impl Parser for ScalarParser {
    fn parse(&self, text: &str) -> Result<Value, ParseError> {
        if text.is_empty() {
            return Ok(self.default_value());
        }
        parse_non_empty(self.scalar, text)
    }

    fn unparse(&self, value: &Value) -> String {
        value.to_string()
    }

    fn default_value(&self) -> Value {
        if self.nullable {
            Value::Null
        } else {
            self.scalar.zero()
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_null() || self.scalar.matches(value)
    }
}

/// Parse a non-empty token of the given scalar type.
pub(crate) fn parse_non_empty(scalar: Scalar, text: &str) -> Result<Value, ParseError> {
    let invalid = |reason: &dyn ToString| ParseError::new(scalar.name(), text, reason.to_string());
    let value = match scalar {
        Scalar::Bool => {
            if text.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if text.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                return Err(invalid(&"expected 'true' or 'false'"));
            }
        }
        Scalar::Byte => Value::Byte(text.parse().map_err(|e| invalid(&e))?),
        Scalar::Char => match text.chars().next() {
            Some(c) => Value::Char(c),
            None => scalar.zero(),
        },
        Scalar::Short => Value::Short(text.parse().map_err(|e| invalid(&e))?),
        Scalar::Int => Value::Int(text.parse().map_err(|e| invalid(&e))?),
        Scalar::Long => Value::Long(text.parse().map_err(|e| invalid(&e))?),
        Scalar::Float => Value::Float(text.parse().map_err(|e| invalid(&e))?),
        Scalar::Double => Value::Double(text.parse().map_err(|e| invalid(&e))?),
        Scalar::String => Value::String(text.to_string()),
        Scalar::Path => Value::Path(PathBuf::from(text)),
        Scalar::Date => Value::Date(
            NaiveDateTime::parse_from_str(text, DATE_FORMAT)
                .map_err(|e| invalid(&format!("expected 'YYYY-MM-DD HH:MM:SS.mmm' ({})", e)))?,
        ),
    };
    Ok(value)
}
