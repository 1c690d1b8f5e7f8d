// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fallback parser for types with their own textual round-trip.

use super::{short_type_name, Parser};
use crate::error::ParseError;
use crate::value::{Opaque, Value};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Parser for any `T: FromStr + Display`, stored as [`Value::Custom`].
///
/// Initialised to absent.
pub struct TextParser<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TextParser<T> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TextParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TextParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextParser<{}>", std::any::type_name::<T>())
    }
}

impl<T> Parser for TextParser<T>
where
    T: Opaque + FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    fn parse(&self, text: &str) -> Result<Value, ParseError> {
        if text.is_empty() {
            return Ok(Value::Null);
        }
        T::from_str(text)
            .map(Value::custom)
            .map_err(|e| ParseError::new(short_type_name(std::any::type_name::<T>()), text, e))
    }

    fn unparse(&self, value: &Value) -> String {
        match value.downcast_ref::<T>() {
            Some(v) => v.to_string(),
            None => value.to_string(),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        value.is_null() || value.downcast_ref::<T>().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_round_trip_through_from_str() {
        let parser = TextParser::<Ipv4Addr>::new();
        let value = parser.parse("10.0.0.1").unwrap();
        assert_eq!(value.downcast_ref::<Ipv4Addr>(), Some(&Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(parser.unparse(&value), "10.0.0.1");
    }

    #[test]
    fn test_empty_is_absent() {
        let parser = TextParser::<Ipv4Addr>::new();
        assert!(parser.parse("").unwrap().is_null());
        assert_eq!(parser.unparse(&Value::Null), "");
    }

    #[test]
    fn test_error_names_type() {
        let err = TextParser::<Ipv4Addr>::new().parse("nope").unwrap_err();
        assert_eq!(err.type_name, "Ipv4Addr");
        assert_eq!(err.text, "nope");
    }

    #[test]
    fn test_accepts_only_own_type() {
        let parser = TextParser::<Ipv4Addr>::new();
        assert!(parser.accepts(&Value::custom(Ipv4Addr::LOCALHOST)));
        assert!(!parser.accepts(&Value::String("127.0.0.1".into())));
    }
}
