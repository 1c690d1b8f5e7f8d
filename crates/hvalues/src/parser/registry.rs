// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lookup table from primitive types to their parsers.

use super::{ArrayParser, Parser, PrimitiveType, Scalar, ScalarParser};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Form {
    Plain,
    Boxed,
    Array,
}

/// Table of parsers for the supported primitive types.
///
/// Every scalar exists in plain, boxed and array form. Types outside the
/// table are handled by the fallback parser carried by
/// [`PrimitiveType::Text`], unless a parser was registered under their name.
#[derive(Debug)]
pub struct ParserRegistry {
    builtin: HashMap<(Form, Scalar), Arc<dyn Parser>>,
    named: HashMap<String, Arc<dyn Parser>>,
}

impl ParserRegistry {
    /// Registry holding the built-in table only.
    pub fn new() -> Self {
        let mut builtin: HashMap<(Form, Scalar), Arc<dyn Parser>> = HashMap::new();
        for scalar in Scalar::ALL {
            builtin.insert((Form::Plain, scalar), Arc::new(ScalarParser::plain(scalar)));
            builtin.insert((Form::Boxed, scalar), Arc::new(ScalarParser::boxed(scalar)));
            builtin.insert((Form::Array, scalar), Arc::new(ArrayParser::new(scalar)));
        }
        Self {
            builtin,
            named: HashMap::new(),
        }
    }

    /// Override the parser of a [`PrimitiveType::Text`] type by name.
    pub fn register(&mut self, type_name: impl Into<String>, parser: Arc<dyn Parser>) {
        self.named.insert(type_name.into(), parser);
    }

    /// Parser for a primitive type.
    pub fn lookup(&self, ty: &PrimitiveType) -> Arc<dyn Parser> {
        let key = match ty {
            PrimitiveType::Scalar(s) => (Form::Plain, *s),
            PrimitiveType::Optional(s) => (Form::Boxed, *s),
            PrimitiveType::Array(s) => (Form::Array, *s),
            PrimitiveType::Text(text) => {
                return self
                    .named
                    .get(text.name)
                    .cloned()
                    .unwrap_or_else(|| Arc::clone(&text.parser));
            }
        };
        match self.builtin.get(&key) {
            Some(parser) => Arc::clone(parser),
            // Unreachable with the full table; keep a working parser anyway.
            None => match key.0 {
                Form::Plain => Arc::new(ScalarParser::plain(key.1)),
                Form::Boxed => Arc::new(ScalarParser::boxed(key.1)),
                Form::Array => Arc::new(ArrayParser::new(key.1)),
            },
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::value::Value;
    use std::net::Ipv4Addr;

    #[derive(Debug)]
    struct Loopback;

    impl Parser for Loopback {
        fn parse(&self, _text: &str) -> Result<Value, ParseError> {
            Ok(Value::custom(Ipv4Addr::LOCALHOST))
        }

        fn unparse(&self, _value: &Value) -> String {
            "lo".into()
        }
    }

    #[test]
    fn test_table_covers_every_form() {
        let registry = ParserRegistry::new();
        for scalar in Scalar::ALL {
            assert_eq!(
                registry
                    .lookup(&PrimitiveType::Scalar(scalar))
                    .default_value(),
                scalar.zero()
            );
            assert!(registry
                .lookup(&PrimitiveType::Optional(scalar))
                .default_value()
                .is_null());
            assert_eq!(
                registry.lookup(&PrimitiveType::Array(scalar)).default_value(),
                Value::Array(vec![])
            );
        }
    }

    #[test]
    fn test_text_types_fall_back_to_from_str() {
        let registry = ParserRegistry::new();
        let ty = PrimitiveType::text::<Ipv4Addr>();
        let value = registry.lookup(&ty).parse("192.168.1.1").unwrap();
        assert_eq!(
            value.downcast_ref::<Ipv4Addr>(),
            Some(&Ipv4Addr::new(192, 168, 1, 1))
        );
    }

    #[test]
    fn test_registered_parser_overrides_fallback() {
        let mut registry = ParserRegistry::new();
        registry.register("Ipv4Addr", Arc::new(Loopback));
        let ty = PrimitiveType::text::<Ipv4Addr>();
        assert_eq!(registry.lookup(&ty).unparse(&Value::Null), "lo");
    }
}
