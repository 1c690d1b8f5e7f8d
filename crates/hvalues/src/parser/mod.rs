// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! String codecs for primitive properties.
//!
//! Every primitive content type has a stateless [`Parser`] that converts
//! between a slot [`Value`] and its flat string form. The empty string is
//! reserved for "no value": `parse("")` yields the parser's default value and
//! `unparse(Null)` yields `""`.

mod array;
mod registry;
mod scalar;
mod text;

pub use array::{paths, ArrayParser};
pub use registry::ParserRegistry;
pub use scalar::ScalarParser;
pub use text::TextParser;

use crate::error::ParseError;
use crate::value::{Opaque, Value};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// Codec between a primitive slot value and its string form.
pub trait Parser: fmt::Debug + Send + Sync {
    /// Load a value from its string form. `""` yields [`Parser::default_value`].
    fn parse(&self, text: &str) -> Result<Value, ParseError>;

    /// String form of a value. `Null` yields `""`.
    fn unparse(&self, value: &Value) -> String;

    /// Initial value of a property that declares no default of its own.
    fn default_value(&self) -> Value {
        Value::Null
    }

    /// Equality used when comparing whole instances.
    fn equals(&self, a: &Value, b: &Value) -> bool {
        a == b
    }

    /// Hash consistent with [`Parser::equals`].
    fn hash_code(&self, value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    /// Whether a slot governed by this parser may hold `value`.
    fn accepts(&self, _value: &Value) -> bool {
        true
    }
}

/// Atomic primitive types with a built-in parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Bool,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Path,
    Date,
}

impl Scalar {
    pub const ALL: [Scalar; 11] = [
        Scalar::Bool,
        Scalar::Byte,
        Scalar::Char,
        Scalar::Short,
        Scalar::Int,
        Scalar::Long,
        Scalar::Float,
        Scalar::Double,
        Scalar::String,
        Scalar::Path,
        Scalar::Date,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Path => "path",
            Self::Date => "date",
        }
    }

    /// Canonical zero value. Paths and dates have none.
    // @audit-ok: Simple pattern matching - default value dispatch table
    pub fn zero(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Byte => Value::Byte(0),
            Self::Char => Value::Char('\0'),
            Self::Short => Value::Short(0),
            Self::Int => Value::Int(0),
            Self::Long => Value::Long(0),
            Self::Float => Value::Float(0.0),
            Self::Double => Value::Double(0.0),
            Self::String => Value::String(String::new()),
            Self::Path | Self::Date => Value::Null,
        }
    }

    /// Whether `value` is a non-null value of this scalar type.
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Bool, Value::Bool(_))
                | (Self::Byte, Value::Byte(_))
                | (Self::Char, Value::Char(_))
                | (Self::Short, Value::Short(_))
                | (Self::Int, Value::Int(_))
                | (Self::Long, Value::Long(_))
                | (Self::Float, Value::Float(_))
                | (Self::Double, Value::Double(_))
                | (Self::String, Value::String(_))
                | (Self::Path, Value::Path(_))
                | (Self::Date, Value::Date(_))
        )
    }
}

/// Declared type of a primitive property.
#[derive(Debug, Clone)]
pub enum PrimitiveType {
    /// Scalar initialised to its zero value.
    Scalar(Scalar),
    /// Boxed scalar initialised to absent.
    Optional(Scalar),
    /// Array of scalars initialised to an empty array.
    Array(Scalar),
    /// Any other type with a textual round-trip.
    Text(TextType),
}

impl PrimitiveType {
    /// A type parsed with [`FromStr`] and written with `Display`.
    pub fn text<T>() -> Self
    where
        T: Opaque + FromStr + fmt::Display,
        T::Err: fmt::Display,
    {
        Self::Text(TextType {
            name: short_type_name(std::any::type_name::<T>()),
            parser: Arc::new(TextParser::<T>::new()),
        })
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> String {
        match self {
            Self::Scalar(s) => s.name().to_string(),
            Self::Optional(s) => format!("{}?", s.name()),
            Self::Array(s) => format!("{}[]", s.name()),
            Self::Text(t) => t.name.to_string(),
        }
    }
}

impl PartialEq for PrimitiveType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b))
            | (Self::Optional(a), Self::Optional(b))
            | (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a.name == b.name,
            _ => false,
        }
    }
}

/// A primitive type outside the built-in table, with its fallback parser.
#[derive(Debug, Clone)]
pub struct TextType {
    pub name: &'static str,
    pub parser: Arc<dyn Parser>,
}

pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
