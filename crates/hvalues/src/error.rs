// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for contract resolution, value access and decoding.

use thiserror::Error;

/// A malformed contract declaration.
///
/// Raised once, when the contract is resolved into a
/// [`TypeDescriptor`](crate::TypeDescriptor). A contract that fails to
/// resolve never yields a usable descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("property name '{property}' is not unique in contract '{contract}'")]
    DuplicateProperty { contract: String, property: String },

    #[error("indexed property '{contract}.{property}' requires an index property directive")]
    MissingIndexProperty { contract: String, property: String },

    #[error(
        "index property '{index_property}' of '{contract}.{property}' is not a property of '{content}'"
    )]
    UnknownIndexProperty {
        contract: String,
        property: String,
        content: String,
        index_property: String,
    },

    #[error(
        "index property '{content}.{index_property}' of '{contract}.{property}' must be a primitive property"
    )]
    IndexPropertyNotPrimitive {
        contract: String,
        property: String,
        content: String,
        index_property: String,
    },

    #[error("primitive property '{contract}.{property}' must not be marked as reference")]
    PrimitiveReference { contract: String, property: String },

    #[error("unsupported default value for property '{contract}.{property}'")]
    UnsupportedDefault { contract: String, property: String },
}

/// Malformed primitive text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {type_name} value '{text}': {reason}")]
pub struct ParseError {
    pub type_name: String,
    pub text: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(
        type_name: impl Into<String>,
        text: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            text: text.into(),
            reason: reason.to_string(),
        }
    }
}

/// Misuse of the accessor interface of a [`ValueInstance`](crate::ValueInstance).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("contract '{contract}' has no property '{property}'")]
    UnknownProperty { contract: String, property: String },

    #[error("property '{property}' does not accept {got}")]
    TypeMismatch { property: String, got: String },

    #[error("property '{property}' holds no value")]
    Absent { property: String },

    #[error("property '{property}' is {actual}, expected {expected}")]
    KindMismatch {
        property: String,
        expected: String,
        actual: String,
    },
}

/// Failure while decoding a flat key-value store into a value tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("cannot decode key '{key}': {source}")]
    Parse {
        key: String,
        #[source]
        source: ParseError,
    },

    #[error("cannot decode key '{key}': {source}")]
    Value {
        key: String,
        #[source]
        source: ValueError,
    },

    #[error("count key '{key}' claims {count} entries, more than the store holds")]
    Count { key: String, count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_mentions_uniqueness() {
        let err = ContractError::DuplicateProperty {
            contract: "NonUniqueNames".into(),
            property: "xxx".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("unique"));
        assert!(msg.contains("xxx"));
    }

    #[test]
    fn test_decode_error_keeps_key_and_source() {
        let err = DecodeError::Parse {
            key: "app.when".into(),
            source: ParseError::new("date", "yesterday", "bad pattern"),
        };
        let msg = err.to_string();
        assert!(msg.contains("app.when"));
        assert!(msg.contains("yesterday"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
