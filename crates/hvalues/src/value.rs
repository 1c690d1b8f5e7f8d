// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Slot values.
//!
//! A [`Value`] is what one slot of a [`ValueInstance`] holds: a primitive, an
//! opaque custom value handled by a custom parser, a nested instance, a list
//! or index of nested instances, or a non-owning reference.

use crate::instance::{ValueIndex, ValueInstance};
use chrono::NaiveDateTime;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

/// Text pattern of date primitives.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// An instance that can be the target of a `REFERENCE` property.
pub type SharedInstance = Arc<RwLock<ValueInstance>>;

/// A value that can occupy a slot.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value.
    Null,

    // Primitives
    Bool(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Path(PathBuf),
    Date(NaiveDateTime),
    /// Fixed-size array primitive.
    Array(Vec<Value>),
    /// Value of a type only known to its custom parser.
    Custom(CustomValue),

    // Containment
    Object(Box<ValueInstance>),
    List(Vec<ValueInstance>),
    Index(ValueIndex),

    /// Non-owning link.
    Reference(ValueRef),
}

impl Value {
    /// Wrap a custom value.
    pub fn custom<T: Opaque>(value: T) -> Self {
        Self::Custom(CustomValue::new(value))
    }

    /// Wrap a nested instance.
    pub fn object(instance: ValueInstance) -> Self {
        Self::Object(Box::new(instance))
    }

    /// Non-owning link to a shared instance.
    pub fn reference(target: &SharedInstance) -> Self {
        Self::Reference(ValueRef::to(target))
    }

    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Char(_) => "char",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Path(_) => "path",
            Self::Date(_) => "date",
            Self::Array(_) => "array",
            Self::Custom(_) => "custom value",
            Self::Object(_) => "value",
            Self::List(_) => "list",
            Self::Index(_) => "index",
            Self::Reference(_) => "reference",
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as array elements.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as nested instance.
    pub fn as_object(&self) -> Option<&ValueInstance> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as mutable nested instance.
    pub fn as_object_mut(&mut self) -> Option<&mut ValueInstance> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as list.
    pub fn as_list(&self) -> Option<&[ValueInstance]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as index.
    pub fn as_index(&self) -> Option<&ValueIndex> {
        match self {
            Self::Index(v) => Some(v),
            _ => None,
        }
    }

    /// Downcast a custom value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Custom(v) => v.downcast_ref(),
            _ => None,
        }
    }
}

// Float slots compare by bit pattern so that `Value` can be a map key.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Index(a), Self::Index(b)) => a == b,
            (Self::Reference(a), Self::Reference(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(v) => v.hash(state),
            Self::Byte(v) => v.hash(state),
            Self::Char(v) => v.hash(state),
            Self::Short(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::Long(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Double(v) => v.to_bits().hash(state),
            Self::String(v) => v.hash(state),
            Self::Path(v) => v.hash(state),
            Self::Date(v) => v.hash(state),
            Self::Array(v) => v.hash(state),
            Self::Custom(v) => v.hash(state),
            Self::Object(v) => v.hash(state),
            Self::List(v) => v.hash(state),
            Self::Index(v) => v.hash(state),
            Self::Reference(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Byte(v) => write!(f, "{}", v),
            Self::Char(v) => write!(f, "{}", v),
            Self::Short(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => f.write_str(v),
            Self::Path(v) => write!(f, "{}", v.display()),
            Self::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            Self::Array(items) => {
                for (n, item) in items.iter().enumerate() {
                    if n > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Self::Custom(v) => write!(f, "{:?}", v.0),
            Self::Object(v) => write!(f, "{}{{..}}", v.descriptor().name()),
            Self::List(v) => write!(f, "[{} entries]", v.len()),
            Self::Index(v) => write!(f, "{{{} entries}}", v.len()),
            Self::Reference(_) => f.write_str("<reference>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Custom values
// ---------------------------------------------------------------------------

/// A type that can be stored as a [`Value::Custom`].
///
/// Implemented for every `Debug + PartialEq + Hash` type that is
/// `Send + Sync + 'static`.
pub trait Opaque: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn Opaque) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T> Opaque for T
where
    T: Any + fmt::Debug + PartialEq + Hash + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Opaque) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

/// Shared handle to a custom value.
#[derive(Clone)]
pub struct CustomValue(Arc<dyn Opaque>);

impl CustomValue {
    pub fn new<T: Opaque>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(other.0.as_ref())
    }
}

impl Eq for CustomValue {}

impl Hash for CustomValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.dyn_hash(state);
    }
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// Weak link to a [`SharedInstance`]. Compares by identity.
#[derive(Clone)]
pub struct ValueRef(Weak<RwLock<ValueInstance>>);

impl ValueRef {
    pub fn to(target: &SharedInstance) -> Self {
        Self(Arc::downgrade(target))
    }

    /// The target, if it is still alive.
    pub fn upgrade(&self) -> Option<SharedInstance> {
        self.0.upgrade()
    }

    /// Whether this link points to `target`.
    pub fn points_to(&self, target: &SharedInstance) -> bool {
        std::ptr::eq(self.0.as_ptr(), Arc::as_ptr(target))
    }
}

impl fmt::Debug for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.strong_count() > 0 {
            write!(f, "ValueRef({:p})", self.0.as_ptr())
        } else {
            f.write_str("ValueRef(<dropped>)")
        }
    }
}

impl PartialEq for ValueRef {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ValueRef {}

impl Hash for ValueRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.0.as_ptr(), state);
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Trait for reading a typed value out of a slot.
pub trait FromValue: Sized {
    /// `None` if the slot holds a value of another type.
    fn from_value(value: &Value) -> Option<Self>;
}

/// Trait for converting a typed value into a slot value.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

macro_rules! impl_primitive_conversions {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

impl_primitive_conversions!(bool, Bool);
impl_primitive_conversions!(i8, Byte);
impl_primitive_conversions!(char, Char);
impl_primitive_conversions!(i16, Short);
impl_primitive_conversions!(i32, Int);
impl_primitive_conversions!(i64, Long);
impl_primitive_conversions!(f32, Float);
impl_primitive_conversions!(f64, Double);
impl_primitive_conversions!(String, String);
impl_primitive_conversions!(PathBuf, Path);
impl_primitive_conversions!(NaiveDateTime, Date);
impl_primitive_conversions!(ValueIndex, Index);

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoValue for &Path {
    fn into_value(self) -> Value {
        Value::Path(self.to_path_buf())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for ValueInstance {
    fn into_value(self) -> Value {
        Value::object(self)
    }
}

impl IntoValue for &SharedInstance {
    fn into_value(self) -> Value {
        Value::reference(self)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(IntoValue::into_value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[derive(Debug, PartialEq, Hash)]
    struct Rgb(u8, u8, u8);

    #[test]
    fn test_primitive_conversions() {
        let v = 42i32.into_value();
        assert_eq!(i32::from_value(&v), Some(42));
        assert_eq!(i64::from_value(&v), None);

        let v = "hello".into_value();
        assert_eq!(v.as_str(), Some("hello"));
        assert_eq!(String::from_value(&v).as_deref(), Some("hello"));
    }

    #[test]
    fn test_optional_conversions() {
        assert_eq!(Option::<i32>::from_value(&Value::Null), Some(None));
        assert_eq!(Option::<i32>::from_value(&Value::Int(3)), Some(Some(3)));
        assert_eq!(None::<i32>.into_value(), Value::Null);
    }

    #[test]
    fn test_array_conversions() {
        let v = vec![1i16, 2, 3].into_value();
        assert_eq!(v.as_array().map(<[Value]>::len), Some(3));
        assert_eq!(Vec::<i16>::from_value(&v), Some(vec![1, 2, 3]));
        assert_eq!(Vec::<i32>::from_value(&v), None);
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_eq!(hash_of(&Value::Double(1.5)), hash_of(&Value::Double(1.5)));
    }

    #[test]
    fn test_custom_values_compare_by_content_and_type() {
        let a = Value::custom(Rgb(1, 2, 3));
        let b = Value::custom(Rgb(1, 2, 3));
        let c = Value::custom(Rgb(3, 2, 1));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Value::custom((1u8, 2u8, 3u8)));
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a.downcast_ref::<Rgb>(), Some(&Rgb(1, 2, 3)));
    }

    #[test]
    fn test_display_of_primitives() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(
            Value::Array(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "1, 2"
        );
    }
}
