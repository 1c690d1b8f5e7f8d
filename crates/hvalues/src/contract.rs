// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Contract declarations.
//!
//! A contract is a Rust type that describes a structured value by returning
//! an ordered list of accessor declarations from [`Contract::declare`]. The
//! declaration is plain data: the descriptor registry turns it into a
//! [`TypeDescriptor`](crate::TypeDescriptor) once per process.
//!
//! ```
//! use hvalues::{AccessorDecl, Contract, ContractDecl, PrimitiveType, Scalar};
//!
//! struct Point;
//!
//! impl Contract for Point {
//!     fn declare() -> ContractDecl {
//!         ContractDecl::new()
//!             .primitive("x", PrimitiveType::Scalar(Scalar::Int))
//!             .primitive("y", PrimitiveType::Scalar(Scalar::Int))
//!             .accessor(
//!                 AccessorDecl::primitive("label", PrimitiveType::Scalar(Scalar::String))
//!                     .default_value("origin"),
//!             )
//!     }
//! }
//! ```

use crate::parser::{short_type_name, Parser, PrimitiveType};
use crate::value::{IntoValue, Value};
use std::any::TypeId;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A declared structured-value type.
pub trait Contract: 'static {
    /// Ordered accessor declarations and super-contracts.
    fn declare() -> ContractDecl;
}

/// Identity of a contract, usable without its type parameter.
#[derive(Clone, Copy)]
pub struct ContractRef {
    id: TypeId,
    type_name: &'static str,
    declare: fn() -> ContractDecl,
}

impl ContractRef {
    pub fn of<C: Contract>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            type_name: std::any::type_name::<C>(),
            declare: C::declare,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Unqualified type name.
    pub fn name(&self) -> &'static str {
        short_type_name(self.type_name)
    }

    /// Fully qualified type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Fresh copy of the contract's declaration.
    pub fn declaration(&self) -> ContractDecl {
        (self.declare)()
    }

    /// Whether `other` extends this contract, directly or transitively.
    pub fn is_ancestor_of(&self, other: &ContractRef) -> bool {
        let mut seen = HashSet::new();
        let mut pending = other.declaration().extends;
        while let Some(next) = pending.pop() {
            if next.id == self.id {
                return true;
            }
            if seen.insert(next.id) {
                pending.extend(next.declaration().extends);
            }
        }
        false
    }
}

impl PartialEq for ContractRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ContractRef {}

impl Hash for ContractRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ContractRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractRef({})", self.name())
    }
}

/// Declaration of a contract: super-contracts and own accessors.
#[derive(Debug, Clone, Default)]
pub struct ContractDecl {
    pub(crate) extends: Vec<ContractRef>,
    pub(crate) accessors: Vec<AccessorDecl>,
}

impl ContractDecl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inherit all accessors of `C`.
    pub fn extends<C: Contract>(mut self) -> Self {
        self.extends.push(ContractRef::of::<C>());
        self
    }

    /// Add an accessor declaration.
    pub fn accessor(mut self, decl: AccessorDecl) -> Self {
        self.accessors.push(decl);
        self
    }

    /// Add a primitive accessor without directives.
    pub fn primitive(self, name: &'static str, ty: PrimitiveType) -> Self {
        self.accessor(AccessorDecl::primitive(name, ty))
    }

    /// Add a nested value accessor without directives.
    pub fn value<C: Contract>(self, name: &'static str) -> Self {
        self.accessor(AccessorDecl::value::<C>(name))
    }

    /// Add a list accessor without directives.
    pub fn list<C: Contract>(self, name: &'static str) -> Self {
        self.accessor(AccessorDecl::list::<C>(name))
    }

    /// Add an index accessor keyed by `index_property` of `C`.
    pub fn index<C: Contract>(self, name: &'static str, index_property: &'static str) -> Self {
        self.accessor(AccessorDecl::index::<C>(name).index_property(index_property))
    }

    /// Add a reference accessor.
    pub fn reference<C: Contract>(self, name: &'static str) -> Self {
        self.accessor(AccessorDecl::value::<C>(name).as_reference())
    }

    pub fn super_contracts(&self) -> &[ContractRef] {
        &self.extends
    }

    pub fn accessors(&self) -> &[AccessorDecl] {
        &self.accessors
    }
}

/// Declared return type of an accessor.
#[derive(Debug, Clone)]
pub enum DeclaredType {
    Primitive(PrimitiveType),
    /// A single nested contract value.
    Contract(ContractRef),
    /// Ordered sequence of contract values.
    List(ContractRef),
    /// Key to contract value mapping.
    Map(ContractRef),
}

/// Explicit default value directive.
#[derive(Clone)]
pub enum DefaultValue {
    /// A fixed primitive value.
    Constant(Value),
    /// Computed anew for each instance.
    With(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Self::With(_) => f.write_str("With(<fn>)"),
        }
    }
}

/// One accessor of a contract with its directives.
#[derive(Debug, Clone)]
pub struct AccessorDecl {
    pub(crate) accessor: &'static str,
    pub(crate) declared: DeclaredType,
    pub(crate) name: Option<String>,
    pub(crate) parser: Option<Arc<dyn Parser>>,
    pub(crate) reference: bool,
    pub(crate) index_property: Option<String>,
    pub(crate) default: Option<DefaultValue>,
}

impl AccessorDecl {
    pub fn new(accessor: &'static str, declared: DeclaredType) -> Self {
        Self {
            accessor,
            declared,
            name: None,
            parser: None,
            reference: false,
            index_property: None,
            default: None,
        }
    }

    pub fn primitive(accessor: &'static str, ty: PrimitiveType) -> Self {
        Self::new(accessor, DeclaredType::Primitive(ty))
    }

    pub fn value<C: Contract>(accessor: &'static str) -> Self {
        Self::new(accessor, DeclaredType::Contract(ContractRef::of::<C>()))
    }

    pub fn list<C: Contract>(accessor: &'static str) -> Self {
        Self::new(accessor, DeclaredType::List(ContractRef::of::<C>()))
    }

    pub fn index<C: Contract>(accessor: &'static str) -> Self {
        Self::new(accessor, DeclaredType::Map(ContractRef::of::<C>()))
    }

    /// Property name used instead of the accessor name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Treat the property as primitive with a custom codec.
    pub fn parser(mut self, parser: impl Parser + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Non-owning link instead of containment.
    pub fn as_reference(mut self) -> Self {
        self.reference = true;
        self
    }

    /// Property of the content contract that keys an index.
    pub fn index_property(mut self, name: impl Into<String>) -> Self {
        self.index_property = Some(name.into());
        self
    }

    /// Constant initial value of a primitive property.
    pub fn default_value(mut self, value: impl IntoValue) -> Self {
        self.default = Some(DefaultValue::Constant(value.into_value()));
        self
    }

    /// Initial value computed for each new instance.
    pub fn initializer<F>(mut self, init: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::With(Arc::new(init)));
        self
    }

    /// Effective property name.
    pub fn property_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.accessor)
    }

    pub fn accessor_name(&self) -> &'static str {
        self.accessor
    }

    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Scalar;

    struct Base;
    struct Middle;
    struct Leaf;
    struct Unrelated;

    impl Contract for Base {
        fn declare() -> ContractDecl {
            ContractDecl::new().primitive("id", PrimitiveType::Scalar(Scalar::Int))
        }
    }

    impl Contract for Middle {
        fn declare() -> ContractDecl {
            ContractDecl::new().extends::<Base>()
        }
    }

    impl Contract for Leaf {
        fn declare() -> ContractDecl {
            ContractDecl::new()
                .extends::<Middle>()
                .accessor(AccessorDecl::primitive("getLabel", PrimitiveType::Optional(Scalar::String)).named("label"))
        }
    }

    impl Contract for Unrelated {
        fn declare() -> ContractDecl {
            ContractDecl::new()
        }
    }

    #[test]
    fn test_ancestry_is_transitive_and_strict() {
        let base = ContractRef::of::<Base>();
        let leaf = ContractRef::of::<Leaf>();
        assert!(base.is_ancestor_of(&leaf));
        assert!(ContractRef::of::<Middle>().is_ancestor_of(&leaf));
        assert!(!leaf.is_ancestor_of(&base));
        assert!(!base.is_ancestor_of(&base));
        assert!(!ContractRef::of::<Unrelated>().is_ancestor_of(&leaf));
    }

    #[test]
    fn test_explicit_name_overrides_accessor_name() {
        let decl = Leaf::declare();
        let accessor = &decl.accessors()[0];
        assert_eq!(accessor.accessor_name(), "getLabel");
        assert_eq!(accessor.property_name(), "label");
    }

    #[test]
    fn test_contract_ref_identity() {
        assert_eq!(ContractRef::of::<Base>(), ContractRef::of::<Base>());
        assert_ne!(ContractRef::of::<Base>(), ContractRef::of::<Leaf>());
        assert_eq!(ContractRef::of::<Leaf>().name(), "Leaf");
    }
}
