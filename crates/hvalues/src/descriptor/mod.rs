// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Resolved property and type descriptors.
//!
//! A [`TypeDescriptor`] is the resolved form of one contract: its ordered
//! [`PropertyDescriptor`]s and the factory for fully initialised
//! [`ValueInstance`]s. Descriptors are produced by the
//! [`DescriptorRegistry`](crate::DescriptorRegistry) and are immutable once
//! published.

mod resolve;

pub(crate) use resolve::Session;

use crate::contract::ContractRef;
use crate::instance::{ValueIndex, ValueInstance};
use crate::parser::Parser;
use crate::value::{SharedInstance, Value};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Structural role of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Atomic value governed by a parser.
    Primitive,
    /// Owned nested value.
    Value,
    /// Owned ordered sequence of nested values.
    List,
    /// Owned mapping from a key property to nested values.
    Index,
    /// Non-owning link, never serialized.
    Reference,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Primitive => "PRIMITIVE",
            Self::Value => "VALUE",
            Self::List => "LIST",
            Self::Index => "INDEX",
            Self::Reference => "REFERENCE",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a slot obtains its initial value.
#[derive(Clone)]
pub(crate) enum Initializer {
    Absent,
    Parser(Arc<dyn Parser>),
    Constant(Value),
    Custom(Arc<dyn Fn() -> Value + Send + Sync>),
    NewValue(Arc<TypeDescriptor>),
    NewList,
    NewIndex,
}

impl fmt::Debug for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Parser(p) => f.debug_tuple("Parser").field(p).finish(),
            Self::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
            Self::NewValue(d) => write!(f, "NewValue({})", d.name()),
            Self::NewList => f.write_str("NewList"),
            Self::NewIndex => f.write_str("NewIndex"),
        }
    }
}

/// Resolved metadata of one property.
pub struct PropertyDescriptor {
    pub(crate) name: String,
    pub(crate) index: usize,
    pub(crate) kind: Kind,
    pub(crate) owner: ContractRef,
    pub(crate) parser: Option<Arc<dyn Parser>>,
    pub(crate) content: Option<Arc<TypeDescriptor>>,
    pub(crate) index_property: Option<usize>,
    pub(crate) initializer: Initializer,
}

impl PropertyDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slot position within the owning instance.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Contract that declared the kept accessor.
    pub fn owner(&self) -> ContractRef {
        self.owner
    }

    /// Codec of a `PRIMITIVE` property.
    pub fn parser(&self) -> Option<&Arc<dyn Parser>> {
        self.parser.as_ref()
    }

    /// Content type of a `VALUE`, `LIST`, `INDEX` or `REFERENCE` property.
    pub fn content(&self) -> Option<&Arc<TypeDescriptor>> {
        self.content.as_ref()
    }

    /// Property of the content type that keys an `INDEX` property.
    pub fn index_property(&self) -> Option<&PropertyDescriptor> {
        let pos = self.index_property?;
        self.content.as_ref()?.properties().get(pos)
    }

    /// Fresh initial value.
    pub fn initial_value(&self) -> Value {
        self.initial_value_on(&mut Vec::new())
    }

    fn initial_value_on(&self, path: &mut Vec<TypeId>) -> Value {
        match &self.initializer {
            Initializer::Absent => Value::Null,
            Initializer::Parser(parser) => parser.default_value(),
            Initializer::Constant(value) => value.clone(),
            Initializer::Custom(init) => init(),
            Initializer::NewValue(content) => {
                // Cut the containment cycle here.
                if path.contains(&content.contract.id()) {
                    Value::Null
                } else {
                    Value::object(content.build_instance(path))
                }
            }
            Initializer::NewList => Value::List(Vec::new()),
            Initializer::NewIndex => Value::Index(ValueIndex::new()),
        }
    }

    /// Whether a slot of this property may hold `value`.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self.kind, value) {
            (_, Value::Null) => true,
            (Kind::Primitive, v) => self.parser.as_ref().is_some_and(|p| p.accepts(v)),
            (Kind::Value, Value::Object(inst)) => self.is_content(inst),
            (Kind::List, Value::List(items)) => items.iter().all(|i| self.is_content(i)),
            (Kind::Index, Value::Index(index)) => index.values().all(|i| self.is_content(i)),
            (Kind::Reference, Value::Reference(link)) => match link.upgrade() {
                Some(target) => self.is_shared_content(&target),
                None => true,
            },
            _ => false,
        }
    }

    fn is_content(&self, instance: &ValueInstance) -> bool {
        self.content
            .as_ref()
            .is_some_and(|content| content.is_assignable_from(&instance.descriptor().contract))
    }

    fn is_shared_content(&self, target: &SharedInstance) -> bool {
        // The target may be locked by the caller, e.g. a self link.
        match target.try_read() {
            Some(instance) => self.is_content(&instance),
            None => true,
        }
    }

    /// Whether this property takes part in the flat serialization.
    pub fn is_serialized(&self) -> bool {
        self.kind != Kind::Reference
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("kind", &self.kind)
            .field("owner", &self.owner)
            .field("content", &self.content.as_ref().map(|c| c.name()))
            .field("index_property", &self.index_property)
            .finish()
    }
}

/// Resolved metadata of one contract.
pub struct TypeDescriptor {
    pub(crate) contract: ContractRef,
    layout: OnceLock<HashMap<String, usize>>,
    properties: OnceLock<Vec<PropertyDescriptor>>,
}

impl TypeDescriptor {
    /// Allocated but not yet resolved descriptor.
    pub(crate) fn placeholder(contract: ContractRef) -> Self {
        Self {
            contract,
            layout: OnceLock::new(),
            properties: OnceLock::new(),
        }
    }

    pub fn contract(&self) -> ContractRef {
        self.contract
    }

    /// Unqualified contract name.
    pub fn name(&self) -> &'static str {
        self.contract.name()
    }

    /// Properties in declaration order, ancestors first.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        self.properties.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        let pos = *self.layout.get()?.get(name)?;
        self.properties.get()?.get(pos)
    }

    pub fn len(&self) -> usize {
        self.properties().len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties().is_empty()
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.properties.get().is_some()
    }

    /// Slot position of a property name; known before the properties are.
    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.layout.get()?.get(name).copied()
    }

    pub(crate) fn set_layout(&self, layout: HashMap<String, usize>) {
        let _ = self.layout.set(layout);
    }

    pub(crate) fn set_properties(&self, properties: Vec<PropertyDescriptor>) {
        let _ = self.properties.set(properties);
    }

    /// Whether instances of `contract` may be stored where this type is expected.
    pub fn is_assignable_from(&self, contract: &ContractRef) -> bool {
        self.contract == *contract || self.contract.is_ancestor_of(contract)
    }

    /// Construct an instance with every slot at its initial value.
    ///
    /// `VALUE` slots hold fresh nested instances, except where the nested
    /// contract is already under construction on the current path (a contract
    /// containing itself); that slot starts absent.
    pub fn new_instance(self: &Arc<Self>) -> ValueInstance {
        self.build_instance(&mut Vec::new())
    }

    fn build_instance(self: &Arc<Self>, path: &mut Vec<TypeId>) -> ValueInstance {
        path.push(self.contract.id());
        let slots = self
            .properties()
            .iter()
            .map(|p| p.initial_value_on(path))
            .collect();
        path.pop();
        ValueInstance::from_slots(Arc::clone(self), slots)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("contract", &self.contract)
            .field("properties", &self.properties())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Contract, ContractDecl};
    use crate::parser::{PrimitiveType, Scalar};
    use crate::registry::DescriptorRegistry;

    struct Node;

    impl Contract for Node {
        fn declare() -> ContractDecl {
            ContractDecl::new()
                .primitive("label", PrimitiveType::Scalar(Scalar::String))
                .value::<Node>("next")
                .list::<Node>("children")
        }
    }

    #[test]
    fn test_self_containing_value_starts_absent() {
        let registry = DescriptorRegistry::new();
        let node = registry.resolve::<Node>().unwrap();
        let inst = node.new_instance();
        assert!(inst.get("next").unwrap().is_null());
        assert_eq!(inst.get("children").unwrap(), &Value::List(vec![]));
        assert_eq!(inst.get("label").unwrap(), &Value::String(String::new()));
    }

    #[test]
    fn test_initial_value_of_cyclic_property_terminates() {
        let registry = DescriptorRegistry::new();
        let node = registry.resolve::<Node>().unwrap();
        let next = node.property("next").unwrap();
        assert_eq!(next.kind(), Kind::Value);
        let value = next.initial_value();
        let nested = value.as_object().expect("substitute is materialised");
        assert!(nested.get("next").unwrap().is_null());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::Index.to_string(), "INDEX");
    }
}
