// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values of resolved contracts.
//!
//! A [`ValueInstance`] holds one slot per property of its
//! [`TypeDescriptor`], addressed by the property's descriptor index. Slots are
//! reachable through the generic [`ValueInstance::value`] /
//! [`ValueInstance::put_value`] pair, by property name, or through typed
//! [`Accessor`] constants; all paths hit the same slot array.

use crate::accessor::Accessor;
use crate::contract::ContractRef;
use crate::descriptor::{Kind, PropertyDescriptor, TypeDescriptor};
use crate::error::ValueError;
use crate::value::{FromValue, IntoValue, SharedInstance, Value};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Structured value backed by a slot array.
#[derive(Clone)]
pub struct ValueInstance {
    descriptor: Arc<TypeDescriptor>,
    slots: Vec<Value>,
}

impl ValueInstance {
    pub(crate) fn from_slots(descriptor: Arc<TypeDescriptor>, slots: Vec<Value>) -> Self {
        Self { descriptor, slots }
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn contract(&self) -> ContractRef {
        self.descriptor.contract()
    }

    /// Property descriptor by name.
    pub fn property(&self, name: &str) -> Result<&PropertyDescriptor, ValueError> {
        self.descriptor
            .property(name)
            .ok_or_else(|| ValueError::UnknownProperty {
                contract: self.descriptor.name().to_string(),
                property: name.to_string(),
            })
    }

    // -----------------------------------------------------------------------
    // Generic slot interface
    // -----------------------------------------------------------------------

    /// Current value of a slot.
    ///
    /// `property` may come from this instance's contract or an ancestor of it.
    pub fn value(&self, property: &PropertyDescriptor) -> Result<&Value, ValueError> {
        let own = own_property(&self.descriptor, property)?;
        Ok(&self.slots[own.index()])
    }

    /// Store a value and return the previous one.
    ///
    /// A `Null` written to a `VALUE`, `LIST` or `INDEX` property is replaced
    /// by the property's initial value.
    pub fn put_value(
        &mut self,
        property: &PropertyDescriptor,
        value: Value,
    ) -> Result<Value, ValueError> {
        let descriptor = Arc::clone(&self.descriptor);
        let own = own_property(&descriptor, property)?;
        if !own.accepts(&value) {
            return Err(ValueError::TypeMismatch {
                property: own.name().to_string(),
                got: value.kind_name().to_string(),
            });
        }
        let value = match (own.kind(), value) {
            (Kind::Value | Kind::List | Kind::Index, Value::Null) => own.initial_value(),
            (_, value) => value,
        };
        Ok(std::mem::replace(&mut self.slots[own.index()], value))
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Value {
        &mut self.slots[index]
    }

    // -----------------------------------------------------------------------
    // Access by name
    // -----------------------------------------------------------------------

    pub fn get(&self, name: &str) -> Result<&Value, ValueError> {
        let index = self.property(name)?.index();
        Ok(&self.slots[index])
    }

    pub fn set(&mut self, name: &str, value: impl IntoValue) -> Result<(), ValueError> {
        let descriptor = Arc::clone(&self.descriptor);
        let property = descriptor
            .property(name)
            .ok_or_else(|| ValueError::UnknownProperty {
                contract: descriptor.name().to_string(),
                property: name.to_string(),
            })?;
        self.put_value(property, value.into_value())?;
        Ok(())
    }

    /// Typed read of a property.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T, ValueError> {
        let value = self.get(name)?;
        T::from_value(value).ok_or_else(|| ValueError::TypeMismatch {
            property: name.to_string(),
            got: value.kind_name().to_string(),
        })
    }

    /// Read through a typed accessor.
    pub fn read<T: FromValue>(&self, accessor: Accessor<T>) -> Result<T, ValueError> {
        self.get_as(accessor.name())
    }

    /// Write through a typed accessor.
    pub fn write<T: IntoValue>(&mut self, accessor: Accessor<T>, value: T) -> Result<(), ValueError> {
        self.set(accessor.name(), value)
    }

    // -----------------------------------------------------------------------
    // Containment
    // -----------------------------------------------------------------------

    fn slot_of_kind(&self, name: &str, kind: Kind) -> Result<usize, ValueError> {
        let property = self.property(name)?;
        if property.kind() != kind {
            return Err(ValueError::KindMismatch {
                property: name.to_string(),
                expected: kind.to_string(),
                actual: property.kind().to_string(),
            });
        }
        Ok(property.index())
    }

    /// Nested instance of a `VALUE` property.
    pub fn nested(&self, name: &str) -> Result<&ValueInstance, ValueError> {
        let index = self.slot_of_kind(name, Kind::Value)?;
        self.slots[index]
            .as_object()
            .ok_or_else(|| ValueError::Absent {
                property: name.to_string(),
            })
    }

    /// Mutable nested instance; an absent slot is materialised first.
    pub fn nested_mut(&mut self, name: &str) -> Result<&mut ValueInstance, ValueError> {
        let index = self.slot_of_kind(name, Kind::Value)?;
        if self.slots[index].is_null() {
            let fresh = self.descriptor.properties()[index]
                .content()
                .map(|content| Value::object(content.new_instance()))
                .unwrap_or(Value::Null);
            self.slots[index] = fresh;
        }
        self.slots[index]
            .as_object_mut()
            .ok_or_else(|| ValueError::Absent {
                property: name.to_string(),
            })
    }

    /// Entries of a `LIST` property.
    pub fn list(&self, name: &str) -> Result<&[ValueInstance], ValueError> {
        let index = self.slot_of_kind(name, Kind::List)?;
        Ok(self.slots[index].as_list().unwrap_or(&[]))
    }

    /// Mutable entries of a `LIST` property.
    pub fn list_mut(&mut self, name: &str) -> Result<&mut Vec<ValueInstance>, ValueError> {
        let index = self.slot_of_kind(name, Kind::List)?;
        let slot = &mut self.slots[index];
        if !matches!(slot, Value::List(_)) {
            *slot = Value::List(Vec::new());
        }
        match slot {
            Value::List(items) => Ok(items),
            _ => Err(ValueError::Absent {
                property: name.to_string(),
            }),
        }
    }

    /// Entries of an `INDEX` property.
    pub fn index(&self, name: &str) -> Result<&ValueIndex, ValueError> {
        let index = self.slot_of_kind(name, Kind::Index)?;
        self.slots[index]
            .as_index()
            .ok_or_else(|| ValueError::Absent {
                property: name.to_string(),
            })
    }

    /// Mutable entries of an `INDEX` property.
    pub fn index_mut(&mut self, name: &str) -> Result<&mut ValueIndex, ValueError> {
        let index = self.slot_of_kind(name, Kind::Index)?;
        let slot = &mut self.slots[index];
        if !matches!(slot, Value::Index(_)) {
            *slot = Value::Index(ValueIndex::new());
        }
        match slot {
            Value::Index(entries) => Ok(entries),
            _ => Err(ValueError::Absent {
                property: name.to_string(),
            }),
        }
    }

    /// Insert into an `INDEX` property under the entry's own index-property
    /// value. Returns the entry previously stored under that key.
    pub fn insert_indexed(
        &mut self,
        name: &str,
        entry: ValueInstance,
    ) -> Result<Option<ValueInstance>, ValueError> {
        let index = self.slot_of_kind(name, Kind::Index)?;
        let property = &self.descriptor.properties()[index];
        let assignable = property
            .content()
            .is_some_and(|content| content.is_assignable_from(&entry.contract()));
        if !assignable {
            return Err(ValueError::TypeMismatch {
                property: name.to_string(),
                got: entry.descriptor().name().to_string(),
            });
        }
        let key = match property.index_property() {
            Some(key_property) => entry.get(key_property.name())?.clone(),
            None => Value::Null,
        };
        Ok(self.index_mut(name)?.insert(key, entry))
    }

    /// Target of a `REFERENCE` property, if set and still alive.
    pub fn reference(&self, name: &str) -> Result<Option<SharedInstance>, ValueError> {
        let index = self.slot_of_kind(name, Kind::Reference)?;
        Ok(match &self.slots[index] {
            Value::Reference(link) => link.upgrade(),
            _ => None,
        })
    }

    /// Point a `REFERENCE` property at `target`.
    pub fn link(&mut self, name: &str, target: &SharedInstance) -> Result<(), ValueError> {
        self.slot_of_kind(name, Kind::Reference)?;
        self.set(name, Value::reference(target))
    }

    /// Move into a shareable handle that references can point to.
    pub fn into_shared(self) -> SharedInstance {
        Arc::new(RwLock::new(self))
    }

    /// Properties paired with their current values, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&PropertyDescriptor, &Value)> {
        self.descriptor.properties().iter().zip(self.slots.iter())
    }
}

// A descriptor of an ancestor contract addresses the same slot by name.
// Descriptors of unrelated contracts are rejected even when a name matches.
fn own_property<'d>(
    descriptor: &'d TypeDescriptor,
    property: &PropertyDescriptor,
) -> Result<&'d PropertyDescriptor, ValueError> {
    let own = descriptor.properties().get(property.index());
    if let Some(own) = own.filter(|own| std::ptr::eq(*own, property)) {
        return Ok(own);
    }
    let contract = descriptor.contract();
    let related = property.owner() == contract || property.owner().is_ancestor_of(&contract);
    descriptor
        .property(property.name())
        .filter(|own| related && own.owner() == property.owner())
        .ok_or_else(|| ValueError::UnknownProperty {
            contract: descriptor.name().to_string(),
            property: property.name().to_string(),
        })
}

impl PartialEq for ValueInstance {
    fn eq(&self, other: &Self) -> bool {
        if self.contract() != other.contract() {
            return false;
        }
        self.entries()
            .zip(other.slots.iter())
            .all(|((property, a), b)| match (property.kind(), property.parser()) {
                (Kind::Primitive, Some(parser)) => parser.equals(a, b),
                _ => a == b,
            })
    }
}

impl Eq for ValueInstance {}

impl Hash for ValueInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.contract().hash(state);
        for (property, value) in self.entries() {
            match (property.kind(), property.parser()) {
                (Kind::Primitive, Some(parser)) => parser.hash_code(value).hash(state),
                _ => value.hash(state),
            }
        }
    }
}

impl fmt::Debug for ValueInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.descriptor.name());
        for (property, value) in self.entries() {
            out.field(property.name(), value);
        }
        out.finish()
    }
}

/// Mapping from index-property values to nested instances.
///
/// Iterates in insertion order. Equality and hashing ignore order.
#[derive(Clone, Default)]
pub struct ValueIndex {
    entries: IndexMap<Value, ValueInstance>,
}

impl ValueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&ValueInstance> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &Value) -> Option<&mut ValueInstance> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace; a replaced key keeps its position.
    pub fn insert(&mut self, key: impl IntoValue, entry: ValueInstance) -> Option<ValueInstance> {
        self.entries.insert(key.into_value(), entry)
    }

    /// Remove an entry; later entries keep their relative order.
    pub fn remove(&mut self, key: &Value) -> Option<ValueInstance> {
        self.entries.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &ValueInstance)> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Value, &mut ValueInstance)> {
        self.entries.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &ValueInstance> {
        self.entries.values()
    }
}

impl PartialEq for ValueIndex {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, entry)| other.get(key).is_some_and(|o| o == entry))
    }
}

impl Eq for ValueIndex {}

impl Hash for ValueIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self.iter().fold(0u64, |acc, (key, entry)| {
            let mut h = DefaultHasher::new();
            key.hash(&mut h);
            entry.hash(&mut h);
            acc.wrapping_add(h.finish())
        });
        self.len().hash(state);
        combined.hash(state);
    }
}

impl fmt::Debug for ValueIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
