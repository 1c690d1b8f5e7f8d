// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hierarchical key-path serialization.
//!
//! A [`ValueInstance`] tree maps onto a flat string store as follows, in
//! declaration order:
//!
//! - `PRIMITIVE` `p`: `<prefix>p = unparse(value)`; an absent value removes
//!   the key.
//! - `VALUE` `v`: the nested instance under `<prefix>v.`.
//! - `LIST` / `INDEX` `xs`: entries under `<prefix>xs.1.`, `<prefix>xs.2.`,
//!   and so on. Index keys are not written; decoding recovers them from each
//!   entry's index property.
//! - `REFERENCE`: skipped both ways.
//!
//! Decoding probes collection entries from 1 upwards until an entry has no
//! keys or decodes to a freshly initialised instance (see
//! [`ListTermination`]). Decoded entries are appended to the list, or put
//! into the index, already held by the instance.

mod config;
mod store;

pub use config::{CodecConfig, ListTermination, COUNT_SEGMENT};
pub use store::{FlatMap, KeyValueStore};

use crate::descriptor::{Kind, PropertyDescriptor, TypeDescriptor};
use crate::error::DecodeError;
use crate::instance::{ValueIndex, ValueInstance};
use crate::value::Value;
use std::sync::Arc;

/// Write `instance` into `store` under `prefix` with the default options.
pub fn encode<S: KeyValueStore + ?Sized>(instance: &ValueInstance, prefix: &str, store: &mut S) {
    encode_with(&CodecConfig::default(), instance, prefix, store);
}

/// Write `instance` into `store` under `prefix`.
pub fn encode_with<S: KeyValueStore + ?Sized>(
    config: &CodecConfig,
    instance: &ValueInstance,
    prefix: &str,
    store: &mut S,
) {
    let mut key = String::from(prefix);
    Encoder { config, store }.write_instance(instance, &mut key);
}

/// Load `instance` from the keys under `prefix` with the default options.
pub fn decode<S: KeyValueStore + ?Sized>(
    store: &S,
    prefix: &str,
    instance: &mut ValueInstance,
) -> Result<(), DecodeError> {
    decode_with(&CodecConfig::default(), store, prefix, instance)
}

/// Load `instance` from the keys under `prefix`.
///
/// Missing primitive keys reset the property to its initial value.
/// Decoded collection entries are added to the existing collections.
pub fn decode_with<S: KeyValueStore + ?Sized>(
    config: &CodecConfig,
    store: &S,
    prefix: &str,
    instance: &mut ValueInstance,
) -> Result<(), DecodeError> {
    let mut key = String::from(prefix);
    Decoder { config, store }.read_instance(instance, &mut key)
}

struct Encoder<'a, S: ?Sized> {
    config: &'a CodecConfig,
    store: &'a mut S,
}

impl<S: KeyValueStore + ?Sized> Encoder<'_, S> {
    fn write_instance(&mut self, instance: &ValueInstance, key: &mut String) {
        let base = key.len();
        for (property, value) in instance.entries() {
            key.push_str(property.name());
            match property.kind() {
                Kind::Primitive => self.write_primitive(property, value, key),
                Kind::Value => {
                    if let Some(nested) = value.as_object() {
                        key.push('.');
                        self.write_instance(nested, key);
                    }
                }
                Kind::List => {
                    let entries = value.as_list().unwrap_or(&[]);
                    self.write_entries(entries.iter(), entries.len(), key);
                }
                Kind::Index => match value.as_index() {
                    Some(index) => self.write_entries(index.values(), index.len(), key),
                    None => self.write_entries(std::iter::empty(), 0, key),
                },
                Kind::Reference => {}
            }
            key.truncate(base);
        }
    }

    fn write_primitive(&mut self, property: &PropertyDescriptor, value: &Value, key: &str) {
        if value.is_null() {
            self.store.remove(key);
            return;
        }
        let text = match property.parser() {
            Some(parser) => parser.unparse(value),
            None => value.to_string(),
        };
        log::trace!("[codec] write {} = {}", key, text);
        self.store.set(key, text);
    }

    fn write_entries<'e>(
        &mut self,
        entries: impl Iterator<Item = &'e ValueInstance>,
        count: usize,
        key: &mut String,
    ) {
        if self.config.termination() == ListTermination::CountKey {
            let count_key = format!("{}.{}", key, COUNT_SEGMENT);
            self.store.set(&count_key, count.to_string());
        }
        key.push('.');
        let base = key.len();
        for (n, entry) in entries.enumerate() {
            key.push_str(&(n + 1).to_string());
            key.push('.');
            self.write_instance(entry, key);
            key.truncate(base);
        }
    }
}

struct Decoder<'a, S: ?Sized> {
    config: &'a CodecConfig,
    store: &'a S,
}

impl<S: KeyValueStore + ?Sized> Decoder<'_, S> {
    fn read_instance(&self, instance: &mut ValueInstance, key: &mut String) -> Result<(), DecodeError> {
        let descriptor = Arc::clone(instance.descriptor());
        let base = key.len();
        for property in descriptor.properties() {
            key.push_str(property.name());
            match property.kind() {
                Kind::Primitive => {
                    let value = self.read_primitive(property, key)?;
                    self.put(instance, property, value, key)?;
                }
                Kind::Value => {
                    key.push('.');
                    self.read_nested(instance, property, key)?;
                }
                Kind::List => {
                    let entries = self.read_entries(property, key)?;
                    let slot = instance.slot_mut(property.index());
                    match slot {
                        Value::List(items) => items.extend(entries),
                        other => *other = Value::List(entries),
                    }
                }
                Kind::Index => {
                    let entries = self.read_entries(property, key)?;
                    self.merge_index(instance.slot_mut(property.index()), property, entries, key)?;
                }
                Kind::Reference => {}
            }
            key.truncate(base);
        }
        Ok(())
    }

    fn read_primitive(&self, property: &PropertyDescriptor, key: &str) -> Result<Value, DecodeError> {
        let (Some(text), Some(parser)) = (self.store.get(key), property.parser()) else {
            return Ok(property.initial_value());
        };
        log::trace!("[codec] read {} = {}", key, text);
        parser.parse(text).map_err(|source| DecodeError::Parse {
            key: key.to_string(),
            source,
        })
    }

    fn read_nested(
        &self,
        instance: &mut ValueInstance,
        property: &PropertyDescriptor,
        key: &mut String,
    ) -> Result<(), DecodeError> {
        let slot = instance.slot_mut(property.index());
        if slot.is_null() {
            // Only a self-containing contract leaves a VALUE slot absent;
            // materialise it when the store has data for it.
            let Some(content) = property.content() else {
                return Ok(());
            };
            if !self.store.has_prefix(key) {
                return Ok(());
            }
            *slot = Value::object(content.new_instance());
        }
        match slot.as_object_mut() {
            Some(nested) => self.read_instance(nested, key),
            None => Ok(()),
        }
    }

    fn read_entries(
        &self,
        property: &PropertyDescriptor,
        key: &mut String,
    ) -> Result<Vec<ValueInstance>, DecodeError> {
        let Some(content) = property.content() else {
            return Ok(Vec::new());
        };

        let count = match self.config.termination() {
            ListTermination::CountKey => self
                .store
                .get(&format!("{}.{}", key, COUNT_SEGMENT))
                .and_then(|text| text.trim().parse::<usize>().ok()),
            ListTermination::EmptySentinel => None,
        };

        key.push('.');
        let base = key.len();
        let entries = match count {
            Some(count) => self.read_counted(content, count, key)?,
            None => self.read_until_sentinel(content, key)?,
        };
        key.truncate(base - 1);
        Ok(entries)
    }

    fn read_counted(
        &self,
        content: &Arc<TypeDescriptor>,
        count: usize,
        key: &mut String,
    ) -> Result<Vec<ValueInstance>, DecodeError> {
        // Every entry that carries data owns at least one key.
        if count > self.store.key_count() {
            return Err(DecodeError::Count {
                key: format!("{}{}", key, COUNT_SEGMENT),
                count,
            });
        }
        let base = key.len();
        let mut entries = Vec::new();
        for n in 1..=count {
            key.push_str(&n.to_string());
            key.push('.');
            let mut entry = content.new_instance();
            self.read_instance(&mut entry, key)?;
            entries.push(entry);
            key.truncate(base);
        }
        log::debug!("[codec] {} read {} counted entries", key, entries.len());
        Ok(entries)
    }

    fn read_until_sentinel(
        &self,
        content: &Arc<TypeDescriptor>,
        key: &mut String,
    ) -> Result<Vec<ValueInstance>, DecodeError> {
        let base = key.len();
        let sentinel = content.new_instance();
        let mut entries = Vec::new();
        let reason = loop {
            key.push_str(&(entries.len() + 1).to_string());
            key.push('.');
            if !self.store.has_prefix(key) {
                break "no keys";
            }
            let mut entry = content.new_instance();
            self.read_instance(&mut entry, key)?;
            if entry == sentinel {
                break "empty entry";
            }
            entries.push(entry);
            key.truncate(base);
        };
        log::debug!(
            "[codec] {} scan stopped at {} ({}), {} entries",
            &key[..base],
            entries.len() + 1,
            reason,
            entries.len()
        );
        key.truncate(base);
        Ok(entries)
    }

    fn merge_index(
        &self,
        slot: &mut Value,
        property: &PropertyDescriptor,
        entries: Vec<ValueInstance>,
        key: &str,
    ) -> Result<(), DecodeError> {
        if !matches!(slot, Value::Index(_)) {
            *slot = Value::Index(ValueIndex::new());
        }
        let Value::Index(index) = slot else {
            return Ok(());
        };
        let key_property = property.index_property();
        for entry in entries {
            let entry_key = match key_property {
                Some(kp) => entry
                    .value(kp)
                    .map_err(|source| DecodeError::Value {
                        key: key.to_string(),
                        source,
                    })?
                    .clone(),
                None => Value::Null,
            };
            if index.contains_key(&entry_key) {
                log::warn!(
                    "[codec] {}: duplicate index key '{}', decoded entry replaces it",
                    key,
                    entry_key
                );
            }
            index.insert(entry_key, entry);
        }
        Ok(())
    }

    fn put(
        &self,
        instance: &mut ValueInstance,
        property: &PropertyDescriptor,
        value: Value,
        key: &str,
    ) -> Result<(), DecodeError> {
        instance
            .put_value(property, value)
            .map(|_| ())
            .map_err(|source| DecodeError::Value {
                key: key.to_string(),
                source,
            })
    }
}
