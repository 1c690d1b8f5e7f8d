// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide descriptor cache.
//!
//! Contracts are resolved into [`TypeDescriptor`]s once and then served from
//! a concurrent map without locking. First resolutions are serialised: a
//! caller that loses the race finds the winner's descriptor on the re-check
//! and returns it. Descriptors are never evicted.

use crate::contract::{Contract, ContractRef};
use crate::descriptor::{Session, TypeDescriptor};
use crate::error::ContractError;
use crate::instance::ValueInstance;
use crate::parser::ParserRegistry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::TypeId;
use std::sync::{Arc, OnceLock};

/// Cache of resolved contracts.
pub struct DescriptorRegistry {
    descriptors: DashMap<TypeId, Arc<TypeDescriptor>>,
    resolving: Mutex<()>,
    parsers: ParserRegistry,
}

impl DescriptorRegistry {
    /// Empty registry with the built-in parser table.
    pub fn new() -> Self {
        Self::with_parsers(ParserRegistry::new())
    }

    pub fn with_parsers(parsers: ParserRegistry) -> Self {
        Self {
            descriptors: DashMap::new(),
            resolving: Mutex::new(()),
            parsers,
        }
    }

    /// Registry shared by the whole process.
    pub fn global() -> &'static DescriptorRegistry {
        static GLOBAL: OnceLock<DescriptorRegistry> = OnceLock::new();
        GLOBAL.get_or_init(DescriptorRegistry::new)
    }

    pub fn parsers(&self) -> &ParserRegistry {
        &self.parsers
    }

    /// Resolve `C`, or return its cached descriptor.
    pub fn resolve<C: Contract>(&self) -> Result<Arc<TypeDescriptor>, ContractError> {
        self.resolve_ref(ContractRef::of::<C>())
    }

    pub fn resolve_ref(&self, contract: ContractRef) -> Result<Arc<TypeDescriptor>, ContractError> {
        if let Some(hit) = self.get(contract) {
            return Ok(hit);
        }

        let _guard = self.resolving.lock();
        if let Some(hit) = self.get(contract) {
            return Ok(hit);
        }

        let committed = |id: TypeId| self.descriptors.get(&id).map(|d| Arc::clone(d.value()));
        let mut session = Session::new(&self.parsers, &committed);
        let resolved = session
            .resolve(contract)
            .and_then(|root| session.finish().map(|all| (root, all)));

        match resolved {
            Ok((root, all)) => {
                for descriptor in all {
                    log::debug!(
                        "[registry] resolved contract {} ({} properties)",
                        descriptor.name(),
                        descriptor.len()
                    );
                    self.descriptors
                        .insert(descriptor.contract().id(), descriptor);
                }
                Ok(root)
            }
            Err(err) => {
                log::debug!(
                    "[registry] resolution of {} rolled back: {}",
                    contract.name(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Published descriptor of a contract, if it was resolved before.
    pub fn get(&self, contract: ContractRef) -> Option<Arc<TypeDescriptor>> {
        self.descriptors
            .get(&contract.id())
            .map(|entry| Arc::clone(entry.value()))
            .filter(|d| d.is_resolved())
    }

    /// Resolve `C` and construct a fresh instance of it.
    pub fn new_instance<C: Contract>(&self) -> Result<ValueInstance, ContractError> {
        Ok(self.resolve::<C>()?.new_instance())
    }

    /// Number of published descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for DescriptorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DescriptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorRegistry")
            .field("descriptors", &self.descriptors.len())
            .finish()
    }
}

/// Resolve `C` in the global registry.
pub fn resolve<C: Contract>() -> Result<Arc<TypeDescriptor>, ContractError> {
    DescriptorRegistry::global().resolve::<C>()
}

/// Fresh instance of `C` from the global registry.
pub fn new_instance<C: Contract>() -> Result<ValueInstance, ContractError> {
    DescriptorRegistry::global().new_instance::<C>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{AccessorDecl, ContractDecl};
    use crate::descriptor::Kind;
    use crate::parser::{PrimitiveType, Scalar};

    struct Team;
    struct Member;
    struct Broken;
    struct UsesBroken;
    struct Keyed;
    struct KeyedByValue;

    impl Contract for Team {
        fn declare() -> ContractDecl {
            ContractDecl::new()
                .primitive("name", PrimitiveType::Scalar(Scalar::String))
                .index::<Member>("members", "login")
                .accessor(AccessorDecl::value::<Member>("lead").as_reference())
        }
    }

    impl Contract for Member {
        fn declare() -> ContractDecl {
            ContractDecl::new()
                .primitive("login", PrimitiveType::Scalar(Scalar::String))
                .reference::<Team>("team")
        }
    }

    impl Contract for Broken {
        fn declare() -> ContractDecl {
            ContractDecl::new().accessor(
                AccessorDecl::primitive("count", PrimitiveType::Scalar(Scalar::Int)).as_reference(),
            )
        }
    }

    impl Contract for UsesBroken {
        fn declare() -> ContractDecl {
            ContractDecl::new()
                .value::<Member>("member")
                .value::<Broken>("broken")
        }
    }

    impl Contract for Keyed {
        fn declare() -> ContractDecl {
            ContractDecl::new().index::<KeyedByValue>("entries", "inner")
        }
    }

    impl Contract for KeyedByValue {
        fn declare() -> ContractDecl {
            ContractDecl::new().value::<Member>("inner")
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let registry = DescriptorRegistry::new();
        let a = registry.resolve::<Team>().unwrap();
        let b = registry.resolve::<Team>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_mutual_references_resolve() {
        let registry = DescriptorRegistry::new();
        let team = registry.resolve::<Team>().unwrap();
        let members = team.property("members").unwrap();
        assert_eq!(members.kind(), Kind::Index);
        assert_eq!(members.index_property().unwrap().name(), "login");

        let member = registry.resolve::<Member>().unwrap();
        assert!(Arc::ptr_eq(members.content().unwrap(), &member));
        let back = member.property("team").unwrap();
        assert_eq!(back.kind(), Kind::Reference);
        assert!(Arc::ptr_eq(back.content().unwrap(), &team));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_failure_publishes_nothing() {
        let registry = DescriptorRegistry::new();
        let err = registry.resolve::<UsesBroken>().unwrap_err();
        assert!(matches!(err, ContractError::PrimitiveReference { .. }));
        assert!(registry.is_empty());
        assert!(registry.get(ContractRef::of::<Member>()).is_none());

        // Failure is stable across attempts.
        assert!(registry.resolve::<UsesBroken>().is_err());
        // Unaffected contracts still resolve.
        assert!(registry.resolve::<Member>().is_ok());
    }

    #[test]
    fn test_index_property_must_be_primitive() {
        let registry = DescriptorRegistry::new();
        let err = registry.resolve::<Keyed>().unwrap_err();
        assert_eq!(
            err,
            ContractError::IndexPropertyNotPrimitive {
                contract: "Keyed".into(),
                property: "entries".into(),
                content: "KeyedByValue".into(),
                index_property: "inner".into(),
            }
        );
    }

    #[test]
    fn test_concurrent_first_lookups_share_one_descriptor() {
        let registry = Arc::new(DescriptorRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.resolve::<Team>().unwrap())
            })
            .collect();
        let resolved: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for d in &resolved[1..] {
            assert!(Arc::ptr_eq(&resolved[0], d));
        }
    }
}
