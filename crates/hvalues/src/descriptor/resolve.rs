// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Contract resolution.
//!
//! Resolution runs in two phases per contract. The placeholder descriptor is
//! registered in the session first, then its properties are classified.
//! Content types reached during classification are resolved recursively; a
//! contract already in the session is returned as its (possibly incomplete)
//! placeholder, which breaks reference cycles.
//!
//! Nothing becomes visible outside the session until every descriptor in it
//! resolved without error.

use super::{Initializer, Kind, PropertyDescriptor, TypeDescriptor};
use crate::contract::{AccessorDecl, ContractRef, DeclaredType, DefaultValue};
use crate::error::ContractError;
use crate::parser::{Parser, ParserRegistry};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Descriptors installed by one top-level resolution.
pub(crate) struct Session<'a> {
    parsers: &'a ParserRegistry,
    committed: &'a dyn Fn(TypeId) -> Option<Arc<TypeDescriptor>>,
    pending: HashMap<TypeId, Arc<TypeDescriptor>>,
    order: Vec<Arc<TypeDescriptor>>,
}

impl<'a> Session<'a> {
    pub(crate) fn new(
        parsers: &'a ParserRegistry,
        committed: &'a dyn Fn(TypeId) -> Option<Arc<TypeDescriptor>>,
    ) -> Self {
        Self {
            parsers,
            committed,
            pending: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Published descriptor, session placeholder, or a newly resolved one.
    pub(crate) fn resolve(
        &mut self,
        contract: ContractRef,
    ) -> Result<Arc<TypeDescriptor>, ContractError> {
        if let Some(found) = (self.committed)(contract.id()) {
            return Ok(found);
        }
        if let Some(found) = self.pending.get(&contract.id()) {
            return Ok(Arc::clone(found));
        }

        let placeholder = Arc::new(TypeDescriptor::placeholder(contract));
        self.pending.insert(contract.id(), Arc::clone(&placeholder));
        self.order.push(Arc::clone(&placeholder));

        self.populate(&placeholder)?;
        Ok(placeholder)
    }

    /// Validate cross-contract invariants and hand out the session's
    /// descriptors in installation order.
    pub(crate) fn finish(self) -> Result<Vec<Arc<TypeDescriptor>>, ContractError> {
        for descriptor in &self.order {
            for property in descriptor.properties() {
                if property.kind != Kind::Index {
                    continue;
                }
                let Some(key) = property.index_property() else {
                    continue;
                };
                if key.kind != Kind::Primitive {
                    return Err(ContractError::IndexPropertyNotPrimitive {
                        contract: descriptor.name().to_string(),
                        property: property.name.clone(),
                        content: property
                            .content
                            .as_ref()
                            .map(|c| c.name())
                            .unwrap_or_default()
                            .to_string(),
                        index_property: key.name.clone(),
                    });
                }
            }
        }
        Ok(self.order)
    }

    fn populate(&mut self, descriptor: &Arc<TypeDescriptor>) -> Result<(), ContractError> {
        let contract = descriptor.contract;
        let accessors = collect_accessors(contract)?;

        let layout = accessors
            .iter()
            .enumerate()
            .map(|(pos, (_, decl))| (decl.property_name().to_string(), pos))
            .collect();
        descriptor.set_layout(layout);

        let mut properties = Vec::with_capacity(accessors.len());
        for (index, (owner, decl)) in accessors.into_iter().enumerate() {
            properties.push(self.classify(contract, index, owner, decl)?);
        }
        descriptor.set_properties(properties);
        Ok(())
    }

    fn classify(
        &mut self,
        contract: ContractRef,
        index: usize,
        owner: ContractRef,
        decl: AccessorDecl,
    ) -> Result<PropertyDescriptor, ContractError> {
        let name = decl.property_name().to_string();
        let mut parser: Option<Arc<dyn Parser>> = None;
        let mut content = None;
        let mut index_property = None;

        let kind = if let Some(custom) = decl.parser.clone() {
            parser = Some(custom);
            Kind::Primitive
        } else if decl.reference {
            match &decl.declared {
                DeclaredType::Primitive(_) => {
                    return Err(ContractError::PrimitiveReference {
                        contract: contract.name().to_string(),
                        property: name,
                    });
                }
                DeclaredType::Contract(target)
                | DeclaredType::List(target)
                | DeclaredType::Map(target) => {
                    content = Some(self.resolve(*target)?);
                    Kind::Reference
                }
            }
        } else {
            match &decl.declared {
                DeclaredType::List(element) => {
                    content = Some(self.resolve(*element)?);
                    Kind::List
                }
                DeclaredType::Map(element) => {
                    let resolved = self.resolve(*element)?;
                    let Some(key_name) = decl.index_property.as_deref() else {
                        return Err(ContractError::MissingIndexProperty {
                            contract: contract.name().to_string(),
                            property: name,
                        });
                    };
                    let Some(pos) = resolved.position(key_name) else {
                        return Err(ContractError::UnknownIndexProperty {
                            contract: contract.name().to_string(),
                            property: name,
                            content: resolved.name().to_string(),
                            index_property: key_name.to_string(),
                        });
                    };
                    index_property = Some(pos);
                    content = Some(resolved);
                    Kind::Index
                }
                DeclaredType::Primitive(ty) => {
                    parser = Some(self.parsers.lookup(ty));
                    Kind::Primitive
                }
                DeclaredType::Contract(nested) => {
                    content = Some(self.resolve(*nested)?);
                    Kind::Value
                }
            }
        };

        let initializer = match decl.default {
            Some(DefaultValue::Constant(value)) => {
                let accepted = kind == Kind::Primitive
                    && parser.as_ref().is_some_and(|p| p.accepts(&value));
                if !accepted {
                    return Err(ContractError::UnsupportedDefault {
                        contract: contract.name().to_string(),
                        property: name,
                    });
                }
                Initializer::Constant(value)
            }
            Some(DefaultValue::With(init)) => Initializer::Custom(init),
            None => match kind {
                Kind::Primitive => match &parser {
                    Some(p) => Initializer::Parser(Arc::clone(p)),
                    None => Initializer::Absent,
                },
                Kind::Value => match &content {
                    Some(c) => Initializer::NewValue(Arc::clone(c)),
                    None => Initializer::Absent,
                },
                Kind::List => Initializer::NewList,
                Kind::Index => Initializer::NewIndex,
                Kind::Reference => Initializer::Absent,
            },
        };

        Ok(PropertyDescriptor {
            name,
            index,
            kind,
            owner,
            parser,
            content,
            index_property,
            initializer,
        })
    }
}

/// Accessors of a contract and its ancestors, ancestors first, with
/// redeclarations merged.
fn collect_accessors(
    contract: ContractRef,
) -> Result<Vec<(ContractRef, AccessorDecl)>, ContractError> {
    let mut merged: Vec<(ContractRef, AccessorDecl)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut visited = HashSet::new();
    let mut declared = Vec::new();
    walk(contract, &mut visited, &mut declared);

    for (owner, decl) in declared {
        let name = decl.property_name().to_string();
        let Some(&pos) = positions.get(&name) else {
            positions.insert(name, merged.len());
            merged.push((owner, decl));
            continue;
        };

        let kept = merged[pos].0;
        if kept != owner && kept.is_ancestor_of(&owner) {
            // Covariant redeclaration in a sub-contract.
            continue;
        }
        if kept != owner && owner.is_ancestor_of(&kept) {
            merged[pos] = (owner, decl);
            continue;
        }
        return Err(ContractError::DuplicateProperty {
            contract: contract.name().to_string(),
            property: name,
        });
    }
    Ok(merged)
}

fn walk(
    contract: ContractRef,
    visited: &mut HashSet<TypeId>,
    out: &mut Vec<(ContractRef, AccessorDecl)>,
) {
    if !visited.insert(contract.id()) {
        return;
    }
    let decl = contract.declaration();
    for parent in &decl.extends {
        walk(*parent, visited, out);
    }
    out.extend(decl.accessors.into_iter().map(|a| (contract, a)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Contract, ContractDecl};
    use crate::parser::{PrimitiveType, Scalar};

    struct Named;
    struct Base;
    struct Derived;
    struct Other;
    struct Diamond;

    impl Contract for Named {
        fn declare() -> ContractDecl {
            ContractDecl::new().primitive("name", PrimitiveType::Scalar(Scalar::String))
        }
    }

    impl Contract for Base {
        fn declare() -> ContractDecl {
            ContractDecl::new()
                .extends::<Named>()
                .primitive("size", PrimitiveType::Scalar(Scalar::Int))
        }
    }

    impl Contract for Derived {
        fn declare() -> ContractDecl {
            ContractDecl::new()
                .extends::<Base>()
                .primitive("name", PrimitiveType::Optional(Scalar::String))
                .primitive("extra", PrimitiveType::Scalar(Scalar::Bool))
        }
    }

    impl Contract for Other {
        fn declare() -> ContractDecl {
            ContractDecl::new().primitive("size", PrimitiveType::Scalar(Scalar::Long))
        }
    }

    impl Contract for Diamond {
        fn declare() -> ContractDecl {
            ContractDecl::new().extends::<Base>().extends::<Named>()
        }
    }

    struct Clash;

    impl Contract for Clash {
        fn declare() -> ContractDecl {
            ContractDecl::new().extends::<Base>().extends::<Other>()
        }
    }

    fn names(decls: &[(ContractRef, AccessorDecl)]) -> Vec<&str> {
        decls.iter().map(|(_, d)| d.property_name()).collect()
    }

    #[test]
    fn test_ancestors_come_first() {
        let decls = collect_accessors(ContractRef::of::<Derived>()).unwrap();
        assert_eq!(names(&decls), vec!["name", "size", "extra"]);
    }

    #[test]
    fn test_redeclaration_keeps_general_declaration() {
        let decls = collect_accessors(ContractRef::of::<Derived>()).unwrap();
        assert_eq!(decls[0].0, ContractRef::of::<Named>());
        assert!(matches!(
            decls[0].1.declared_type(),
            DeclaredType::Primitive(PrimitiveType::Scalar(Scalar::String))
        ));
    }

    #[test]
    fn test_shared_ancestor_is_visited_once() {
        let decls = collect_accessors(ContractRef::of::<Diamond>()).unwrap();
        assert_eq!(names(&decls), vec!["name", "size"]);
    }

    #[test]
    fn test_unrelated_declarations_clash() {
        let err = collect_accessors(ContractRef::of::<Clash>()).unwrap_err();
        assert_eq!(
            err,
            ContractError::DuplicateProperty {
                contract: "Clash".into(),
                property: "size".into(),
            }
        );
    }
}
