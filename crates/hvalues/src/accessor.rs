// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed property handles.

use crate::error::ValueError;
use crate::instance::ValueInstance;
use crate::value::{FromValue, IntoValue};
use std::fmt;
use std::marker::PhantomData;

/// Named, typed handle on one property of a contract.
///
/// Declared as constants next to the contract so that call sites read and
/// write slots without spelling property names or converting values:
///
/// ```
/// use hvalues::Accessor;
///
/// pub const NAME: Accessor<String> = Accessor::new("name");
/// pub const PORT: Accessor<Option<i32>> = Accessor::new("port");
/// ```
pub struct Accessor<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Accessor<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: FromValue> Accessor<T> {
    pub fn get(self, instance: &ValueInstance) -> Result<T, ValueError> {
        instance.read(self)
    }
}

impl<T: IntoValue> Accessor<T> {
    pub fn set(self, instance: &mut ValueInstance, value: T) -> Result<(), ValueError> {
        instance.write(self, value)
    }
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Accessor<T> {}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accessor<{}>({})", std::any::type_name::<T>(), self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Contract, ContractDecl};
    use crate::parser::{PrimitiveType, Scalar};
    use crate::registry::DescriptorRegistry;

    struct Server;

    const HOST: Accessor<String> = Accessor::new("host");
    const PORT: Accessor<Option<i32>> = Accessor::new("port");
    const WRONG: Accessor<bool> = Accessor::new("host");

    impl Contract for Server {
        fn declare() -> ContractDecl {
            ContractDecl::new()
                .primitive("host", PrimitiveType::Scalar(Scalar::String))
                .primitive("port", PrimitiveType::Optional(Scalar::Int))
        }
    }

    #[test]
    fn test_typed_round_trip() {
        let registry = DescriptorRegistry::new();
        let mut server = registry.new_instance::<Server>().unwrap();
        assert_eq!(PORT.get(&server).unwrap(), None);

        HOST.set(&mut server, "localhost".to_string()).unwrap();
        PORT.set(&mut server, Some(8080)).unwrap();
        assert_eq!(HOST.get(&server).unwrap(), "localhost");
        assert_eq!(PORT.get(&server).unwrap(), Some(8080));

        PORT.set(&mut server, None).unwrap();
        assert_eq!(PORT.get(&server).unwrap(), None);
    }

    #[test]
    fn test_wrong_type_is_reported() {
        let registry = DescriptorRegistry::new();
        let server = registry.new_instance::<Server>().unwrap();
        assert!(matches!(
            WRONG.get(&server),
            Err(ValueError::TypeMismatch { .. })
        ));
    }
}
