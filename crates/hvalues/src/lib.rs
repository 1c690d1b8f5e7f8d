// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hvalues - structured values from declared contracts
//!
//! Declare a contract once as an ordered list of typed accessors; hvalues
//! resolves it into a cached descriptor, builds fully initialised instances
//! from it, and maps instance trees to and from flat `key = value` stores
//! using dotted key paths.
//!
//! ## Quick Start
//!
//! ```rust
//! use hvalues::{encode, decode, Accessor, Contract, ContractDecl, FlatMap, PrimitiveType, Scalar};
//!
//! struct Endpoint;
//! struct Service;
//!
//! const HOST: Accessor<String> = Accessor::new("host");
//!
//! impl Contract for Endpoint {
//!     fn declare() -> ContractDecl {
//!         ContractDecl::new()
//!             .primitive("host", PrimitiveType::Scalar(Scalar::String))
//!             .primitive("port", PrimitiveType::Scalar(Scalar::Int))
//!     }
//! }
//!
//! impl Contract for Service {
//!     fn declare() -> ContractDecl {
//!         ContractDecl::new()
//!             .primitive("name", PrimitiveType::Scalar(Scalar::String))
//!             .list::<Endpoint>("endpoints")
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut service = hvalues::new_instance::<Service>()?;
//!     service.set("name", "billing")?;
//!
//!     let mut endpoint = hvalues::new_instance::<Endpoint>()?;
//!     endpoint.write(HOST, "10.0.0.7".to_string())?;
//!     endpoint.set("port", 8443)?;
//!     service.list_mut("endpoints")?.push(endpoint);
//!
//!     let mut store = FlatMap::new();
//!     encode(&service, "", &mut store);
//!     assert_eq!(store.get("endpoints.1.host"), Some("10.0.0.7"));
//!
//!     let mut copy = hvalues::new_instance::<Service>()?;
//!     decode(&store, "", &mut copy)?;
//!     assert_eq!(copy, service);
//!     Ok(())
//! }
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Contract`] | Declares the accessors of a structured value |
//! | [`DescriptorRegistry`] | Process-wide cache of resolved contracts |
//! | [`TypeDescriptor`] | Resolved contract and instance factory |
//! | [`PropertyDescriptor`] | Resolved property: kind, parser, initializer |
//! | [`ValueInstance`] | Slot array holding one value per property |
//! | [`Parser`] | String codec of a primitive type |
//! | [`KeyValueStore`] | Flat store the codec reads and writes |
//!
//! ## Modules Overview
//!
//! - [`parser`] - primitive codecs and the parser table
//! - [`contract`] - contract declarations and directives
//! - [`descriptor`] - resolved descriptors and instance construction
//! - [`codec`] - hierarchical key-path encode/decode

pub mod accessor;
pub mod codec;
pub mod contract;
pub mod descriptor;
pub mod error;
pub mod instance;
pub mod parser;
pub mod registry;
pub mod value;

pub use accessor::Accessor;
pub use codec::{
    decode, decode_with, encode, encode_with, CodecConfig, FlatMap, KeyValueStore,
    ListTermination,
};
pub use contract::{AccessorDecl, Contract, ContractDecl, ContractRef, DeclaredType, DefaultValue};
pub use descriptor::{Kind, PropertyDescriptor, TypeDescriptor};
pub use error::{ContractError, DecodeError, ParseError, ValueError};
pub use instance::{ValueIndex, ValueInstance};
pub use parser::{ArrayParser, Parser, ParserRegistry, PrimitiveType, Scalar, ScalarParser, TextParser};
pub use registry::{new_instance, resolve, DescriptorRegistry};
pub use value::{CustomValue, FromValue, IntoValue, Opaque, SharedInstance, Value, ValueRef};
