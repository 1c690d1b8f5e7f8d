// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Properties-file storage for hvalues value trees.
//!
//! Reads and writes the line-oriented `key=value` properties format (see
//! [`format`]) and combines it with the hvalues codec, so that a value tree
//! can be loaded from or saved to a file under an optional key prefix.
//!
//! ```rust,no_run
//! use hvalues::{Contract, ContractDecl, PrimitiveType, Scalar};
//!
//! struct Server;
//!
//! impl Contract for Server {
//!     fn declare() -> ContractDecl {
//!         ContractDecl::new()
//!             .primitive("host", PrimitiveType::Scalar(Scalar::String))
//!             .primitive("port", PrimitiveType::Scalar(Scalar::Int))
//!     }
//! }
//!
//! fn main() -> Result<(), hvalues_properties::PropertiesError> {
//!     let server = hvalues_properties::load::<Server>("server.properties", "server.")?;
//!     hvalues_properties::save("copy.properties", "server.", &server)?;
//!     Ok(())
//! }
//! ```

pub mod format;

use hvalues::{Contract, ContractError, DecodeError, DescriptorRegistry, FlatMap, ValueInstance};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

/// Properties storage errors.
#[derive(Debug, Error)]
pub enum PropertiesError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Read a properties file into an insertion-ordered store.
pub fn read_file(path: impl AsRef<Path>) -> Result<FlatMap, PropertiesError> {
    let path = path.as_ref();
    let store = format::read(BufReader::new(File::open(path)?))?;
    log::debug!(
        "[properties] read {} entries from {}",
        store.len(),
        path.display()
    );
    Ok(store)
}

/// Write `store` to a properties file, replacing any previous content.
pub fn write_file(
    path: impl AsRef<Path>,
    store: &FlatMap,
    header: Option<&str>,
) -> Result<(), PropertiesError> {
    let path = path.as_ref();
    format::write(store, header, BufWriter::new(File::create(path)?))?;
    log::debug!(
        "[properties] wrote {} entries to {}",
        store.len(),
        path.display()
    );
    Ok(())
}

/// Load a new `C` from the keys under `prefix` in a properties file.
pub fn load<C: Contract>(
    path: impl AsRef<Path>,
    prefix: &str,
) -> Result<ValueInstance, PropertiesError> {
    load_in::<C>(DescriptorRegistry::global(), path, prefix)
}

/// Like [`load`], resolving `C` in `registry`.
pub fn load_in<C: Contract>(
    registry: &DescriptorRegistry,
    path: impl AsRef<Path>,
    prefix: &str,
) -> Result<ValueInstance, PropertiesError> {
    let mut instance = registry.new_instance::<C>()?;
    load_into(path, prefix, &mut instance)?;
    Ok(instance)
}

/// Load `instance` from the keys under `prefix` in a properties file.
///
/// Decoded list and index entries are added to the ones `instance` holds.
pub fn load_into(
    path: impl AsRef<Path>,
    prefix: &str,
    instance: &mut ValueInstance,
) -> Result<(), PropertiesError> {
    let store = read_file(path)?;
    hvalues::decode(&store, prefix, instance)?;
    Ok(())
}

/// Save `instance` under `prefix` to a new properties file.
pub fn save(
    path: impl AsRef<Path>,
    prefix: &str,
    instance: &ValueInstance,
) -> Result<(), PropertiesError> {
    let mut store = FlatMap::new();
    hvalues::encode(instance, prefix, &mut store);
    let header = format!(
        "{}\n{}",
        instance.descriptor().name(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S %z")
    );
    write_file(path, &store, Some(&header))
}
