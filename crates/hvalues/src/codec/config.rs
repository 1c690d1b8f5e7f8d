// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration.

/// Key segment holding the entry count of a collection in
/// [`ListTermination::CountKey`] mode.
pub const COUNT_SEGMENT: &str = "count";

/// How the end of a serialized `LIST` or `INDEX` run is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListTermination {
    /// Probe `K.1.`, `K.2.`, ... until an entry decodes to a freshly
    /// initialised instance or has no keys at all.
    ///
    /// An entry whose primitives all hold their initial values is
    /// indistinguishable from the end of the run.
    #[default]
    EmptySentinel,
    /// Additionally write `K.count`; decoding reads exactly that many
    /// entries, falling back to the sentinel scan if the key is missing.
    CountKey,
}

/// Serializer options.
#[derive(Debug, Clone, Default)]
pub struct CodecConfig {
    termination: ListTermination,
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_termination(mut self, termination: ListTermination) -> Self {
        self.termination = termination;
        self
    }

    pub fn termination(&self) -> ListTermination {
        self.termination
    }
}
