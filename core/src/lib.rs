//! Core data model and shared types for the flowtag engine.

mod counts;
mod error;

pub use counts::OrderedCounts;
pub use error::Error;

use std::collections::HashMap;

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Classification key: destination port plus lowercase protocol name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    pub port: u16,
    pub protocol: String,
}

impl LookupKey {
    pub fn new(port: u16, protocol: impl Into<String>) -> Self {
        LookupKey { port, protocol: protocol.into() }
    }
}

/// Static mapping from (port, protocol) to tag. Built once per run, read-only
/// during aggregation.
#[derive(Debug, Default)]
pub struct LookupTable {
    entries: HashMap<LookupKey, String>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping. A later insert for the same key overwrites it.
    pub fn insert(&mut self, key: LookupKey, tag: String) {
        self.entries.insert(key, tag);
    }

    pub fn tag_for(&self, key: &LookupKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decode ISO-8859-1 bytes. Input files are not guaranteed to be UTF-8.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
