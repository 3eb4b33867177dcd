//! Import sources
//!
//! `SchemaSource` abstracts where imported schema text comes from, so the
//! compiler can be fed from disk in the CLI and from memory in tests. The
//! compiler decides the candidate locations; a source only loads them.

use std::collections::HashMap;
use std::fs;
use std::io;

/// Loads schema text for an import location
pub trait SchemaSource {
    fn load(&self, location: &str) -> io::Result<String>;
}

/// Treats import locations as filesystem paths
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSource;

impl SchemaSource for FileSource {
    fn load(&self, location: &str) -> io::Result<String> {
        fs::read_to_string(location)
    }
}

/// Serves imports from an in-memory map
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    entries: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> MemorySource {
        MemorySource::default()
    }

    pub fn with(mut self, location: impl Into<String>, text: impl Into<String>) -> MemorySource {
        self.entries.insert(location.into(), text.into());
        self
    }
}

impl SchemaSource for MemorySource {
    fn load(&self, location: &str) -> io::Result<String> {
        self.entries.get(location).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no schema at '{location}'"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_serves_registered_text() {
        let source = MemorySource::new().with("geo.MARDS-schema", "name point\n");
        assert_eq!(
            source.load("geo.MARDS-schema").ok().as_deref(),
            Some("name point\n")
        );
        assert!(source.load("missing.MARDS-schema").is_err());
    }
}
