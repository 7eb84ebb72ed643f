//! Jump table - forward branch distances awaiting resolution

use serde::Serialize;

/// One named jump slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JumpTableEntry {
    /// Synthetic tag, e.g. `J0`
    pub tag: String,
    /// Branch distance in bytes, known once the body has been emitted
    pub length: Option<u8>,
}

/// Ordered table of jump slots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JumpTable {
    entries: Vec<JumpTableEntry>,
}

impl JumpTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next jump slot and return its tag
    pub fn allocate(&mut self) -> String {
        let tag = format!("J{}", self.entries.len());
        self.entries.push(JumpTableEntry {
            tag: tag.clone(),
            length: None,
        });
        tag
    }

    /// Record the resolved length of `tag`; false if no such slot exists
    pub(crate) fn resolve(&mut self, tag: &str, length: u8) -> bool {
        match self.entries.iter_mut().find(|e| e.tag == tag) {
            Some(entry) => {
                entry.length = Some(length);
                true
            }
            None => false,
        }
    }

    /// Entry by tag
    pub fn get(&self, tag: &str) -> Option<&JumpTableEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// All entries in allocation order
    pub fn entries(&self) -> &[JumpTableEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was allocated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once every jump has a length
    pub fn is_resolved(&self) -> bool {
        self.entries.iter().all(|e| e.length.is_some())
    }
}
