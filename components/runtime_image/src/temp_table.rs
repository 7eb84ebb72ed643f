//! Temp table - symbolic storage slots awaiting final addresses

use core_types::Type;
use serde::Serialize;

/// Second cell of every unresolved temp placeholder
pub const PLACEHOLDER_HIGH: &str = "XX";

/// What a temp slot stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotKind {
    /// A declared program variable
    Variable,
    /// Intermediate storage owned by the code generator
    Scratch,
}

/// One symbolic storage slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TempTableEntry {
    /// Synthetic tag, e.g. `T3`
    pub tag: String,
    /// Owning variable name (empty for scratch slots)
    pub name: String,
    /// Stored type
    pub ty: Type,
    /// Variable or scratch
    pub kind: SlotKind,
    /// Id of the declaring scope
    pub scope: usize,
    /// Nesting level of the declaring scope
    pub level: usize,
    /// Byte offset within static storage (first slot is 1)
    pub offset: usize,
    /// Placeholder until backpatched, then the resolved `LL HH` address
    pub address: String,
}

impl TempTableEntry {
    /// The placeholder written into code before the address is known
    pub fn placeholder(&self) -> String {
        format!("{} {}", self.tag, PLACEHOLDER_HIGH)
    }

    /// True once backpatching has replaced the placeholder
    pub fn is_resolved(&self) -> bool {
        self.address != self.placeholder()
    }

    /// Bytes occupied in static storage
    pub fn width(&self) -> usize {
        self.ty.storage_width()
    }
}

/// Ordered table of temp slots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TempTable {
    entries: Vec<TempTableEntry>,
}

impl TempTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next slot.
    ///
    /// The offset is derived from the previous entry: its offset plus the
    /// width of its type.
    pub fn allocate(
        &mut self,
        name: &str,
        ty: Type,
        kind: SlotKind,
        scope: usize,
        level: usize,
    ) -> &TempTableEntry {
        let offset = match self.entries.last() {
            Some(prev) => prev.offset + prev.width(),
            None => 1,
        };
        let tag = format!("T{}", self.entries.len());
        let address = format!("{} {}", tag, PLACEHOLDER_HIGH);
        log::debug!("allocated {} for '{}' ({}) at offset {}", tag, name, ty, offset);

        let idx = self.entries.len();
        self.entries.push(TempTableEntry {
            tag,
            name: name.to_string(),
            ty,
            kind,
            scope,
            level,
            offset,
            address,
        });
        &self.entries[idx]
    }

    /// Variable slot declared as `name` in scope `scope`
    pub fn find(&self, name: &str, scope: usize) -> Option<&TempTableEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == SlotKind::Variable && e.name == name && e.scope == scope)
    }

    /// Mutable entry whose placeholder is `placeholder`
    pub(crate) fn by_placeholder_mut(&mut self, placeholder: &str) -> Option<&mut TempTableEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.placeholder() == placeholder)
    }

    /// All entries in allocation order
    pub fn entries(&self) -> &[TempTableEntry] {
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

    /// Total bytes of static storage the table needs
    pub fn static_size(&self) -> usize {
        self.entries
            .last()
            .map(|e| e.offset + e.width() - 1)
            .unwrap_or(0)
    }

    /// True once every entry has a resolved address
    pub fn is_resolved(&self) -> bool {
        self.entries.iter().all(TempTableEntry::is_resolved)
    }
}
