// ↩️ Action History - Last-in, first-out undo log
//
// Each entry snapshots the record a mutation touched. Undo replays the
// inverse operation against the inventory; it never records an entry itself.

use crate::book::BookRecord;

/// The inverse-able mutation that produced a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionEntry {
    /// A new record was inserted; undo removes by id
    Add(BookRecord),

    /// A record was removed; undo adds it back (may merge)
    Remove(BookRecord),
}

impl ActionEntry {
    pub fn book(&self) -> &BookRecord {
        match self {
            ActionEntry::Add(book) | ActionEntry::Remove(book) => book,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ActionEntry::Add(_) => "add",
            ActionEntry::Remove(_) => "remove",
        }
    }
}

/// Unbounded undo stack
#[derive(Debug, Clone, Default)]
pub struct ActionHistory {
    entries: Vec<ActionEntry>,
}

impl ActionHistory {
    pub fn new() -> Self {
        ActionHistory {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, entry: ActionEntry) {
        self.entries.push(entry);
    }

    /// Take the most recent entry off the stack
    pub fn pop(&mut self) -> Option<ActionEntry> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
