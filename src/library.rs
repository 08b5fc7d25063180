// 🏛️ Library - The shared context every command acts through
//
// Owns the inventory, the undo history and the borrow ledger. Mutations made
// here are recorded for undo; borrow/return/expiry only touch quantities and
// are never undoable.

use crate::book::{BookRecord, SortKey};
use crate::config::LibraryConfig;
use crate::error::{LibraryError, Result};
use crate::history::{ActionEntry, ActionHistory};
use crate::inventory::{AddOutcome, Inventory, SortOutcome};
use crate::ledger::{BorrowLedger, BorrowReceipt, ExpiryReport, ReturnReceipt};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// What an undo step did to the inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undone {
    /// An add was reverted; this is the record actually removed
    AddReverted(BookRecord),

    /// A removal was reverted by adding the snapshot back
    RemoveReverted(AddOutcome),
}

#[derive(Debug, Clone, Default)]
pub struct Library {
    inventory: Inventory,
    history: ActionHistory,
    ledger: BorrowLedger,
}

impl Library {
    pub fn new() -> Self {
        Self::with_config(&LibraryConfig::default())
    }

    pub fn with_config(config: &LibraryConfig) -> Self {
        Library {
            inventory: Inventory::new(),
            history: ActionHistory::new(),
            ledger: BorrowLedger::new(config),
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    pub fn ledger(&self) -> &BorrowLedger {
        &self.ledger
    }

    // ========================================================================
    // INVENTORY MUTATIONS (recorded for undo)
    // ========================================================================

    /// Add copies of a book. Only a genuinely new record is recorded for undo.
    pub fn add_book(&mut self, id: i32, title: &str, year: i32, quantity: u32) -> AddOutcome {
        let outcome = self.inventory.add(id, title, year, quantity);

        match &outcome {
            AddOutcome::Added(book) => {
                self.history.record(ActionEntry::Add(book.clone()));
                info!(id, title, quantity, "book added");
            }
            AddOutcome::Merged(book) => {
                info!(id, title, quantity = book.quantity, "quantity merged into existing book");
            }
        }

        outcome
    }

    pub fn remove_book(&mut self, id: i32) -> Result<BookRecord> {
        match self.inventory.remove(id) {
            Ok(book) => {
                self.history.record(ActionEntry::Remove(book.clone()));
                info!(id, title = %book.title, "book removed");
                Ok(book)
            }
            Err(err) => {
                warn!(id, "remove requested for unknown book");
                Err(err)
            }
        }
    }

    /// Revert the most recent recorded mutation.
    ///
    /// The entry is consumed even when its inverse finds nothing to act on.
    pub fn undo(&mut self) -> Result<Undone> {
        let entry = self.history.pop().ok_or(LibraryError::EmptyHistory)?;
        debug!(action = entry.kind(), id = entry.book().id, "undoing action");

        match entry {
            ActionEntry::Add(snapshot) => {
                let removed = self.inventory.remove(snapshot.id)?;
                info!(id = removed.id, title = %removed.title, "add undone");
                Ok(Undone::AddReverted(removed))
            }
            ActionEntry::Remove(snapshot) => {
                let outcome = self.inventory.add(
                    snapshot.id,
                    &snapshot.title,
                    snapshot.year,
                    snapshot.quantity,
                );
                info!(id = snapshot.id, title = %snapshot.title, "remove undone");
                Ok(Undone::RemoveReverted(outcome))
            }
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn sort(&mut self, key: SortKey) -> SortOutcome {
        self.inventory.sort(key)
    }

    pub fn search_by_title<'a>(
        &'a self,
        title: &'a str,
    ) -> impl Iterator<Item = &'a BookRecord> + Clone + 'a {
        self.inventory.search_by_title(title)
    }

    pub fn search_by_id(&self, id: i32) -> impl Iterator<Item = &BookRecord> + Clone + '_ {
        self.inventory.search_by_id(id)
    }

    // ========================================================================
    // LOANS
    // ========================================================================

    pub fn borrow(&mut self, id: i32, now: DateTime<Utc>) -> Result<BorrowReceipt> {
        self.ledger.borrow(&mut self.inventory, id, now)
    }

    pub fn return_book(&mut self, id: i32) -> Result<ReturnReceipt> {
        self.ledger.return_book(&mut self.inventory, id)
    }

    pub fn check_expiry(&mut self, now: DateTime<Utc>) -> ExpiryReport {
        self.ledger.check_expiry(now)
    }
}

// ============================================================================
// TESTS
// ============================================================================
