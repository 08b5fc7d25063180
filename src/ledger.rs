// ⏰ Borrow Ledger - Active loans with due dates
//
// Loans sit in a FIFO queue in borrow order. Returning and sweeping both
// rebuild the queue by draining it, keeping the relative order of survivors.
//
// Time is passed in by the caller (`now`), never read here. Loans do not
// expire on their own: only `check_expiry` drops them, and a dropped loan
// does NOT give its copy back to the inventory.

use crate::config::LibraryConfig;
use crate::error::{LibraryError, Result};
use crate::inventory::Inventory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

// ============================================================================
// LOAN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub book_id: i32,

    /// Title at borrow time
    pub title: String,

    /// Due date; the loan is expired once a sweep runs strictly after it
    pub expires_at: DateTime<Utc>,
}

impl Loan {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

// ============================================================================
// RECEIPTS
// ============================================================================

/// Successful borrow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowReceipt {
    pub loan: Loan,

    /// Copies left on the shelf after this borrow
    pub remaining: u32,
}

/// Successful return (the book id was known to the inventory)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub book_id: i32,
    pub title: String,

    /// Copies on the shelf after the increment
    pub quantity: u32,

    /// The loan that was closed, if the queue held one for this id
    pub closed_loan: Option<Loan>,
}

impl ReturnReceipt {
    pub fn loan_found(&self) -> bool {
        self.closed_loan.is_some()
    }
}

/// One loan as an expiry sweep saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweptLoan {
    pub loan: Loan,

    /// Dropped by the sweep
    pub expired: bool,
}

/// Result of an expiry sweep, in queue order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpiryReport {
    pub entries: Vec<SweptLoan>,
}

impl ExpiryReport {
    /// The queue was empty when the sweep started
    pub fn no_loans(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every loan in the queue had expired
    pub fn nothing_active(&self) -> bool {
        self.entries.iter().all(|e| e.expired)
    }

    pub fn expired(&self) -> impl Iterator<Item = &Loan> {
        self.entries.iter().filter(|e| e.expired).map(|e| &e.loan)
    }

    pub fn active(&self) -> impl Iterator<Item = &Loan> {
        self.entries.iter().filter(|e| !e.expired).map(|e| &e.loan)
    }
}

// ============================================================================
// BORROW LEDGER
// ============================================================================

#[derive(Debug, Clone)]
pub struct BorrowLedger {
    loans: VecDeque<Loan>,

    /// Loan period settings
    config: LibraryConfig,
}

impl Default for BorrowLedger {
    fn default() -> Self {
        Self::new(&LibraryConfig::default())
    }
}

impl BorrowLedger {
    pub fn new(config: &LibraryConfig) -> Self {
        BorrowLedger {
            loans: VecDeque::new(),
            config: config.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    /// Active loans in queue order
    pub fn loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.iter()
    }

    /// Lend one copy of the first book carrying `id`
    pub fn borrow(
        &mut self,
        inventory: &mut Inventory,
        id: i32,
        now: DateTime<Utc>,
    ) -> Result<BorrowReceipt> {
        let book = inventory
            .first_by_id_mut(id)
            .ok_or(LibraryError::BookNotFound(id))?;

        if !book.is_available() {
            warn!(id, title = %book.title, "borrow refused: no copies left");
            return Err(LibraryError::Unavailable {
                id,
                title: book.title.clone(),
            });
        }

        let expires_at = self
            .config
            .due_date(now)
            .ok_or(LibraryError::LoanPeriodOutOfRange(self.config.loan_period_days))?;

        book.quantity -= 1;

        let loan = Loan {
            book_id: id,
            title: book.title.clone(),
            expires_at,
        };
        self.loans.push_back(loan.clone());

        info!(id, title = %loan.title, due = %loan.expires_at, "book borrowed");
        Ok(BorrowReceipt {
            loan,
            remaining: book.quantity,
        })
    }

    /// Give a copy back to the first book carrying `id` and close one loan for it
    pub fn return_book(&mut self, inventory: &mut Inventory, id: i32) -> Result<ReturnReceipt> {
        let book = inventory
            .first_by_id_mut(id)
            .ok_or(LibraryError::BookNotFound(id))?;

        book.quantity = book.quantity.saturating_add(1);
        let title = book.title.clone();
        let quantity = book.quantity;

        let mut closed_loan = None;
        let mut kept = VecDeque::with_capacity(self.loans.len());
        while let Some(loan) = self.loans.pop_front() {
            if closed_loan.is_none() && loan.book_id == id {
                closed_loan = Some(loan);
            } else {
                kept.push_back(loan);
            }
        }
        self.loans = kept;

        if closed_loan.is_none() {
            warn!(id, "book returned without a matching loan");
        }
        info!(id, title = %title, quantity, "book returned");

        Ok(ReturnReceipt {
            book_id: id,
            title,
            quantity,
            closed_loan,
        })
    }

    /// Drop every loan whose due date is before `now`, keep the rest in order
    pub fn check_expiry(&mut self, now: DateTime<Utc>) -> ExpiryReport {
        let mut report = ExpiryReport::default();
        let mut kept = VecDeque::with_capacity(self.loans.len());

        while let Some(loan) = self.loans.pop_front() {
            let expired = loan.is_expired_at(now);
            if !expired {
                kept.push_back(loan.clone());
            }
            report.entries.push(SweptLoan { loan, expired });
        }
        self.loans = kept;

        debug!(
            expired = report.expired().count(),
            active = self.loans.len(),
            "expiry sweep finished"
        );
        report
    }
}

// ============================================================================
// TESTS
// ============================================================================
