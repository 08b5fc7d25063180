// Library Inventory - Core Library
// Book collection, undo history and borrow ledger, shared by the console and tests

pub mod book;
pub mod config;
pub mod error;
pub mod history;
pub mod inventory;
pub mod ledger;
pub mod library;

// Re-export commonly used types
pub use book::{BookRecord, SortKey};
pub use config::{LibraryConfig, DEFAULT_LOAN_PERIOD_DAYS, MAX_LOAN_PERIOD_DAYS};
pub use error::{LibraryError, Result};
pub use history::{ActionEntry, ActionHistory};
pub use inventory::{AddOutcome, Inventory, SortOutcome};
pub use ledger::{BorrowLedger, BorrowReceipt, ExpiryReport, Loan, ReturnReceipt, SweptLoan};
pub use library::{Library, Undone};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
