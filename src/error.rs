// Error taxonomy for the library core
// Every variant is informational: the console reports it and keeps going.

use thiserror::Error;

/// All outcomes a library operation can report instead of succeeding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// No book in the inventory carries this id
    #[error("No book found with ID {0}")]
    BookNotFound(i32),

    /// The book exists but every copy is out on loan
    #[error("Sorry, the book is currently unavailable.")]
    Unavailable { id: i32, title: String },

    /// Undo was requested with nothing recorded
    #[error("No actions to undo.")]
    EmptyHistory,

    /// A menu or sort selection that is not recognised
    #[error("Invalid choice: {0}")]
    InvalidOption(String),

    /// The configured loan period pushes the due date past what a timestamp holds
    #[error("Loan period of {0} days is out of range")]
    LoanPeriodOutOfRange(i64),
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            LibraryError::BookNotFound(42).to_string(),
            "No book found with ID 42"
        );
        assert_eq!(LibraryError::EmptyHistory.to_string(), "No actions to undo.");

        let err = LibraryError::Unavailable {
            id: 5,
            title: "Beta".to_string(),
        };
        assert_eq!(err.to_string(), "Sorry, the book is currently unavailable.");

        let err = LibraryError::InvalidOption("9".to_string());
        assert_eq!(err.to_string(), "Invalid choice: 9");

        assert_eq!(
            LibraryError::LoanPeriodOutOfRange(100_000_000).to_string(),
            "Loan period of 100000000 days is out of range"
        );
    }
}
