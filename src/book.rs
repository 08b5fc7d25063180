// 📚 Book Record - One inventory entry
// Identity is NOT unique: two records may share an id when their titles differ.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ============================================================================
// BOOK RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Catalogue id (may repeat across records with different titles)
    pub id: i32,

    pub title: String,

    /// Publication year
    pub year: i32,

    /// Copies currently on the shelf
    pub quantity: u32,
}

impl BookRecord {
    pub fn new(id: i32, title: impl Into<String>, year: i32, quantity: u32) -> Self {
        BookRecord {
            id,
            title: title.into(),
            year,
            quantity,
        }
    }

    /// Exact (id, title) match - the only case where add merges quantities
    pub fn same_edition(&self, id: i32, title: &str) -> bool {
        self.id == id && self.title == title
    }

    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }
}

// ============================================================================
// SORT KEY
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Title,
    Year,
    Id,
}

impl SortKey {
    /// Map a menu selection (1: Title, 2: Year, 3: Id) to a key.
    ///
    /// Returns `None` for anything else.
    pub fn from_option(option: i32) -> Option<Self> {
        match option {
            1 => Some(SortKey::Title),
            2 => Some(SortKey::Year),
            3 => Some(SortKey::Id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title => "Title",
            SortKey::Year => "Year",
            SortKey::Id => "Book ID",
        }
    }

    pub fn compare(&self, a: &BookRecord, b: &BookRecord) -> Ordering {
        match self {
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Year => a.year.cmp(&b.year),
            SortKey::Id => a.id.cmp(&b.id),
        }
    }

    /// Strict `a < b` under this key
    pub fn less(&self, a: &BookRecord, b: &BookRecord) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_edition() {
        let book = BookRecord::new(1, "Alpha", 2000, 2);
        assert!(book.same_edition(1, "Alpha"));
        assert!(!book.same_edition(1, "alpha"));
        assert!(!book.same_edition(2, "Alpha"));
    }

    #[test]
    fn test_sort_key_from_option() {
        assert_eq!(SortKey::from_option(1), Some(SortKey::Title));
        assert_eq!(SortKey::from_option(2), Some(SortKey::Year));
        assert_eq!(SortKey::from_option(3), Some(SortKey::Id));
        assert_eq!(SortKey::from_option(7), None);
        assert_eq!(SortKey::from_option(0), None);
        assert_eq!(SortKey::default(), SortKey::Title);
    }

    #[test]
    fn test_title_comparison_is_bytewise() {
        let upper = BookRecord::new(1, "Zeta", 2000, 1);
        let lower = BookRecord::new(2, "alpha", 2000, 1);

        // Uppercase sorts before lowercase
        assert!(SortKey::Title.less(&upper, &lower));
        assert!(!SortKey::Title.less(&lower, &upper));
    }

    #[test]
    fn test_less_is_strict() {
        let a = BookRecord::new(1, "Same", 1990, 1);
        let b = BookRecord::new(2, "Same", 1990, 1);
        assert!(!SortKey::Title.less(&a, &b));
        assert!(!SortKey::Year.less(&a, &b));
        assert!(SortKey::Id.less(&a, &b));
    }

    #[test]
    fn test_book_serde_shape() {
        let book = BookRecord::new(7, "Gamma", 2010, 3);
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "title": "Gamma", "year": 2010, "quantity": 3})
        );
    }
}
