// 📖 Inventory - Ordered book collection
//
// The collection keeps a traversal order: new books go to the front, removal
// takes the first match, and sort rewrites the order in place.
//
// Sorting is a list merge sort run over index links:
// - split: slow/fast cursors, left half keeps ceil(n/2) records
// - merge: take left only when left < right, otherwise take right
//
// Ties go to the right-hand run, so the sort is NOT stable. A list where
// every key is equal comes out reversed.

use crate::book::{BookRecord, SortKey};
use crate::error::{LibraryError, Result};
use tracing::debug;

// ============================================================================
// OUTCOMES
// ============================================================================

/// What `Inventory::add` did with the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new record was inserted at the front (snapshot of it)
    Added(BookRecord),

    /// An existing (id, title) record absorbed the quantity (updated snapshot)
    Merged(BookRecord),
}

impl AddOutcome {
    pub fn book(&self) -> &BookRecord {
        match self {
            AddOutcome::Added(book) | AddOutcome::Merged(book) => book,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOutcome {
    Sorted(SortKey),

    /// Empty or single-book collection
    NotRequired,
}

// ============================================================================
// INVENTORY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Records in traversal order
    books: Vec<BookRecord>,
}

impl Inventory {
    pub fn new() -> Self {
        Inventory { books: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// All records in traversal order
    pub fn iter(&self) -> std::slice::Iter<'_, BookRecord> {
        self.books.iter()
    }

    /// Add copies of a book, merging into an exact (id, title) match if one exists
    pub fn add(&mut self, id: i32, title: &str, year: i32, quantity: u32) -> AddOutcome {
        if let Some(existing) = self.books.iter_mut().find(|b| b.same_edition(id, title)) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return AddOutcome::Merged(existing.clone());
        }

        let book = BookRecord::new(id, title, year, quantity);
        self.books.insert(0, book.clone());
        AddOutcome::Added(book)
    }

    /// Remove the first record (in traversal order) carrying `id`
    pub fn remove(&mut self, id: i32) -> Result<BookRecord> {
        let pos = self
            .books
            .iter()
            .position(|b| b.id == id)
            .ok_or(LibraryError::BookNotFound(id))?;

        Ok(self.books.remove(pos))
    }

    pub fn first_by_id(&self, id: i32) -> Option<&BookRecord> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn first_by_id_mut(&mut self, id: i32) -> Option<&mut BookRecord> {
        self.books.iter_mut().find(|b| b.id == id)
    }

    /// Every record with exactly this title, in traversal order.
    ///
    /// The iterator is lazy and can be cloned to walk the results again.
    pub fn search_by_title<'a>(
        &'a self,
        title: &'a str,
    ) -> impl Iterator<Item = &'a BookRecord> + Clone + 'a {
        self.books.iter().filter(move |b| b.title == title)
    }

    /// Every record with this id, in traversal order
    pub fn search_by_id(&self, id: i32) -> impl Iterator<Item = &BookRecord> + Clone + '_ {
        self.books.iter().filter(move |b| b.id == id)
    }

    /// Reorder the collection by `key` (right-biased on ties)
    pub fn sort(&mut self, key: SortKey) -> SortOutcome {
        if self.books.len() < 2 {
            return SortOutcome::NotRequired;
        }

        let len = self.books.len();
        let mut next: Vec<Option<usize>> = (0..len)
            .map(|i| if i + 1 < len { Some(i + 1) } else { None })
            .collect();

        let head = merge_sort(&self.books, &mut next, Some(0), key);

        let mut order = Vec::with_capacity(len);
        let mut cursor = head;
        while let Some(i) = cursor {
            order.push(i);
            cursor = next[i];
        }

        let mut slots: Vec<Option<BookRecord>> =
            std::mem::take(&mut self.books).into_iter().map(Some).collect();
        self.books = order.into_iter().filter_map(|i| slots[i].take()).collect();

        debug!(key = key.as_str(), books = len, "inventory sorted");
        SortOutcome::Sorted(key)
    }
}

// ============================================================================
// LINKED MERGE SORT (over indices)
// ============================================================================

fn merge_sort(
    books: &[BookRecord],
    next: &mut [Option<usize>],
    head: Option<usize>,
    key: SortKey,
) -> Option<usize> {
    let first = head?;
    if next[first].is_none() {
        return head;
    }

    let mid = split(next, first);
    let left = merge_sort(books, next, Some(first), key);
    let right = merge_sort(books, next, mid, key);

    merge(books, next, left, right, key)
}

/// Cut the run starting at `head` in two and return the head of the second half
fn split(next: &mut [Option<usize>], head: usize) -> Option<usize> {
    let mut slow = head;
    let mut fast = next[head];

    while let Some(f) = fast {
        let Some(after) = next[f] else { break };
        match next[slow] {
            Some(s) => slow = s,
            None => break,
        }
        fast = next[after];
    }

    next[slow].take()
}

fn merge(
    books: &[BookRecord],
    next: &mut [Option<usize>],
    mut left: Option<usize>,
    mut right: Option<usize>,
    key: SortKey,
) -> Option<usize> {
    let mut head = None;
    let mut tail: Option<usize> = None;

    loop {
        let (taken, done) = match (left, right) {
            (Some(l), Some(r)) => {
                if key.less(&books[l], &books[r]) {
                    left = next[l];
                    (l, false)
                } else {
                    // Equal keys: right run wins
                    right = next[r];
                    (r, false)
                }
            }
            // Remaining run is already linked, attach it whole
            (Some(rest), None) | (None, Some(rest)) => (rest, true),
            (None, None) => break,
        };

        match tail {
            Some(t) => next[t] = Some(taken),
            None => head = Some(taken),
        }
        tail = Some(taken);

        if done {
            break;
        }
    }

    head
}

// ============================================================================
// TESTS
// ============================================================================
