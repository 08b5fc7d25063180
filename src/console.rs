// 🖥️ Console - Role menus over the library core
//
// Line-oriented: every prompt reads exactly one line. End of input anywhere
// ends the session cleanly. Input and output are generic so the menus can be
// driven from in-memory buffers.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use library_inventory::{
    AddOutcome, BookRecord, Inventory, Library, LibraryError, SortKey, SortOutcome, Undone,
};
use std::io::{BufRead, Write};
use std::str::FromStr;

/// ctime-style due date
const DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y UTC";

/// Whether the session keeps going after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The command was abandoned on unparseable input
    Rejected(String),
    /// Leave the current menu
    Back,
    /// Input is exhausted
    Closed,
}

/// One answer to a prompt
enum Reply<T> {
    Value(T),
    Invalid(String),
    Closed,
}

/// Unwrap a prompt reply inside a command handler, leaving the command on
/// bad input or end of input.
macro_rules! ask {
    ($reply:expr) => {
        match $reply? {
            Reply::Value(value) => value,
            Reply::Invalid(raw) => return Ok(Flow::Rejected(raw)),
            Reply::Closed => return Ok(Flow::Closed),
        }
    };
}

pub struct Console<R, W> {
    input: R,
    out: W,

    /// Open the interactive browser for "Display All"
    #[cfg_attr(not(feature = "tui"), allow(dead_code))]
    browse: bool,

    /// Source of the current time for loans and expiry sweeps
    clock: fn() -> DateTime<Utc>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Console {
            input,
            out,
            browse: false,
            clock: Utc::now,
        }
    }

    pub fn with_browser(mut self, browse: bool) -> Self {
        self.browse = browse;
        self
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.out
    }

    // ========================================================================
    // MENUS
    // ========================================================================

    /// Role selection loop; returns when the user picks Exit or input ends
    pub fn run(&mut self, library: &mut Library) -> Result<()> {
        loop {
            write!(
                self.out,
                "\nSelect your role: \n1. Admin Panel\n2. Student Panel\n3. Exit\nEnter your choice: "
            )?;

            let flow = match self.read_number::<i32>()? {
                Reply::Value(1) => self.admin_panel(library)?,
                Reply::Value(2) => self.student_panel(library)?,
                Reply::Value(3) | Reply::Closed => return Ok(()),
                Reply::Value(_) | Reply::Invalid(_) => {
                    writeln!(self.out, "Invalid choice. Try again.")?;
                    Flow::Continue
                }
            };

            match flow {
                Flow::Closed => return Ok(()),
                Flow::Rejected(raw) => self.report(&LibraryError::InvalidOption(raw))?,
                Flow::Continue | Flow::Back => {}
            }
        }
    }

    fn admin_panel(&mut self, library: &mut Library) -> Result<Flow> {
        loop {
            write!(
                self.out,
                "\nAdmin Panel\n1. Add Book\n2. Remove Book\n3. Display All Books\n4. Search Book \n5. Sort Books \n6. Undo Last Action\n7. Exit\nEnter your choice: "
            )?;

            let flow = match self.read_number::<i32>()? {
                Reply::Value(1) => self.add_book(library)?,
                Reply::Value(2) => self.remove_book(library)?,
                Reply::Value(3) => self.display_all(library)?,
                Reply::Value(4) => self.search(library)?,
                Reply::Value(5) => self.sort(library)?,
                Reply::Value(6) => self.undo(library)?,
                Reply::Value(7) => {
                    writeln!(self.out, "Exiting...")?;
                    Flow::Back
                }
                Reply::Closed => Flow::Closed,
                Reply::Value(_) | Reply::Invalid(_) => {
                    writeln!(self.out, "Invalid choice. Try again.")?;
                    Flow::Continue
                }
            };

            match flow {
                Flow::Continue => {}
                Flow::Rejected(raw) => self.report(&LibraryError::InvalidOption(raw))?,
                Flow::Back => return Ok(Flow::Continue),
                Flow::Closed => return Ok(Flow::Closed),
            }
        }
    }

    fn student_panel(&mut self, library: &mut Library) -> Result<Flow> {
        loop {
            write!(
                self.out,
                "\nStudent Panel\n1. Search Book\n2. Display All Books\n3. Sort Books \n4. Borrow Book\n5. Return Book\n6. Check Expiry Dates\n7. Exit\nEnter your choice: "
            )?;

            let flow = match self.read_number::<i32>()? {
                Reply::Value(1) => self.search_title(library)?,
                Reply::Value(2) => self.display_all(library)?,
                Reply::Value(3) => self.sort(library)?,
                Reply::Value(4) => self.borrow(library)?,
                Reply::Value(5) => self.return_book(library)?,
                Reply::Value(6) => self.check_expiry(library)?,
                Reply::Value(7) => {
                    writeln!(self.out, "Exiting...")?;
                    Flow::Back
                }
                Reply::Closed => Flow::Closed,
                Reply::Value(_) | Reply::Invalid(_) => {
                    writeln!(self.out, "Invalid choice. Try again.")?;
                    Flow::Continue
                }
            };

            match flow {
                Flow::Continue => {}
                Flow::Rejected(raw) => self.report(&LibraryError::InvalidOption(raw))?,
                Flow::Back => return Ok(Flow::Continue),
                Flow::Closed => return Ok(Flow::Closed),
            }
        }
    }

    // ========================================================================
    // ADMIN COMMANDS
    // ========================================================================

    fn add_book(&mut self, library: &mut Library) -> Result<Flow> {
        let id = ask!(self.prompt_number::<i32>("Enter book ID: "));
        let title = ask!(self.prompt_line("Enter book title: "));
        let year = ask!(self.prompt_number::<i32>("Enter book year: "));
        let quantity = ask!(self.prompt_number::<u32>("Enter book quantity: "));

        match library.add_book(id, &title, year, quantity) {
            AddOutcome::Added(book) => {
                writeln!(self.out, "Book added successfully: {}", book.title)?;
            }
            AddOutcome::Merged(book) => self.print_merged(&book)?,
        }
        Ok(Flow::Continue)
    }

    fn remove_book(&mut self, library: &mut Library) -> Result<Flow> {
        let id = ask!(self.prompt_number::<i32>("Enter book ID to remove: "));

        match library.remove_book(id) {
            Ok(_) => writeln!(self.out, "Book removed successfully.")?,
            Err(err) => self.report(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn search(&mut self, library: &mut Library) -> Result<Flow> {
        match ask!(self.prompt_number::<i32>("Search by (1: Title 2: Book ID): ")) {
            1 => self.search_title(library),
            2 => {
                let id = ask!(self.prompt_number::<i32>("Enter book id to search: "));
                let results = library.search_by_id(id);
                if results.clone().next().is_none() {
                    writeln!(self.out, "No book found with the Book ID \"{}\".", id)?;
                } else {
                    self.print_found(results)?;
                }
                Ok(Flow::Continue)
            }
            _ => {
                writeln!(self.out, "Invalid choice ")?;
                Ok(Flow::Continue)
            }
        }
    }

    fn undo(&mut self, library: &mut Library) -> Result<Flow> {
        match library.undo() {
            Ok(Undone::AddReverted(_)) => writeln!(self.out, "Book removed successfully.")?,
            Ok(Undone::RemoveReverted(AddOutcome::Added(book))) => {
                writeln!(self.out, "Book added successfully: {}", book.title)?;
            }
            Ok(Undone::RemoveReverted(AddOutcome::Merged(book))) => self.print_merged(&book)?,
            Err(LibraryError::EmptyHistory) => {
                self.report(&LibraryError::EmptyHistory)?;
                return Ok(Flow::Continue);
            }
            // The entry is gone even though its inverse missed
            Err(err) => self.report(&err)?,
        }

        writeln!(self.out, "Last action undone.")?;
        Ok(Flow::Continue)
    }

    // ========================================================================
    // SHARED / STUDENT COMMANDS
    // ========================================================================

    fn search_title(&mut self, library: &mut Library) -> Result<Flow> {
        let title = ask!(self.prompt_line("Enter book title to search: "));
        let results = library.search_by_title(&title);

        if results.clone().next().is_none() {
            writeln!(self.out, "No book found with the title \"{}\".", title)?;
        } else {
            self.print_found(results)?;
        }
        Ok(Flow::Continue)
    }

    fn display_all(&mut self, library: &mut Library) -> Result<Flow> {
        #[cfg(feature = "tui")]
        {
            if self.browse && !library.inventory().is_empty() {
                crate::ui::run_browser(library)?;
                return Ok(Flow::Continue);
            }
        }

        self.print_books(library.inventory())?;
        Ok(Flow::Continue)
    }

    fn sort(&mut self, library: &mut Library) -> Result<Flow> {
        let option = ask!(self.prompt_number::<i32>("Sort by (1: Title 2: Year 3: Book ID): "));

        let key = match SortKey::from_option(option) {
            Some(key) => key,
            None => {
                self.report(&LibraryError::InvalidOption(option.to_string()))?;
                SortKey::default()
            }
        };

        match library.sort(key) {
            SortOutcome::NotRequired => {
                writeln!(
                    self.out,
                    "Sorting not required for an empty or single book list."
                )?;
            }
            SortOutcome::Sorted(_) => {
                writeln!(self.out, "Books sorted successfully.")?;
                self.print_books(library.inventory())?;
            }
        }
        Ok(Flow::Continue)
    }

    fn borrow(&mut self, library: &mut Library) -> Result<Flow> {
        let id = ask!(self.prompt_number::<i32>("Enter book ID to borrow: "));

        match library.borrow(id, (self.clock)()) {
            Ok(receipt) => {
                writeln!(
                    self.out,
                    "Book borrowed successfully: {}. Return by: {}",
                    receipt.loan.title,
                    receipt.loan.expires_at.format(DATE_FORMAT)
                )?;
            }
            Err(err) => self.report(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn return_book(&mut self, library: &mut Library) -> Result<Flow> {
        let id = ask!(self.prompt_number::<i32>("Enter book ID to return: "));

        match library.return_book(id) {
            Ok(receipt) => {
                writeln!(self.out, "Book returned successfully: {}", receipt.title)?;
                if receipt.loan_found() {
                    writeln!(self.out, "Returned book removed from borrowed list.")?;
                } else {
                    writeln!(self.out, "Book not found in borrowed list.")?;
                }
            }
            Err(err) => self.report(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn check_expiry(&mut self, library: &mut Library) -> Result<Flow> {
        let report = library.check_expiry((self.clock)());

        if report.no_loans() {
            writeln!(self.out, "No borrowed books in the queue.")?;
            return Ok(Flow::Continue);
        }

        writeln!(self.out, "\nBooks nearing expiry:")?;
        writeln!(self.out, "{:>5}{:>20}{:>30}", "ID", "Title", "Expiry Date")?;
        writeln!(self.out, "{}", "-".repeat(55))?;

        for entry in &report.entries {
            let due = if entry.expired {
                "Expired".to_string()
            } else {
                entry.loan.expires_at.format(DATE_FORMAT).to_string()
            };
            writeln!(
                self.out,
                "{:>5}{:>20}{:>30}",
                entry.loan.book_id, entry.loan.title, due
            )?;
        }

        if report.nothing_active() {
            writeln!(self.out, "No books are nearing expiry.")?;
        }
        Ok(Flow::Continue)
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    fn print_books(&mut self, inventory: &Inventory) -> Result<()> {
        if inventory.is_empty() {
            writeln!(self.out, "The library is empty.")?;
            return Ok(());
        }

        writeln!(self.out, "\nLibrary Collection:")?;
        writeln!(self.out, "{:>5}{:>20}{:>10}{:>10}", "ID", "Title", "Year", "Quantity")?;
        writeln!(self.out, "{}", "-".repeat(50))?;
        for book in inventory.iter() {
            writeln!(
                self.out,
                "{:>5}{:>20}{:>10}{:>10}",
                book.id, book.title, book.year, book.quantity
            )?;
        }
        Ok(())
    }

    fn print_found<'a>(&mut self, books: impl Iterator<Item = &'a BookRecord>) -> Result<()> {
        for book in books {
            writeln!(self.out, "\nBook Found: ")?;
            writeln!(
                self.out,
                "ID: {}, Title: {}, Year: {}, Quantity: {}",
                book.id, book.title, book.year, book.quantity
            )?;
        }
        Ok(())
    }

    fn print_merged(&mut self, book: &BookRecord) -> Result<()> {
        writeln!(
            self.out,
            "Updated quantity for existing book: {} (ID: {}), New Quantity: {}",
            book.title, book.id, book.quantity
        )?;
        Ok(())
    }

    fn report(&mut self, err: &LibraryError) -> Result<()> {
        writeln!(self.out, "{}", err)?;
        Ok(())
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    /// Read one line, without its line ending. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from console")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn read_number<T: FromStr>(&mut self) -> Result<Reply<T>> {
        Ok(match self.read_line()? {
            None => Reply::Closed,
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(value) => Reply::Value(value),
                Err(_) => Reply::Invalid(raw.trim().to_string()),
            },
        })
    }

    fn prompt_line(&mut self, prompt: &str) -> Result<Reply<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush().context("Failed to flush console")?;
        Ok(match self.read_line()? {
            Some(line) => Reply::Value(line),
            None => Reply::Closed,
        })
    }

    fn prompt_number<T: FromStr>(&mut self, prompt: &str) -> Result<Reply<T>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush().context("Failed to flush console")?;
        self.read_number()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Cursor;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    /// Drive the menus with `script` and return everything printed
    fn run_script(library: &mut Library, script: &str) -> String {
        let mut console =
            Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new()).with_clock(fixed_now);
        console.run(library).unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn test_exit_from_role_menu() {
        let mut library = Library::new();
        let output = run_script(&mut library, "3\n");
        assert!(output.contains("Select your role"));
        assert!(!output.contains("Admin Panel\n1."));
    }

    #[test]
    fn test_end_of_input_ends_session() {
        let mut library = Library::new();
        let output = run_script(&mut library, "1\n1\n10\n");
        // Stopped while asking for the title
        assert!(output.ends_with("Enter book title: "));
        assert!(library.inventory().is_empty());
    }

    #[test]
    fn test_admin_add_and_display() {
        let mut library = Library::new();
        let output = run_script(
            &mut library,
            "1\n1\n1\nThe Hobbit\n1937\n3\n1\n1\nThe Hobbit\n1937\n2\n3\n7\n3\n",
        );

        assert!(output.contains("Book added successfully: The Hobbit"));
        assert!(output.contains(
            "Updated quantity for existing book: The Hobbit (ID: 1), New Quantity: 5"
        ));
        assert!(output.contains("\nLibrary Collection:\n"));
        assert!(output.contains("   ID               Title      Year  Quantity\n"));
        assert!(output.contains("    1          The Hobbit      1937         5\n"));
        assert!(output.contains("Exiting..."));
    }

    #[test]
    fn test_display_empty_library() {
        let mut library = Library::new();
        let output = run_script(&mut library, "2\n2\n7\n3\n");
        assert!(output.contains("The library is empty."));
    }

    #[test]
    fn test_admin_remove_and_undo() {
        let mut library = Library::new();
        library.add_book(4, "Dune", 1965, 2);

        let output = run_script(&mut library, "1\n2\n4\n6\n6\n6\n7\n3\n");

        assert!(output.contains("Book removed successfully."));
        // Undo of the removal re-adds the book
        assert!(output.contains("Book added successfully: Dune"));
        assert!(output.contains("Last action undone."));
        assert!(output.contains("No actions to undo."));
        // Second undo reverts the original add
        assert!(library.inventory().is_empty());
    }

    #[test]
    fn test_remove_unknown_book() {
        let mut library = Library::new();
        let output = run_script(&mut library, "1\n2\n99\n7\n3\n");
        assert!(output.contains("No book found with ID 99"));
    }

    #[test]
    fn test_invalid_number_abandons_command() {
        let mut library = Library::new();
        let output = run_script(&mut library, "1\n1\nabc\n7\n3\n");
        assert!(output.contains("Invalid choice: abc"));
        assert!(library.inventory().is_empty());
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let mut library = Library::new();
        let output = run_script(&mut library, "1\n1\n1\nAlpha\n2000\n-1\n7\n3\n");
        assert!(output.contains("Invalid choice: -1"));
        assert!(library.inventory().is_empty());
    }

    #[test]
    fn test_invalid_menu_choice() {
        let mut library = Library::new();
        let output = run_script(&mut library, "9\n1\n42\n7\n3\n");
        assert_eq!(output.matches("Invalid choice. Try again.").count(), 2);
    }

    #[test]
    fn test_search_by_title_and_id() {
        let mut library = Library::new();
        library.add_book(1, "Emma", 1815, 1);
        library.add_book(2, "Dune", 1965, 2);

        let output = run_script(&mut library, "1\n4\n1\nDune\n4\n2\n1\n4\n2\n8\n4\n5\n7\n3\n");

        assert!(output.contains("Book Found: \nID: 2, Title: Dune, Year: 1965, Quantity: 2"));
        assert!(output.contains("Book Found: \nID: 1, Title: Emma, Year: 1815, Quantity: 1"));
        assert!(output.contains("No book found with the Book ID \"8\"."));
        assert!(output.contains("Invalid choice \n"));
    }

    #[test]
    fn test_student_search_missing_title() {
        let mut library = Library::new();
        let output = run_script(&mut library, "2\n1\nNothing Here\n7\n3\n");
        assert!(output.contains("No book found with the title \"Nothing Here\"."));
    }

    #[test]
    fn test_sort_outputs() {
        let mut library = Library::new();
        let output = run_script(&mut library, "2\n3\n1\n7\n3\n");
        assert!(output.contains("Sorting not required for an empty or single book list."));

        library.add_book(1, "Alpha", 2000, 1);
        library.add_book(2, "Beta", 2001, 1);
        // Unknown option is reported, then sorts by title
        let output = run_script(&mut library, "2\n3\n9\n7\n3\n");
        assert!(output.contains("Invalid choice: 9"));
        assert!(output.contains("Books sorted successfully."));
        let ids: Vec<i32> = library.inventory().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2]);

        run_script(&mut library, "1\n5\n2\n7\n3\n");
        let ids: Vec<i32> = library.inventory().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_student_borrow_return_flow() {
        let mut library = Library::new();
        library.add_book(1, "Alpha", 2000, 1);

        let output = run_script(&mut library, "2\n4\n1\n4\n1\n6\n5\n1\n5\n1\n6\n7\n3\n");

        assert!(output.contains(
            "Book borrowed successfully: Alpha. Return by: Sat Jan 31 12:00:00 2026 UTC"
        ));
        assert!(output.contains("Sorry, the book is currently unavailable."));
        assert!(output.contains("Books nearing expiry:"));
        assert!(output.contains("    1               Alpha  Sat Jan 31 12:00:00 2026 UTC"));
        assert!(output.contains("Returned book removed from borrowed list."));
        assert!(output.contains("Book not found in borrowed list."));
        assert!(output.contains("No borrowed books in the queue."));
        assert_eq!(library.inventory().first_by_id(1).unwrap().quantity, 2);
    }

    #[test]
    fn test_expired_loans_are_reported() {
        let mut library = Library::new();
        library.add_book(1, "Alpha", 2000, 1);
        library
            .borrow(1, fixed_now() - chrono::Duration::days(40))
            .unwrap();

        let output = run_script(&mut library, "2\n6\n6\n7\n3\n");

        assert!(output.contains("    1               Alpha                       Expired"));
        assert!(output.contains("No books are nearing expiry."));
        assert!(output.contains("No borrowed books in the queue."));
        assert!(library.ledger().is_empty());
    }

    #[test]
    fn test_expiry_rows_follow_queue_order() {
        let mut library = Library::new();
        library.add_book(1, "Alpha", 2000, 1);
        library.add_book(2, "Beta", 2001, 1);
        library.add_book(3, "Gamma", 2002, 1);
        library
            .borrow(1, fixed_now() - chrono::Duration::days(40))
            .unwrap();
        library.borrow(2, fixed_now()).unwrap();
        library
            .borrow(3, fixed_now() - chrono::Duration::days(35))
            .unwrap();

        let output = run_script(&mut library, "2\n6\n7\n3\n");

        let rows = [
            format!("{:>5}{:>20}{:>30}", 1, "Alpha", "Expired"),
            format!("{:>5}{:>20}{:>30}", 2, "Beta", "Sat Jan 31 12:00:00 2026 UTC"),
            format!("{:>5}{:>20}{:>30}", 3, "Gamma", "Expired"),
        ];
        let positions: Vec<usize> = rows
            .iter()
            .map(|row| output.find(row.as_str()).unwrap())
            .collect();
        assert!(positions[0] < positions[1] && positions[1] < positions[2]);
        assert!(!output.contains("No books are nearing expiry."));

        let remaining: Vec<i32> = library.ledger().loans().map(|l| l.book_id).collect();
        assert_eq!(remaining, vec![2]);
    }

    #[test]
    fn test_return_unknown_book() {
        let mut library = Library::new();
        let output = run_script(&mut library, "2\n5\n3\n7\n3\n");
        assert!(output.contains("No book found with ID 3"));
    }
}
