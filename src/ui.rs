use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use library_inventory::{BookRecord, Library, Loan, SortKey, SortOutcome};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

const PAGE_SIZE: usize = 20;

pub struct App<'a> {
    pub library: &'a mut Library,
    pub state: TableState,
    pub show_detail: bool,
    pub last_sort: Option<SortOutcome>,
}

impl<'a> App<'a> {
    pub fn new(library: &'a mut Library) -> Self {
        let mut state = TableState::default();
        if !library.inventory().is_empty() {
            state.select(Some(0));
        }

        Self {
            library,
            state,
            show_detail: false,
            last_sort: None,
        }
    }

    fn len(&self) -> usize {
        self.library.inventory().len()
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_book(&self) -> Option<&BookRecord> {
        self.state
            .selected()
            .and_then(|i| self.library.inventory().iter().nth(i))
    }

    /// Loans still open against the selected book's id
    pub fn selected_loans(&self) -> Vec<&Loan> {
        match self.selected_book() {
            Some(book) => self
                .library
                .ledger()
                .loans()
                .filter(|loan| loan.book_id == book.id)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn sort(&mut self, key: SortKey) {
        self.last_sort = Some(self.library.sort(key));
        if self.len() > 0 {
            self.state.select(Some(0));
        }
    }

    pub fn next(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + PAGE_SIZE).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let i = match self.state.selected() {
            Some(i) => i.saturating_sub(PAGE_SIZE),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn stats(&self) -> InventoryStats {
        let mut stats = InventoryStats::default();

        for book in self.library.inventory().iter() {
            stats.books += 1;
            stats.copies += u64::from(book.quantity);
            if book.quantity == 0 {
                stats.out_of_stock += 1;
            }
        }
        stats.on_loan = self.library.ledger().len();

        stats
    }
}

#[derive(Default)]
pub struct InventoryStats {
    pub books: usize,
    pub copies: u64,
    pub out_of_stock: usize,
    pub on_loan: usize,
}

/// Browse the inventory full-screen until the user quits
pub fn run_browser(library: &mut Library) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(library);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "inventory browser failed");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App<'_>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Char('t') => app.sort(SortKey::Title),
                KeyCode::Char('y') => app.sort(SortKey::Year),
                KeyCode::Char('i') => app.sort(SortKey::Id),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    if app.len() > 0 {
                        app.state.select(Some(app.len() - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App<'_>) {
    let stats = app.stats();

    let mut spans = vec![
        Span::styled(
            "Library Collection",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ),
        Span::raw("  |  "),
        Span::styled(format!("Books: {}", stats.books), Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled(format!("Copies: {}", stats.copies), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled(
            format!("Out of stock: {}", stats.out_of_stock),
            Style::default().fg(Color::Red),
        ),
        Span::raw("  "),
        Span::styled(format!("On loan: {}", stats.on_loan), Style::default().fg(Color::Cyan)),
    ];

    if let Some(SortOutcome::Sorted(key)) = app.last_sort {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("Sorted by {}", key.as_str()),
            Style::default().fg(Color::Magenta),
        ));
    }

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App<'_>) {
    let header_cells = ["ID", "Title", "Year", "Quantity"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.library.inventory().iter().map(|book| {
        let color = if book.is_available() { Color::Green } else { Color::Red };

        Row::new(vec![
            Cell::from(book.id.to_string()),
            Cell::from(truncate(&book.title, 40)),
            Cell::from(book.year.to_string()),
            Cell::from(book.quantity.to_string()).style(Style::default().fg(color)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(42),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Books "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App<'_>) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let status_spans = vec![
        Span::styled(
            format!(" Row: {}/{} ", selected, app.len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | Sort: "),
        key("t"),
        Span::raw(" Title "),
        key("y"),
        Span::raw(" Year "),
        key("i"),
        Span::raw(" Id | "),
        key("Enter"),
        Span::raw(" Details | "),
        key("↑/↓"),
        Span::raw(" Nav | "),
        key("PgUp/PgDn"),
        Span::raw(" Fast | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Back"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App<'_>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Book Details ");

    let book = match app.selected_book() {
        Some(b) => b,
        None => {
            f.render_widget(Paragraph::new("No book selected").block(block), area);
            return;
        }
    };

    let label = |text: &'static str| {
        Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![label("  ID: "), Span::raw(book.id.to_string())]),
        Line::from(""),
        Line::from(vec![label("  Title: "), Span::raw(book.title.clone())]),
        Line::from(""),
        Line::from(vec![label("  Year: "), Span::raw(book.year.to_string())]),
        Line::from(""),
        Line::from(vec![
            label("  On shelf: "),
            Span::styled(
                book.quantity.to_string(),
                Style::default().fg(if book.is_available() { Color::Green } else { Color::Red }),
            ),
        ]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  LOANS",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )]),
        Line::from(""),
    ];

    let loans = app.selected_loans();
    if loans.is_empty() {
        content.push(Line::from(Span::styled(
            "  No active loans",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    for loan in loans {
        content.push(Line::from(vec![
            label("  Due: "),
            Span::styled(
                loan.expires_at.format("%Y-%m-%d %H:%M UTC").to_string(),
                Style::default().fg(Color::Green),
            ),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Press Enter to close",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stocked() -> Library {
        let mut library = Library::new();
        library.add_book(1, "Alpha", 2000, 2);
        library.add_book(2, "Beta", 1990, 0);
        library.add_book(3, "Gamma", 2010, 1);
        library
    }

    #[test]
    fn test_navigation_wraps() {
        let mut library = stocked();
        let mut app = App::new(&mut library);

        assert_eq!(app.state.selected(), Some(0));
        app.previous();
        assert_eq!(app.state.selected(), Some(2));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.page_down();
        assert_eq!(app.state.selected(), Some(2));
        app.page_up();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_sort_resets_selection() {
        let mut library = stocked();
        let mut app = App::new(&mut library);
        app.next();

        app.sort(SortKey::Year);
        assert_eq!(app.state.selected(), Some(0));
        assert_eq!(app.selected_book().unwrap().title, "Beta");
        assert_eq!(app.last_sort, Some(SortOutcome::Sorted(SortKey::Year)));
    }

    #[test]
    fn test_stats_and_loans() {
        let mut library = stocked();
        library.borrow(1, chrono::Utc::now()).unwrap();

        let mut app = App::new(&mut library);
        let stats = app.stats();
        assert_eq!(stats.books, 3);
        assert_eq!(stats.copies, 2);
        assert_eq!(stats.out_of_stock, 1);
        assert_eq!(stats.on_loan, 1);

        app.sort(SortKey::Id);
        assert_eq!(app.selected_loans().len(), 1);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Short", 10), "Short");
        assert_eq!(truncate("A very long title indeed", 10), "A very ...");
    }
}
