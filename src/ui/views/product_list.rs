use crate::catalog::{Product, ProductKey, ProductList, Session, StockSummary};
use crate::ui::components::{ConfirmDialog, KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{availability_color, format_price, stock_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::{ProductDetailView, ProductFormView};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use std::cmp::Ordering;

const HEADERS: [&str; 9] = [
  "ID", "TITLE", "BRAND", "CATEGORY", "PRICE", "DISC%", "STOCK", "STATUS", "RATING",
];

/// Column the displayed page is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortColumn {
  Title,
  Category,
  Price,
  Rating,
  Stock,
}

impl SortColumn {
  /// Next step of the `s` cycle. `None` keeps the server's order.
  fn cycle(current: Option<Self>) -> Option<Self> {
    match current {
      None => Some(Self::Title),
      Some(Self::Title) => Some(Self::Category),
      Some(Self::Category) => Some(Self::Price),
      Some(Self::Price) => Some(Self::Rating),
      Some(Self::Rating) => Some(Self::Stock),
      Some(Self::Stock) => None,
    }
  }

  fn header(self) -> &'static str {
    match self {
      Self::Title => "TITLE",
      Self::Category => "CATEGORY",
      Self::Price => "PRICE",
      Self::Rating => "RATING",
      Self::Stock => "STOCK",
    }
  }

  fn compare(self, a: &Product, b: &Product) -> Ordering {
    match self {
      Self::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
      Self::Category => a.category.cmp(&b.category),
      Self::Price => a.price.total_cmp(&b.price),
      Self::Rating => a.rating.total_cmp(&b.rating),
      Self::Stock => a.stock.cmp(&b.stock),
    }
  }
}

/// Paginated product table with search
pub struct ProductListView {
  table_state: TableState,
  search: SearchInput,
  confirm: ConfirmDialog<u64>,
  /// Source shown during the last tick
  source: Option<ProductKey>,
  /// Previous source's data, kept on screen while the new one loads
  placeholder: Option<ProductList>,
  sort: Option<SortColumn>,
  descending: bool,
}

impl Default for ProductListView {
  fn default() -> Self {
    Self::new()
  }
}

impl ProductListView {
  pub fn new() -> Self {
    Self {
      table_state: TableState::default().with_selected(Some(0)),
      search: SearchInput::new(),
      confirm: ConfirmDialog::new(),
      source: None,
      placeholder: None,
      sort: None,
      descending: false,
    }
  }

  /// What to draw: the active source if cached, else the placeholder.
  /// The flag is true when the placeholder is used.
  fn displayed<'a>(&'a self, session: &'a Session) -> Option<(&'a ProductList, bool)> {
    match session.store.peek_list(&session.active_source()).value() {
      Some(list) => Some((list, false)),
      None => self.placeholder.as_ref().map(|list| (list, true)),
    }
  }

  /// Products of `list` in on-screen order
  fn rows<'a>(&self, list: &'a ProductList) -> Vec<&'a Product> {
    let mut rows: Vec<&Product> = list.products.iter().collect();
    if let Some(column) = self.sort {
      rows.sort_by(|a, b| {
        let order = column.compare(a, b).then(a.id.cmp(&b.id));
        if self.descending {
          order.reverse()
        } else {
          order
        }
      });
    }
    rows
  }

  fn selected_product<'a>(&'a self, session: &'a Session) -> Option<&'a Product> {
    let (list, _) = self.displayed(session)?;
    self.rows(list).get(self.table_state.selected()?).copied()
  }

  /// Reorder the page, keeping the selected product under the cursor
  fn set_sort(&mut self, sort: Option<SortColumn>, descending: bool, session: &Session) {
    let selected = self.selected_product(session).map(|p| p.id);
    self.sort = sort;
    self.descending = descending;
    let position = match (selected, self.displayed(session)) {
      (Some(id), Some((list, _))) => self.rows(list).iter().position(|p| p.id == id),
      _ => None,
    };
    self.table_state.select(Some(position.unwrap_or(0)));
  }

  fn summary(&self, session: &Session) -> Option<StockSummary> {
    self.displayed(session).map(|(list, _)| list.stock_summary())
  }

  fn move_selection(&mut self, delta: isize, session: &Session) {
    let len = self.displayed(session).map(|(l, _)| l.products.len()).unwrap_or(0);
    if len == 0 {
      return;
    }
    let current = self.table_state.selected().unwrap_or(0) as isize;
    let next = (current + delta).clamp(0, len as isize - 1);
    self.table_state.select(Some(next as usize));
  }

  fn next_page(&mut self, session: &mut Session) {
    if session.search.is_searching() {
      return;
    }
    let known_total = session
      .store
      .peek_list(&session.pagination.key())
      .value()
      .map(|l| l.total);
    // Unknown total (still loading): let the user move on anyway
    if known_total.map_or(true, |total| session.pagination.has_next(total)) {
      session.pagination.next_page();
    }
  }

  fn title(&self, session: &Session) -> String {
    let key = session.active_source();
    let lookup = session.store.peek_list(&key);

    let heading = match &key {
      ProductKey::Search { query } => format!("Search \"{}\"", query),
      _ => "Products".to_string(),
    };
    let count = match (lookup.value(), &key) {
      (Some(list), ProductKey::Search { .. }) => format!(" ({})", list.total),
      (Some(list), _) => format!(
        " [{}-{} of {}]",
        (list.skip + 1).min(list.total),
        list.skip + list.products.len() as u64,
        list.total
      ),
      (None, _) => String::new(),
    };
    let status = if let Some(error) = session.store.error(&key).filter(|_| lookup.is_miss()) {
      format!(" (error: {})", error)
    } else if lookup.is_miss() {
      " (loading...)".to_string()
    } else if session.store.is_fetching(&key) {
      " (refreshing...)".to_string()
    } else {
      String::new()
    };

    format!(" {}{}{} ", heading, count, status)
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect, session: &Session) {
    let block = Block::default()
      .title(self.title(session))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let products: Vec<Product> = match self.displayed(session) {
      Some((list, _)) => self.rows(list).into_iter().cloned().collect(),
      None => Vec::new(),
    };

    if products.is_empty() {
      let key = session.active_source();
      let content = if session.store.peek(&key).is_miss() && session.store.error(&key).is_some() {
        "Failed to load products. Press 'r' to retry."
      } else if session.store.peek(&key).is_miss() {
        "Loading products..."
      } else if session.search.is_searching() {
        "No products match this search."
      } else {
        "No products on this page."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    ensure_valid_selection(&mut self.table_state, products.len());

    let arrow = if self.descending { "▼" } else { "▲" };
    let header = Row::new(HEADERS.iter().map(|&label| match self.sort {
      Some(column) if column.header() == label => format!("{}{}", label, arrow),
      _ => label.to_string(),
    }))
    .style(Style::default().fg(Color::White).bold());

    let rows: Vec<Row> = products
      .iter()
      .map(|p| {
        Row::new(vec![
          Cell::from(p.id.to_string()).style(Style::default().fg(Color::Cyan)),
          Cell::from(truncate(&p.title, 40)),
          Cell::from(truncate(&p.brand, 16)),
          Cell::from(truncate(&p.category, 16)),
          Cell::from(format_price(p.price)),
          Cell::from(format!("{:.1}", p.discount_percentage)),
          Cell::from(p.stock.to_string()).style(Style::default().fg(stock_color(p.stock))),
          Cell::from(p.availability_status.label())
            .style(Style::default().fg(availability_color(p.availability_status))),
          Cell::from(format!("{:.1}", p.rating)),
        ])
      })
      .collect();

    let widths = [
      Constraint::Length(5),
      Constraint::Min(20),
      Constraint::Length(16),
      Constraint::Length(16),
      Constraint::Length(10),
      Constraint::Length(6),
      Constraint::Length(6),
      Constraint::Length(13),
      Constraint::Length(7),
    ];

    let table = Table::new(rows, widths)
      .header(header)
      .block(block)
      .row_highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut self.table_state);
  }

  fn render_summary(&self, frame: &mut Frame, area: Rect, session: &Session) {
    let Some(summary) = self.summary(session) else {
      return;
    };
    let dim = Style::default().fg(Color::DarkGray);
    let line = Line::from(vec![
      Span::styled(format!(" {} products", summary.total), Style::default().fg(Color::Cyan)),
      Span::styled(" · ", dim),
      Span::raw(format!("{} in stock", summary.in_stock())),
      Span::styled("  |  ", dim),
      Span::styled(
        format!("well stocked {}", summary.well_stocked),
        Style::default().fg(Color::Green),
      ),
      Span::styled("  ", dim),
      Span::styled(
        format!("low {}", summary.low_stock),
        Style::default().fg(Color::Yellow),
      ),
      Span::styled("  ", dim),
      Span::styled(
        format!("out {}", summary.out_of_stock),
        Style::default().fg(Color::Red),
      ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
  }
}

impl View for ProductListView {
  fn handle_key(&mut self, key: KeyEvent, session: &mut Session) -> ViewAction {
    match self.confirm.handle_key(key) {
      KeyResult::Event(id) => {
        if !session.mutations.delete(id) {
          session.notices.error("Another delete is still in progress");
        }
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(query)) => {
        session.search.set_input(query);
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Cleared) => {
        session.search.clear();
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('/') => self.search.activate(session.search.input()),
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(1, session),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1, session),
      KeyCode::Char('g') | KeyCode::Home => self.table_state.select(Some(0)),
      KeyCode::Char('n') | KeyCode::Right => self.next_page(session),
      KeyCode::Char('p') | KeyCode::Left => {
        if !session.search.is_searching() {
          session.pagination.previous_page();
        }
      }
      KeyCode::Char('+') | KeyCode::Char('=') => session.pagination.cycle_page_size(true),
      KeyCode::Char('-') => session.pagination.cycle_page_size(false),
      KeyCode::Char('r') => session.refresh_active(),
      KeyCode::Char('s') => self.set_sort(SortColumn::cycle(self.sort), self.descending, session),
      KeyCode::Char('S') => self.set_sort(self.sort, !self.descending, session),
      KeyCode::Char('a') => return ViewAction::Push(Box::new(ProductFormView::create())),
      KeyCode::Char('e') => {
        if let Some(product) = self.selected_product(session) {
          return ViewAction::Push(Box::new(ProductFormView::edit(product)));
        }
      }
      KeyCode::Char('d') => {
        if let Some(product) = self.selected_product(session) {
          let question = format!("Delete \"{}\" (#{})?", truncate(&product.title, 30), product.id);
          let id = product.id;
          self.confirm.ask(id, question);
        }
      }
      KeyCode::Enter => {
        if let Some(product) = self.selected_product(session) {
          return ViewAction::Push(Box::new(ProductDetailView::new(product)));
        }
      }
      KeyCode::Esc => {
        if session.search.is_searching() || !session.search.input().is_empty() {
          session.search.clear();
        }
      }
      KeyCode::Char('q') => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, session: &Session) {
    let [table_area, summary_area] =
      Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
    self.render_table(frame, table_area, session);
    self.render_summary(frame, summary_area, session);
    self
      .search
      .render_overlay(frame, area, session.search.is_settling());
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Products".to_string()
  }

  fn tick(&mut self, session: &mut Session) -> ViewAction {
    let key = session.active_source();
    if self.source.as_ref() != Some(&key) {
      if let Some(previous) = self.source.take() {
        // Hold on to what was on screen until the new source arrives
        if let Some(list) = session.store.peek_list(&previous).value() {
          self.placeholder = Some(list.clone());
        }
      }
      self.table_state.select(Some(0));
      self.source = Some(key);
    }

    if session.request_active().value().is_some() {
      self.placeholder = None;
    }
    ViewAction::None
  }

  fn source_label(&self, session: &Session) -> Option<String> {
    let label = match session.active_source() {
      ProductKey::Search { query } => format!("search: {}", query),
      key => {
        let page = session.pagination.page_index() + 1;
        match session.store.peek_list(&key).value() {
          Some(list) => format!(
            "page {}/{} · {} per page",
            page,
            session.pagination.page_count(list.total),
            session.pagination.page_size()
          ),
          None => format!("page {} · {} per page", page, session.pagination.page_size()),
        }
      }
    };
    Some(label)
  }

  fn is_editing(&self) -> bool {
    self.search.is_active() || self.confirm.is_active()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("/", "search").with_priority(20),
      Shortcut::new("a", "add").with_priority(30),
      Shortcut::new("e", "edit").with_priority(31),
      Shortcut::new("d", "delete").with_priority(32),
      Shortcut::new("n/p", "page").with_priority(40),
      Shortcut::new("+/-", "size").with_priority(41),
      Shortcut::new("s/S", "sort").with_priority(42),
      Shortcut::new("q", "quit").with_priority(90),
    ]
  }
}
