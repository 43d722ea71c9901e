use crate::catalog::{MutationKind, MutationState, Product, ProductKey, Session};
use crate::ui::components::{ConfirmDialog, KeyResult};
use crate::ui::renderfns::{availability_color, format_price, stock_color};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::ProductFormView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Everything about one product, read from its per-id cache entry
pub struct ProductDetailView {
  id: u64,
  title: String,
  scroll: u16,
  confirm: ConfirmDialog<u64>,
  /// Set once this view asked for the product to be deleted
  deleting: bool,
}

impl ProductDetailView {
  pub fn new(product: &Product) -> Self {
    Self {
      id: product.id,
      title: product.title.clone(),
      scroll: 0,
      confirm: ConfirmDialog::new(),
      deleting: false,
    }
  }

  fn key(&self) -> ProductKey {
    ProductKey::detail(self.id)
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect, session: &Session) {
    let lookup = session.store.peek_product(self.id);
    let error = session.store.error(&self.key());

    let title = match (lookup.value(), error) {
      (None, Some(e)) => format!(" {} (error: {}) ", self.title, e),
      (None, None) => format!(" {} (loading...) ", self.title),
      (Some(_), _) if session.store.is_fetching(&self.key()) => {
        format!(" {} (refreshing...) ", self.title)
      }
      (Some(p), _) => format!(" {} ", p.title),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let Some(product) = lookup.value() else {
      let (text, color) = match error {
        Some(e) if e.is_not_found() => ("This product does not exist.".to_string(), Color::Red),
        Some(e) => (format!("Error: {}\n\nPress 'r' to retry.", e), Color::Red),
        None => ("Loading product details...".to_string(), Color::DarkGray),
      };
      let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(color));
      frame.render_widget(paragraph, area);
      return;
    };

    let paragraph = Paragraph::new(detail_lines(product))
      .block(block)
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));
    frame.render_widget(paragraph, area);
  }
}

fn field<'a>(label: &'a str, value: impl Into<Span<'a>>) -> Line<'a> {
  Line::from(vec![
    Span::styled(format!("{:<16}", label), Style::default().fg(Color::DarkGray)),
    value.into(),
  ])
}

fn section(title: &str) -> Line<'_> {
  Line::from(Span::styled(title, Style::default().fg(Color::Cyan).bold()))
}

fn detail_lines(p: &Product) -> Vec<Line<'_>> {
  let mut lines = vec![
    field("ID", p.id.to_string()),
    field("Title", p.title.as_str()),
    field("Brand", p.brand.as_str()),
    field("Category", p.category.as_str()),
    field("SKU", p.sku.as_str()),
    Line::default(),
    section("Pricing"),
    field("Price", format_price(p.price)),
    field("Discount", format!("{:.2}%", p.discount_percentage)),
    field(
      "Final price",
      Span::styled(
        format_price(p.discounted_price()),
        Style::default().fg(Color::Green).bold(),
      ),
    ),
    Line::default(),
    section("Inventory"),
    field(
      "Stock",
      Span::styled(p.stock.to_string(), Style::default().fg(stock_color(p.stock))),
    ),
    field(
      "Availability",
      Span::styled(
        p.availability_status.label(),
        Style::default().fg(availability_color(p.availability_status)),
      ),
    ),
    field("Min. order", p.minimum_order_quantity.to_string()),
    field("Weight", format!("{}", p.weight)),
  ];

  if let Some(d) = &p.dimensions {
    lines.push(field(
      "Dimensions",
      format!("{} x {} x {}", d.width, d.height, d.depth),
    ));
  }

  lines.extend([
    Line::default(),
    section("Policies"),
    field("Warranty", p.warranty_information.as_str()),
    field("Shipping", p.shipping_information.as_str()),
    field("Returns", p.return_policy.as_str()),
    Line::default(),
    section("Description"),
    Line::from(p.description.as_str()),
    Line::default(),
    field("Tags", p.tags.join(", ")),
    field("Images", p.images.len().to_string()),
    field("Rating", format!("{:.2} / 5", p.rating)),
  ]);

  if let Some(meta) = &p.meta {
    if let Some(updated) = meta.updated_at {
      lines.push(field("Updated", updated.format("%Y-%m-%d %H:%M").to_string()));
    }
    if let Some(barcode) = &meta.barcode {
      lines.push(field("Barcode", barcode.as_str()));
    }
  }

  if !p.reviews.is_empty() {
    lines.push(Line::default());
    lines.push(section("Reviews"));
    for review in &p.reviews {
      let date = review
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
      lines.push(Line::from(vec![
        Span::styled(
          format!("{:<5}", "★".repeat(review.rating.round().clamp(0.0, 5.0) as usize)),
          Style::default().fg(Color::Yellow),
        ),
        Span::raw(" "),
        Span::styled(review.reviewer_name.as_str(), Style::default().bold()),
        Span::styled(format!("  {}", date), Style::default().fg(Color::DarkGray)),
      ]));
      lines.push(Line::from(format!("  {}", review.comment)));
    }
  }

  lines
}

impl View for ProductDetailView {
  fn handle_key(&mut self, key: KeyEvent, session: &mut Session) -> ViewAction {
    match self.confirm.handle_key(key) {
      KeyResult::Event(id) => {
        self.deleting = session.mutations.delete(id);
        if !self.deleting {
          session.notices.error("Another delete is still in progress");
        }
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
      KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
      KeyCode::Char('r') => session.store.refresh(&self.key()),
      KeyCode::Char('e') => {
        if let Some(product) = session.store.peek_product(self.id).value() {
          return ViewAction::Push(Box::new(ProductFormView::edit(product)));
        }
      }
      KeyCode::Char('d') => {
        self
          .confirm
          .ask(self.id, format!("Delete \"{}\" (#{})?", self.title, self.id));
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, session: &Session) {
    self.render_detail(frame, area, session);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    format!("#{}", self.id)
  }

  fn tick(&mut self, session: &mut Session) -> ViewAction {
    if self.deleting && !session.mutations.is_pending(MutationKind::Delete) {
      self.deleting = false;
      if let MutationState::Success(outcome) = session.mutations.delete_state() {
        if outcome.id == self.id {
          return ViewAction::Pop;
        }
      }
    }

    let key = self.key();
    if let Some(product) = session.store.request(&key).value().and_then(|d| d.as_product()) {
      self.title.clone_from(&product.title);
    }
    ViewAction::None
  }

  fn source_label(&self, _session: &Session) -> Option<String> {
    Some(format!("product {}", self.id))
  }

  fn is_editing(&self) -> bool {
    self.confirm.is_active()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("e", "edit"),
      Shortcut::new("d", "delete"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "back"),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::testing::FakeCatalog;
  use crate::catalog::ProductApi;
  use crate::config::Config;
  use crossterm::event::KeyModifiers;
  use std::sync::Arc;
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  async fn settle(view: &mut ProductDetailView, session: &mut Session) -> ViewAction {
    view.tick(session);
    tokio::time::sleep(Duration::from_millis(10)).await;
    session.tick();
    view.tick(session)
  }

  #[tokio::test]
  async fn test_loads_product_by_id() {
    let fake = Arc::new(FakeCatalog::with_products(10));
    let mut session = Session::new(fake.clone(), &Config::default());
    let mut view = ProductDetailView::new(&Product {
      id: 4,
      ..Default::default()
    });

    settle(&mut view, &mut session).await;

    assert_eq!(view.title, "Product 4");
    assert_eq!(fake.calls("get"), 1);
  }

  #[tokio::test]
  async fn test_confirmed_delete_pops_view() {
    let fake = Arc::new(FakeCatalog::with_products(10));
    let mut session = Session::new(fake.clone(), &Config::default());
    let mut view = ProductDetailView::new(&fake.get(6).await.unwrap());
    settle(&mut view, &mut session).await;

    view.handle_key(key(KeyCode::Char('d')), &mut session);
    view.handle_key(key(KeyCode::Char('y')), &mut session);
    assert!(matches!(settle(&mut view, &mut session).await, ViewAction::Pop));
    assert!(session.store.peek_product(6).is_miss());
  }

  #[tokio::test]
  async fn test_missing_product_waits_for_refresh() {
    let fake = Arc::new(FakeCatalog::with_products(5));
    let mut session = Session::new(fake.clone(), &Config::default());
    let mut view = ProductDetailView::new(&Product {
      id: 99,
      ..Default::default()
    });

    for _ in 0..4 {
      settle(&mut view, &mut session).await;
    }
    assert_eq!(fake.calls("get"), 1);
    assert_eq!(session.notices.len(), 1);

    view.handle_key(key(KeyCode::Char('r')), &mut session);
    settle(&mut view, &mut session).await;
    assert_eq!(fake.calls("get"), 2);
  }

  #[tokio::test]
  async fn test_delete_refused_while_another_is_pending() {
    let fake = Arc::new(FakeCatalog::with_products(10));
    let mut session = Session::new(fake.clone(), &Config::default());
    let mut view = ProductDetailView::new(&fake.get(6).await.unwrap());
    settle(&mut view, &mut session).await;

    assert!(session.mutations.delete(2));
    view.handle_key(key(KeyCode::Char('d')), &mut session);
    view.handle_key(key(KeyCode::Char('y')), &mut session);

    assert!(!view.deleting);
    assert_eq!(
      session.notices.current().map(|n| n.message.as_str()),
      Some("Another delete is still in progress")
    );
  }
}
