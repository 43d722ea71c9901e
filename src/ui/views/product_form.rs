use crate::catalog::{
  AvailabilityStatus, MutationKind, MutationState, Product, ProductDraft, Session,
};
use crate::ui::components::{InputResult, KeyResult, Picker, PickerEvent, TextInput};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::str::FromStr;

/// Editable product fields, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Title,
  Description,
  Brand,
  Category,
  Sku,
  Price,
  Discount,
  Rating,
  Stock,
  Weight,
  MinimumOrder,
  Availability,
  Warranty,
  Shipping,
  ReturnPolicy,
}

impl Field {
  const ALL: [Field; 15] = [
    Field::Title,
    Field::Description,
    Field::Brand,
    Field::Category,
    Field::Sku,
    Field::Price,
    Field::Discount,
    Field::Rating,
    Field::Stock,
    Field::Weight,
    Field::MinimumOrder,
    Field::Availability,
    Field::Warranty,
    Field::Shipping,
    Field::ReturnPolicy,
  ];

  fn label(&self) -> &'static str {
    match self {
      Field::Title => "Title *",
      Field::Description => "Description",
      Field::Brand => "Brand",
      Field::Category => "Category *",
      Field::Sku => "SKU *",
      Field::Price => "Price",
      Field::Discount => "Discount %",
      Field::Rating => "Rating",
      Field::Stock => "Stock",
      Field::Weight => "Weight",
      Field::MinimumOrder => "Min. order qty",
      Field::Availability => "Availability",
      Field::Warranty => "Warranty",
      Field::Shipping => "Shipping",
      Field::ReturnPolicy => "Return policy",
    }
  }

  fn value(&self, draft: &ProductDraft) -> String {
    match self {
      Field::Title => draft.title.clone(),
      Field::Description => draft.description.clone(),
      Field::Brand => draft.brand.clone(),
      Field::Category => draft.category.clone(),
      Field::Sku => draft.sku.clone(),
      Field::Price => draft.price.to_string(),
      Field::Discount => draft.discount_percentage.to_string(),
      Field::Rating => draft.rating.to_string(),
      Field::Stock => draft.stock.to_string(),
      Field::Weight => draft.weight.to_string(),
      Field::MinimumOrder => draft.minimum_order_quantity.to_string(),
      Field::Availability => draft.availability_status.to_string(),
      Field::Warranty => draft.warranty_information.clone(),
      Field::Shipping => draft.shipping_information.clone(),
      Field::ReturnPolicy => draft.return_policy.clone(),
    }
  }

  /// Store typed text into `draft`. Numbers must parse; bounds are checked
  /// on submit.
  fn apply(&self, draft: &mut ProductDraft, text: &str) -> Result<(), String> {
    let text = text.trim();
    match self {
      Field::Title => draft.title = text.to_string(),
      Field::Description => draft.description = text.to_string(),
      Field::Brand => draft.brand = text.to_string(),
      Field::Category => draft.category = text.to_string(),
      Field::Sku => draft.sku = text.to_string(),
      Field::Price => draft.price = parse(self, text)?,
      Field::Discount => draft.discount_percentage = parse(self, text)?,
      Field::Rating => draft.rating = parse(self, text)?,
      Field::Stock => draft.stock = parse(self, text)?,
      Field::Weight => draft.weight = parse(self, text)?,
      Field::MinimumOrder => draft.minimum_order_quantity = parse(self, text)?,
      // Chosen from the picker, never typed
      Field::Availability => {}
      Field::Warranty => draft.warranty_information = text.to_string(),
      Field::Shipping => draft.shipping_information = text.to_string(),
      Field::ReturnPolicy => draft.return_policy = text.to_string(),
    }
    Ok(())
  }
}

fn parse<T: FromStr>(field: &Field, text: &str) -> Result<T, String> {
  text
    .parse()
    .map_err(|_| format!("{}: \"{}\" is not a valid number", field.label().trim_end_matches(" *"), text))
}

enum FormMode {
  Create,
  Edit { id: u64, original: ProductDraft },
}

/// Create or edit form. Edits send only the fields that changed.
pub struct ProductFormView {
  mode: FormMode,
  draft: ProductDraft,
  list_state: ListState,
  editor: Option<TextInput>,
  picker: Picker<AvailabilityStatus>,
  error: Option<String>,
  /// A mutation started by this form is still running
  submitted: bool,
}

impl ProductFormView {
  pub fn create() -> Self {
    Self::with_mode(FormMode::Create, ProductDraft::default())
  }

  pub fn edit(product: &Product) -> Self {
    let original = product.to_draft();
    Self::with_mode(
      FormMode::Edit {
        id: product.id,
        original: original.clone(),
      },
      original,
    )
  }

  fn with_mode(mode: FormMode, draft: ProductDraft) -> Self {
    Self {
      mode,
      draft,
      list_state: ListState::default().with_selected(Some(0)),
      editor: None,
      picker: Picker::new(),
      error: None,
      submitted: false,
    }
  }

  fn kind(&self) -> MutationKind {
    match self.mode {
      FormMode::Create => MutationKind::Create,
      FormMode::Edit { .. } => MutationKind::Update,
    }
  }

  fn selected_field(&self) -> Field {
    Field::ALL[self.list_state.selected().unwrap_or(0).min(Field::ALL.len() - 1)]
  }

  fn move_selection(&mut self, delta: isize) {
    let len = Field::ALL.len() as isize;
    let current = self.list_state.selected().unwrap_or(0) as isize;
    self
      .list_state
      .select(Some((current + delta).rem_euclid(len) as usize));
  }

  fn open_selected(&mut self) {
    let field = self.selected_field();
    if field == Field::Availability {
      self.picker.show(
        "Availability",
        AvailabilityStatus::ALL.to_vec(),
        &self.draft.availability_status,
      );
    } else {
      self.editor = Some(TextInput::with_value(field.value(&self.draft)));
    }
  }

  fn submit(&mut self, session: &mut Session) -> ViewAction {
    if self.submitted {
      return ViewAction::None;
    }
    if let Err(e) = self.draft.validate() {
      self.error = Some(e.server_message().unwrap_or("Invalid product").to_string());
      return ViewAction::None;
    }
    self.error = None;

    let started = match &self.mode {
      FormMode::Create => session.mutations.create(self.draft.clone()),
      FormMode::Edit { id, original } => {
        let patch = self.draft.diff(original);
        if patch.is_empty() {
          session.notices.success("No changes to save");
          return ViewAction::Pop;
        }
        session.mutations.update(*id, patch)
      }
    };

    if started {
      self.submitted = true;
    } else {
      self.error = Some("Another save is still in progress".to_string());
    }
    ViewAction::None
  }

  fn render_form(&mut self, frame: &mut Frame, area: Rect) {
    let title = match (&self.mode, self.submitted) {
      (FormMode::Create, false) => " New product ".to_string(),
      (FormMode::Create, true) => " New product (saving...) ".to_string(),
      (FormMode::Edit { id, .. }, false) => format!(" Edit #{} ", id),
      (FormMode::Edit { id, .. }, true) => format!(" Edit #{} (saving...) ", id),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Min(1),    // Fields
        Constraint::Length(1), // Error / hint line
      ])
      .split(inner);

    let selected = self.list_state.selected();
    let items: Vec<ListItem> = Field::ALL
      .iter()
      .enumerate()
      .map(|(i, field)| {
        let value: Vec<Span> = match (&self.editor, Some(i) == selected) {
          (Some(editor), true) => {
            let (before, after) = editor.split_at_cursor();
            vec![
              Span::raw(before.to_string()),
              Span::styled("_", Style::default().fg(Color::Yellow)),
              Span::raw(after.to_string()),
            ]
          }
          _ => vec![Span::raw(field.value(&self.draft))],
        };

        let mut spans = vec![Span::styled(
          format!("{:<16}", field.label()),
          Style::default().fg(Color::DarkGray),
        )];
        spans.extend(value);
        ListItem::new(Line::from(spans))
      })
      .collect();

    let list = List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

    let status = match &self.error {
      Some(error) => Span::styled(error.clone(), Style::default().fg(Color::Red)),
      None if self.editor.is_some() => Span::styled(
        "Enter: keep  Esc: discard",
        Style::default().fg(Color::DarkGray),
      ),
      None => Span::styled(
        "Enter: edit field  Ctrl-S: save  Esc: cancel",
        Style::default().fg(Color::DarkGray),
      ),
    };
    frame.render_widget(Paragraph::new(Line::from(status)), chunks[1]);
  }
}

impl View for ProductFormView {
  fn handle_key(&mut self, key: KeyEvent, session: &mut Session) -> ViewAction {
    let ctrl_s =
      key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL);

    match self.picker.handle_key(key) {
      KeyResult::Event(PickerEvent::Selected(status)) => {
        self.draft.availability_status = status;
        return ViewAction::None;
      }
      KeyResult::Event(PickerEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    if let Some(editor) = self.editor.as_mut() {
      match editor.handle_key(key) {
        InputResult::Submitted(text) => {
          let field = self.selected_field();
          self.error = field.apply(&mut self.draft, &text).err();
          self.editor = None;
        }
        InputResult::Cancelled => self.editor = None,
        InputResult::Consumed => {}
        InputResult::NotHandled => {
          if ctrl_s {
            // Keep what was typed, then save
            let text = editor.value().to_string();
            let field = self.selected_field();
            self.editor = None;
            match field.apply(&mut self.draft, &text) {
              Ok(()) => return self.submit(session),
              Err(e) => self.error = Some(e),
            }
          }
        }
      }
      return ViewAction::None;
    }

    if ctrl_s {
      return self.submit(session);
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => self.move_selection(1),
      KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => self.move_selection(-1),
      KeyCode::Enter => self.open_selected(),
      KeyCode::Esc | KeyCode::Char('q') => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, _session: &Session) {
    self.render_form(frame, area);
    self.picker.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    match &self.mode {
      FormMode::Create => "New".to_string(),
      FormMode::Edit { id, .. } => format!("Edit #{}", id),
    }
  }

  fn tick(&mut self, session: &mut Session) -> ViewAction {
    if !self.submitted || session.mutations.is_pending(self.kind()) {
      return ViewAction::None;
    }
    self.submitted = false;

    let failure = match self.kind() {
      MutationKind::Create => match session.mutations.create_state() {
        MutationState::Failed(e) => Some(e.clone()),
        _ => None,
      },
      _ => match session.mutations.update_state() {
        MutationState::Failed(e) => Some(e.clone()),
        _ => None,
      },
    };

    match failure {
      // The notice already went out; keep the form open so nothing typed is lost
      Some(e) => {
        self.error = Some(e.server_message().map(str::to_string).unwrap_or_else(|| e.to_string()));
        ViewAction::None
      }
      None => ViewAction::Pop,
    }
  }

  fn is_editing(&self) -> bool {
    self.editor.is_some() || self.picker.is_active()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("enter", "edit field"),
      Shortcut::new("ctrl-s", "save"),
      Shortcut::new("esc", "cancel"),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::testing::FakeCatalog;
  use crate::catalog::{CatalogError, ProductApi, ProductKey};
  use crate::config::Config;
  use std::sync::Arc;
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ctrl_s() -> KeyEvent {
    KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
  }

  fn type_into(view: &mut ProductFormView, session: &mut Session, text: &str) {
    view.handle_key(key(KeyCode::Enter), session);
    view.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL), session);
    for c in text.chars() {
      view.handle_key(key(KeyCode::Char(c)), session);
    }
    view.handle_key(key(KeyCode::Enter), session);
  }

  /// Move to `field` and type `text` into it
  fn fill(view: &mut ProductFormView, session: &mut Session, field: Field, text: &str) {
    let index = Field::ALL.iter().position(|f| *f == field).unwrap();
    view.list_state.select(Some(index));
    type_into(view, session, text);
  }

  async fn settle(view: &mut ProductFormView, session: &mut Session) -> ViewAction {
    tokio::time::sleep(Duration::from_millis(10)).await;
    session.tick();
    view.tick(session)
  }

  #[test]
  fn test_apply_parses_numbers() {
    let mut draft = ProductDraft::default();
    assert!(Field::Price.apply(&mut draft, " 19.99 ").is_ok());
    assert_eq!(draft.price, 19.99);
    assert!(Field::Stock.apply(&mut draft, "12").is_ok());
    assert_eq!(draft.stock, 12);

    let err = Field::Stock.apply(&mut draft, "-3").unwrap_err();
    assert_eq!(err, "Stock: \"-3\" is not a valid number");
    assert_eq!(draft.stock, 12);
  }

  #[tokio::test]
  async fn test_create_flow() {
    let fake = Arc::new(FakeCatalog::with_products(194));
    let mut session = Session::new(fake.clone(), &Config::default());
    let mut view = ProductFormView::create();

    view.handle_key(ctrl_s(), &mut session);
    assert_eq!(view.error.as_deref(), Some("Title is required"));
    assert_eq!(fake.calls("create"), 0);

    fill(&mut view, &mut session, Field::Title, "Desk Lamp");
    fill(&mut view, &mut session, Field::Category, "lighting");
    fill(&mut view, &mut session, Field::Sku, "LMP-1");
    fill(&mut view, &mut session, Field::Price, "24.5");
    view.handle_key(ctrl_s(), &mut session);
    assert!(view.submitted);

    assert!(matches!(settle(&mut view, &mut session).await, ViewAction::Pop));
    let created = fake.get(195).await.unwrap();
    assert_eq!(created.title, "Desk Lamp");
    assert_eq!(created.price, 24.5);
  }

  #[tokio::test]
  async fn test_failed_create_keeps_form_open() {
    let fake = Arc::new(FakeCatalog::with_products(3));
    let mut session = Session::new(fake.clone(), &Config::default());
    let mut view = ProductFormView::create();
    fill(&mut view, &mut session, Field::Title, "Desk Lamp");
    fill(&mut view, &mut session, Field::Category, "lighting");
    fill(&mut view, &mut session, Field::Sku, "LMP-1");

    fake.fail_next(CatalogError::validation("SKU already exists"));
    view.handle_key(ctrl_s(), &mut session);

    assert!(matches!(settle(&mut view, &mut session).await, ViewAction::None));
    assert_eq!(view.error.as_deref(), Some("SKU already exists"));
    assert_eq!(view.draft.title, "Desk Lamp");
  }

  #[tokio::test]
  async fn test_edit_sends_only_changed_fields() {
    let fake = Arc::new(FakeCatalog::with_products(50));
    let mut session = Session::new(fake.clone(), &Config::default());
    let product = fake.get(42).await.unwrap();
    let mut view = ProductFormView::edit(&product);

    fill(&mut view, &mut session, Field::Stock, "0");
    let index = Field::ALL.iter().position(|f| *f == Field::Availability).unwrap();
    view.list_state.select(Some(index));
    view.handle_key(key(KeyCode::Enter), &mut session);
    view.handle_key(key(KeyCode::Char('j')), &mut session);
    view.handle_key(key(KeyCode::Char('j')), &mut session);
    view.handle_key(key(KeyCode::Enter), &mut session);
    assert_eq!(view.draft.availability_status, AvailabilityStatus::OutOfStock);

    if let FormMode::Edit { original, .. } = &view.mode {
      let patch = view.draft.diff(original);
      assert_eq!(patch.stock, Some(0));
      assert_eq!(patch.availability_status, Some(AvailabilityStatus::OutOfStock));
      assert!(patch.title.is_none());
    }

    view.handle_key(ctrl_s(), &mut session);
    assert!(matches!(settle(&mut view, &mut session).await, ViewAction::Pop));

    let detail = session.store.peek_product(42).value().unwrap();
    assert_eq!(detail.stock, 0);
    assert_eq!(detail.title, "Product 42");
    assert!(session.store.peek(&ProductKey::detail(42)).value().is_some());
  }

  #[tokio::test]
  async fn test_edit_without_changes_just_closes() {
    let fake = Arc::new(FakeCatalog::with_products(5));
    let mut session = Session::new(fake.clone(), &Config::default());
    let mut view = ProductFormView::edit(&fake.get(1).await.unwrap());

    assert!(matches!(view.handle_key(ctrl_s(), &mut session), ViewAction::Pop));
    assert_eq!(fake.calls("update"), 0);
  }
}
