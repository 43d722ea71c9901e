use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};
use std::fmt::Display;

/// Events emitted by the picker that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent<T> {
  Selected(T),
  Cancelled,
}

/// Centered single-choice list, e.g. the availability status of a product
#[derive(Debug, Clone)]
pub struct Picker<T> {
  active: bool,
  options: Vec<T>,
  selected: usize,
  title: String,
}

impl<T> Default for Picker<T> {
  fn default() -> Self {
    Self {
      active: false,
      options: Vec::new(),
      selected: 0,
      title: String::new(),
    }
  }
}

impl<T: Clone + Display + PartialEq> Picker<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the picker with `current` preselected
  pub fn show(&mut self, title: impl Into<String>, options: Vec<T>, current: &T) {
    self.selected = options.iter().position(|o| o == current).unwrap_or(0);
    self.options = options;
    self.title = title.into();
    self.active = true;
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.options.clear();
    self.selected = 0;
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<PickerEvent<T>> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(PickerEvent::Cancelled)
      }
      KeyCode::Enter => {
        let choice = self.options.get(self.selected).cloned();
        self.hide();
        match choice {
          Some(value) => KeyResult::Event(PickerEvent::Selected(value)),
          None => KeyResult::Event(PickerEvent::Cancelled),
        }
      }
      KeyCode::Char('j') | KeyCode::Down => {
        if !self.options.is_empty() {
          self.selected = (self.selected + 1) % self.options.len();
        }
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if !self.options.is_empty() {
          self.selected = (self.selected + self.options.len() - 1) % self.options.len();
        }
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active || self.options.is_empty() {
      return;
    }

    let labels: Vec<String> = self.options.iter().map(|o| o.to_string()).collect();
    let widest = labels
      .iter()
      .map(|l| l.chars().count())
      .chain(std::iter::once(self.title.chars().count()))
      .max()
      .unwrap_or(10);
    let width = (widest as u16 + 6).clamp(20, area.width.max(20)).min(area.width);
    let height = (labels.len() as u16 + 2).min(area.height);

    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = labels
      .into_iter()
      .map(|label| ListItem::new(Span::styled(label, Style::default().fg(Color::Cyan))))
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, inner, &mut state);
  }
}
