use crate::catalog::{HttpProductClient, Session};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::renderfns::{draw_footer, draw_header, extract_domain};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{ProductFormView, ProductListView};
use crate::ui;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How often finished requests are collected when no keys arrive
const TICK_RATE: Duration = Duration::from_millis(100);

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// `:` command palette
  command: CommandInput,

  /// Cache, mutations, pagination, search and notices
  session: Session,

  /// Header title: configured, else the API host
  title: String,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let client = HttpProductClient::new(&config)?;
    let title = config
      .title
      .clone()
      .unwrap_or_else(|| extract_domain(client.base_url().as_str()).to_string());
    info!("using product API at {}", client.base_url());

    Ok(Self::with_session(Session::new(Arc::new(client), &config), title))
  }

  fn with_session(session: Session, title: String) -> Self {
    Self {
      view_stack: vec![Box::new(ProductListView::new())],
      command: CommandInput::new(),
      session,
      title,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(TICK_RATE);
    let result = self.event_loop(&mut terminal, &mut events).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    self.tick();
    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Resize) | Some(Event::Tick) => {}
        None => break,
      }
      // Keys can start requests; collect and request right away
      self.tick();
    }
    Ok(())
  }

  fn tick(&mut self) {
    self.session.tick();
    let action = match self.view_stack.last_mut() {
      Some(view) => view.tick(&mut self.session),
      None => ViewAction::None,
    };
    self.apply(action);
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let view_editing = self.view_stack.last().is_some_and(|v| v.is_editing());
    if !view_editing {
      match self.command.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(cmd)) => {
          self.execute_command(&cmd);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key, &mut self.session),
      None => ViewAction::Quit,
    };
    self.apply(action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Quit => self.should_quit = true,
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    match cmd {
      "products" => {
        self.view_stack.truncate(1);
        self.session.search.clear();
        self.session.pagination.reset();
      }
      "new" => self.view_stack.push(Box::new(ProductFormView::create())),
      "refresh" => {
        self.session.refresh_active();
        self.session.notices.success("Refreshing");
      }
      "quit" => self.should_quit = true,
      other => {
        warn!("unknown command {:?}", other);
        self.session.notices.error(format!("Unknown command: {}", other));
      }
    }
  }

  fn breadcrumb(&self) -> Vec<String> {
    self.view_stack.iter().map(|v| v.breadcrumb_label()).collect()
  }

  fn draw(&mut self, frame: &mut Frame) {
    let [header, content, footer] = ui::layout(frame.area());

    let breadcrumb = self.breadcrumb();
    let Some(view) = self.view_stack.last_mut() else {
      return;
    };

    let mut shortcuts = view.shortcuts();
    shortcuts.sort_by_key(|s| s.priority);
    let source = view.source_label(&self.session).unwrap_or_default();
    draw_header(frame, header, &self.title, &source, &shortcuts);

    view.render(frame, content, &self.session);
    self.command.render_overlay(frame, content);

    draw_footer(frame, footer, &breadcrumb, self.session.notices.current());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::testing::FakeCatalog;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn app() -> App {
    let fake = Arc::new(FakeCatalog::with_products(30));
    App::with_session(Session::new(fake, &Config::default()), "test".to_string())
  }

  fn run_command(app: &mut App, cmd: &str) {
    app.handle_key(key(KeyCode::Char(':')));
    for c in cmd.chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Enter));
  }

  #[tokio::test]
  async fn test_new_command_pushes_form() {
    let mut app = app();
    run_command(&mut app, "new");
    assert_eq!(app.breadcrumb(), vec!["Products", "New"]);

    run_command(&mut app, "products");
    assert_eq!(app.breadcrumb(), vec!["Products"]);
  }

  #[tokio::test]
  async fn test_q_on_root_quits() {
    let mut app = app();
    app.handle_key(key(KeyCode::Char('a')));
    app.handle_key(key(KeyCode::Esc));
    assert!(!app.should_quit);

    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_colon_is_text_while_view_is_editing() {
    let mut app = app();
    app.handle_key(key(KeyCode::Char('/')));
    app.handle_key(key(KeyCode::Char(':')));
    assert!(!app.command.is_active());
    assert_eq!(app.session.search.input(), ":");
  }

  #[tokio::test]
  async fn test_unknown_command_raises_notice() {
    let mut app = app();
    run_command(&mut app, "boards");
    assert_eq!(
      app.session.notices.current().map(|n| n.message.as_str()),
      Some("Unknown command: boards")
    );
  }
}
