use crate::notify::{Notice, NoticeLevel};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer: view breadcrumb on the left, current notice on the right
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], notice: Option<&Notice>) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i + 1 == breadcrumb.len() {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let crumbs = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(crumbs, area);

  if let Some(notice) = notice {
    let (marker, color) = match notice.level {
      NoticeLevel::Success => ("✓", Color::Green),
      NoticeLevel::Error => ("✗", Color::Red),
    };
    let line = Line::from(Span::styled(
      format!("{} {} ", marker, notice.message),
      Style::default().fg(color).bold(),
    ));
    frame.render_widget(
      Paragraph::new(line)
        .alignment(Alignment::Right)
        .style(Style::default().bg(Color::Black)),
      area,
    );
  }
}
