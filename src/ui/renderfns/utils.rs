use crate::catalog::AvailabilityStatus;
use ratatui::prelude::Color;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display color for an availability status
pub fn availability_color(status: AvailabilityStatus) -> Color {
  match status {
    AvailabilityStatus::InStock => Color::Green,
    AvailabilityStatus::LowStock => Color::Yellow,
    AvailabilityStatus::OutOfStock => Color::Red,
  }
}

/// Display color for a stock count
pub fn stock_color(stock: u32) -> Color {
  match stock {
    0 => Color::Red,
    1..=9 => Color::Yellow,
    _ => Color::White,
  }
}

pub fn format_price(price: f64) -> String {
  format!("${:.2}", price)
}
