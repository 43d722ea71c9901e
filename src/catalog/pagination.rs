use super::keys::ProductKey;

/// Page sizes offered by the list view
pub const PAGE_SIZES: [u64; 5] = [10, 20, 30, 40, 50];

/// Default page size
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Session-scoped page position.
///
/// Only explicit navigation changes it. Nothing here clamps against the
/// collection's total: an offset past the end is passed through and the
/// server answers with an empty page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
  page_index: u64,
  page_size: u64,
  default_size: u64,
}

impl Default for Pagination {
  fn default() -> Self {
    Self::new(DEFAULT_PAGE_SIZE)
  }
}

impl Pagination {
  pub fn new(page_size: u64) -> Self {
    Self {
      page_index: 0,
      page_size,
      default_size: page_size,
    }
  }

  pub fn page_index(&self) -> u64 {
    self.page_index
  }

  pub fn page_size(&self) -> u64 {
    self.page_size
  }

  pub fn limit(&self) -> u64 {
    self.page_size
  }

  pub fn skip(&self) -> u64 {
    self.page_index * self.page_size
  }

  /// Cache key of the page currently selected
  pub fn key(&self) -> ProductKey {
    ProductKey::list(self.limit(), self.skip())
  }

  pub fn next_page(&mut self) {
    self.page_index += 1;
  }

  pub fn previous_page(&mut self) {
    self.page_index = self.page_index.saturating_sub(1);
  }

  /// Change the page size. The page index is kept as is.
  pub fn set_page_size(&mut self, page_size: u64) {
    self.page_size = page_size;
  }

  /// Step through [`PAGE_SIZES`]; `forward` picks the next larger size.
  pub fn cycle_page_size(&mut self, forward: bool) {
    let current = PAGE_SIZES.iter().position(|s| *s == self.page_size);
    let next = match (current, forward) {
      (Some(i), true) => PAGE_SIZES.get(i + 1).copied(),
      (Some(i), false) => i.checked_sub(1).map(|i| PAGE_SIZES[i]),
      (None, true) => PAGE_SIZES.iter().copied().find(|s| *s > self.page_size),
      (None, false) => PAGE_SIZES.iter().rev().copied().find(|s| *s < self.page_size),
    };
    if let Some(size) = next {
      self.set_page_size(size);
    }
  }

  /// Number of pages for a collection of `total` items (at least one)
  pub fn page_count(&self, total: u64) -> u64 {
    if self.page_size == 0 {
      return 1;
    }
    total.div_ceil(self.page_size).max(1)
  }

  /// Whether another page exists after the current one
  pub fn has_next(&self, total: u64) -> bool {
    self.skip() + self.page_size < total
  }

  /// Back to the first page at the default size
  pub fn reset(&mut self) {
    self.page_index = 0;
    self.page_size = self.default_size;
  }
}
