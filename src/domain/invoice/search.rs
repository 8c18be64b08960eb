//! Search filter and pagination primitives for the invoice list

use serde::Serialize;

/// Fixed number of invoices per list page
pub const PAGE_SIZE: u32 = 10;

/// Escape character used in LIKE patterns built by [`InvoiceSearch::like_pattern`]
pub const LIKE_ESCAPE: char = '\\';

/// Free-text filter over the searchable invoice columns.
///
/// A non-empty term matches an invoice when it is a case-insensitive
/// substring of at least one of [`InvoiceSearch::FIELDS`]. The fields form a
/// single flat OR group; no other predicate is ever mixed into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceSearch {
  term: Option<String>,
}

impl InvoiceSearch {
  pub const FIELDS: [&'static str; 4] = ["invoice_number", "seller_nip", "buyer_nip", "product_name"];

  /// Blank terms (after trimming) disable the filter
  pub fn new(term: Option<String>) -> Self {
    let term = term
      .map(|t| t.trim().to_string())
      .filter(|t| !t.is_empty());
    Self { term }
  }

  pub fn all() -> Self {
    Self::default()
  }

  pub fn term(&self) -> Option<&str> {
    self.term.as_deref()
  }

  /// Unicode-aware case folding shared by search terms and the folded
  /// columns stores keep for backends whose `LOWER` is ASCII-only
  pub fn fold(value: &str) -> String {
    value.to_lowercase()
  }

  /// Folded `%term%` pattern with LIKE metacharacters escaped, to be
  /// compared against folded column values with `ESCAPE '\'`
  pub fn like_pattern(&self) -> Option<String> {
    self.term.as_ref().map(|term| {
      let mut pattern = String::with_capacity(term.len() + 2);
      pattern.push('%');
      for c in Self::fold(term).chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
          pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
      }
      pattern.push('%');
      pattern
    })
  }
}

/// Requested page; page numbers start at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  page: u32,
  per_page: u32,
}

impl PageRequest {
  pub fn new(page: u32) -> Self {
    Self {
      page: page.max(1),
      per_page: PAGE_SIZE,
    }
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  pub fn per_page(&self) -> u32 {
    self.per_page
  }

  pub fn limit(&self) -> i64 {
    i64::from(self.per_page)
  }

  pub fn offset(&self) -> i64 {
    i64::from(self.page - 1) * i64::from(self.per_page)
  }
}

impl Default for PageRequest {
  fn default() -> Self {
    Self::new(1)
  }
}

/// One page of results plus the total number of matching records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub current_page: u32,
  pub per_page: u32,
  pub total: u64,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
    Self {
      items,
      current_page: request.page(),
      per_page: request.per_page(),
      total,
    }
  }

  /// Always at least 1, even for an empty result
  pub fn last_page(&self) -> u32 {
    let per_page = u64::from(self.per_page.max(1));
    let pages = self.total.div_ceil(per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
  }

  /// 1-based position of the first item on this page
  pub fn from(&self) -> Option<u64> {
    if self.items.is_empty() {
      return None;
    }
    Some(u64::from(self.current_page - 1) * u64::from(self.per_page) + 1)
  }

  /// 1-based position of the last item on this page
  pub fn to(&self) -> Option<u64> {
    self
      .from()
      .map(|from| from + self.items.len() as u64 - 1)
  }

  pub fn has_previous(&self) -> bool {
    self.current_page > 1
  }

  pub fn has_next(&self) -> bool {
    self.current_page < self.last_page()
  }

  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page {
      items: self.items.into_iter().map(f).collect(),
      current_page: self.current_page,
      per_page: self.per_page,
      total: self.total,
    }
  }
}
