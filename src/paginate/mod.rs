use serde::Serialize;

use crate::filter::CategoryFilter;

pub const PAGE_SIZE: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
    pub clamped_page: usize,
    pub page_size: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    /// 1-based position of the first item on this page, 0 when empty.
    pub fn first_index(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            (self.clamped_page - 1) * self.page_size + 1
        }
    }

    /// 1-based position of the last item on this page.
    pub fn last_index(&self) -> usize {
        (self.clamped_page * self.page_size).min(self.total_items)
    }

    /// Row number for the item at `index` within this page.
    pub fn row_number(&self, index: usize) -> usize {
        (self.clamped_page - 1) * self.page_size + index + 1
    }

    pub fn has_prev(&self) -> bool {
        self.clamped_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.clamped_page < self.total_pages
    }

    /// e.g. `"Menampilkan 101 - 120 dari 120 pengungsi"`.
    pub fn range_text(&self, noun: &str) -> String {
        format!(
            "Menampilkan {} - {} dari {} {}",
            self.first_index(),
            self.last_index(),
            self.total_items,
            noun
        )
    }

    pub fn page_text(&self) -> String {
        format!("Halaman {} / {}", self.clamped_page, self.total_pages)
    }
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// Slices `records` into the requested page. The page is clamped into
/// `[1, total_pages]` first, so a stale page number after the list shrinks
/// still lands on real rows.
pub fn paginate<T: Clone>(records: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(records.len(), page_size);
    let clamped_page = page.clamp(1, total_pages);
    let start = (clamped_page - 1) * page_size;
    let end = (start + page_size).min(records.len());
    let items = records.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
    Page {
        items,
        total_pages,
        clamped_page,
        page_size,
        total_items: records.len(),
    }
}

/// Search box, category selector and current page of one list view.
///
/// Any change to the query or category sends the view back to page 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListView {
    query: String,
    category: CategoryFilter,
    page: usize,
}

impl Default for ListView {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: CategoryFilter::All,
            page: 1,
        }
    }
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Advances one page, never past `total_pages`.
    pub fn next_page(&mut self, total_pages: usize) {
        self.page = self.page.saturating_add(1).min(total_pages.max(1));
    }
}
