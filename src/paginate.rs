//! Fixed-size pages over the active view.

/// Rows per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Number of pages needed for `len` rows. Never less than one.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// The slice of `items` shown on 1-based page `page_number`, clipped to the
/// end. Page 0 is treated as page 1.
pub fn page<T>(items: &[T], page_size: usize, page_number: usize) -> &[T] {
    let size = page_size.max(1);
    let start = page_number.saturating_sub(1).saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    page_size: usize,
    current_page: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Go to page `n`, clamped into `[1, total_pages(len)]`.
    pub fn set_page(&mut self, n: usize, len: usize) -> usize {
        self.current_page = n.clamp(1, total_pages(len, self.page_size));
        self.current_page
    }

    /// Pull the current page back inside the bounds after the view changed.
    pub fn clamp(&mut self, len: usize) {
        self.set_page(self.current_page, len);
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Index range of the current page within a view of `len` rows.
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        let start = (self.current_page - 1).saturating_mul(self.page_size).min(len);
        let end = start.saturating_add(self.page_size).min(len);
        start..end
    }
}
