//! Page bookkeeping for the table.
//!
//! The paginator tracks the current page, rows per page and page count, and
//! keeps the current page inside the valid range whenever the row count or
//! page size changes.
//!
//! # Example
//!
//! ```rust
//! use flock_table::paginator::Paginator;
//!
//! let mut paginator = Paginator::new().per_page(3);
//! paginator.set_total_pages_from_items(10);
//!
//! paginator.next_page();
//! let items = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
//! let (start, end) = paginator.get_slice_bounds(items.len());
//! assert_eq!(&items[start..end], &[4, 5, 6]);
//! ```

/// Pagination model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    /// Current page (0-indexed).
    page: usize,
    /// Items per page.
    per_page: usize,
    /// Total number of pages, never below 1.
    total_pages: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new()
    }
}

impl Paginator {
    /// Creates a paginator on page 0 with one item per page.
    #[must_use]
    pub fn new() -> Self {
        Self {
            page: 0,
            per_page: 1,
            total_pages: 1,
        }
    }

    /// Sets the number of items per page (builder pattern).
    #[must_use]
    pub fn per_page(mut self, n: usize) -> Self {
        self.per_page = n.max(1);
        self
    }

    /// Returns the current page (0-indexed).
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Sets the current page, clamped to the last page.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.min(self.total_pages.saturating_sub(1));
    }

    /// Returns the items per page.
    #[must_use]
    pub fn get_per_page(&self) -> usize {
        self.per_page
    }

    /// Returns the total number of pages.
    #[must_use]
    pub fn get_total_pages(&self) -> usize {
        self.total_pages
    }

    /// Recalculates the page count from an item count and clamps the page.
    ///
    /// Zero items still count as one (empty) page so that page 0 is valid.
    /// Returns the new page count.
    pub fn set_total_pages_from_items(&mut self, items: usize) -> usize {
        self.total_pages = items.div_ceil(self.per_page).max(1);
        self.set_page(self.page);
        self.total_pages
    }

    /// Changes the page size, keeping the first visible item on screen.
    ///
    /// The new page is the one containing the item that used to be first on
    /// the current page, then clamped against `items`.
    pub fn set_per_page(&mut self, n: usize, items: usize) {
        let first = self.page * self.per_page;
        self.per_page = n.max(1);
        self.page = first / self.per_page;
        self.set_total_pages_from_items(items);
    }

    /// Returns the number of items on the current page.
    #[must_use]
    pub fn items_on_page(&self, total_items: usize) -> usize {
        let (start, end) = self.get_slice_bounds(total_items);
        end - start
    }

    /// Returns slice bounds for the current page.
    #[must_use]
    pub fn get_slice_bounds(&self, length: usize) -> (usize, usize) {
        let start = (self.page * self.per_page).min(length);
        let end = (start + self.per_page).min(length);
        (start, end)
    }

    /// Navigates to the previous page.
    pub fn prev_page(&mut self) {
        if self.page > 0 {
            self.page -= 1;
        }
    }

    /// Navigates to the next page.
    pub fn next_page(&mut self) {
        if !self.on_last_page() {
            self.page += 1;
        }
    }

    /// Returns whether we're on the last page.
    #[must_use]
    pub fn on_last_page(&self) -> bool {
        self.page == self.total_pages.saturating_sub(1)
    }

    /// Returns whether we're on the first page.
    #[must_use]
    pub fn on_first_page(&self) -> bool {
        self.page == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginator_new() {
        let p = Paginator::new();
        assert_eq!(p.page(), 0);
        assert_eq!(p.get_per_page(), 1);
        assert_eq!(p.get_total_pages(), 1);
    }

    #[test]
    fn test_paginator_navigation() {
        let mut p = Paginator::new().per_page(2);
        p.set_total_pages_from_items(9);
        assert_eq!(p.get_total_pages(), 5);

        assert!(p.on_first_page());
        assert!(!p.on_last_page());

        p.next_page();
        assert_eq!(p.page(), 1);

        p.set_page(100);
        assert_eq!(p.page(), 4);
        assert!(p.on_last_page());

        p.next_page();
        assert_eq!(p.page(), 4);

        p.set_page(0);
        p.prev_page();
        assert_eq!(p.page(), 0);
    }

    #[test]
    fn test_paginator_slice_bounds() {
        let mut p = Paginator::new().per_page(3);
        p.set_total_pages_from_items(10);

        assert_eq!(p.get_slice_bounds(10), (0, 3));
        p.next_page();
        assert_eq!(p.get_slice_bounds(10), (3, 6));
        p.set_page(3);
        assert_eq!(p.get_slice_bounds(10), (9, 10));
        assert_eq!(p.items_on_page(10), 1);
    }

    #[test]
    fn test_zero_items_is_one_empty_page() {
        let mut p = Paginator::new().per_page(10);
        p.set_total_pages_from_items(35);
        p.set_page(3);

        assert_eq!(p.set_total_pages_from_items(0), 1);
        assert_eq!(p.page(), 0);
        assert_eq!(p.get_slice_bounds(0), (0, 0));
        assert_eq!(p.items_on_page(0), 0);
    }

    #[test]
    fn test_shrinking_items_clamps_page() {
        let mut p = Paginator::new().per_page(2);
        p.set_total_pages_from_items(10);
        p.set_page(4);

        p.set_total_pages_from_items(3);
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn test_set_per_page_keeps_first_item_visible() {
        let mut p = Paginator::new().per_page(10);
        p.set_total_pages_from_items(100);
        p.set_page(3); // items 30..40

        p.set_per_page(25, 100);
        assert_eq!(p.page(), 1); // items 25..50 contain item 30
        assert_eq!(p.get_total_pages(), 4);

        p.set_per_page(10, 100);
        assert_eq!(p.page(), 2); // item 25 is on page 2
    }
}
