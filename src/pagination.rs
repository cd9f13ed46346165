//!
//! This module defines the per-view pagination and row-expansion state of the message viewer.
//!
use crate::model::MessagePage;

/// Page sizes offered to the user.
pub const PAGE_SIZES: [u64; 4] = [10, 25, 50, 100];

pub const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(u64);

impl PageSize {
    /// Accept `size` only if it is one of [`PAGE_SIZES`].
    pub fn new(size: u64) -> Option<Self> {
        if PAGE_SIZES.contains(&size) {
            Some(Self(size))
        } else {
            None
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize(DEFAULT_PAGE_SIZE)
    }
}

/// Window sent to the backend as `offset`/`limit` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

/// Display bounds derived from the current state and the latest page of data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageView {
    pub offset: u64,
    pub total_messages: u64,
    /// 1-based index of the first displayed row, 0 when nothing is shown.
    pub displayed_from: u64,
    pub displayed_to: u64,
    pub page_count: u64,
    pub can_go_next: bool,
    pub can_go_previous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    page_size: PageSize,
    expanded_row: Option<String>,
}

impl Pagination {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page: 0,
            page_size,
            expanded_row: None,
        }
    }

    /// Current 0-based page.
    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn expanded_row(&self) -> Option<&str> {
        self.expanded_row.as_deref()
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.page_size.get())
    }

    pub fn request(&self) -> PageRequest {
        PageRequest {
            offset: self.offset(),
            limit: self.page_size.get(),
        }
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.reset();
    }

    /// Start over on page 0, as when a different queue is selected.
    pub fn reset(&mut self) {
        self.page = 0;
        self.expanded_row = None;
    }

    /// Advance one page if the backend reported more data. Returns whether the page changed.
    pub fn next_page(&mut self, has_more: bool) -> bool {
        if !has_more {
            return false;
        }
        self.page += 1;
        self.expanded_row = None;
        true
    }

    /// Step back one page if not already on the first. Returns whether the page changed.
    pub fn previous_page(&mut self) -> bool {
        if self.page == 0 {
            return false;
        }
        self.page -= 1;
        self.expanded_row = None;
        true
    }

    /// Expand `row_id`, or collapse it if it is the expanded row. At most one row is expanded.
    pub fn toggle_row(&mut self, row_id: &str) {
        if self.expanded_row.as_deref() == Some(row_id) {
            self.expanded_row = None;
        } else {
            self.expanded_row = Some(row_id.to_owned());
        }
    }

    /// Largest valid 0-based page for `total` messages.
    pub fn max_page(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size.get()).saturating_sub(1)
    }

    /// Clamp the current page to the range implied by a freshly reported `total`.
    ///
    /// Returns `true` if the page moved, in which case the expanded row is cleared and the caller should refetch.
    pub fn clamp_to_total(&mut self, total: u64) -> bool {
        let max_page = self.max_page(total);
        if self.page <= max_page {
            return false;
        }
        self.page = max_page;
        self.expanded_row = None;
        true
    }

    /// Derive display bounds for `data`, the page most recently returned by the backend.
    pub fn view(&self, data: &MessagePage) -> PageView {
        let offset = self.offset();
        let rows = data.messages.len() as u64;
        let total_messages = data.total.max(data.count).max(rows);

        let (displayed_from, displayed_to) = if total_messages == 0 {
            (0, 0)
        } else {
            let to = offset.saturating_add(rows).min(total_messages);
            (offset.saturating_add(1).min(total_messages).min(to), to)
        };

        let page_count = if total_messages > 0 {
            total_messages.div_ceil(self.page_size.get())
        } else {
            1
        };

        PageView {
            offset,
            total_messages,
            displayed_from,
            displayed_to,
            page_count,
            can_go_next: data.has_more,
            can_go_previous: self.page > 0,
        }
    }
}
