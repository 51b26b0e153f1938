//! Page slicing for the filtered row set.
//!
//! Pages are 1-based. A page is further cut down to a "visible window" so
//! that only the first few rows of a large page are materialized.

/// Rows surrounding the current page in the page-number strip.
const PAGE_WINDOW: usize = 2;

/// One entry of the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// A page cut out of a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice<'a, T> {
    pub page: usize,
    /// Offset of the first item of the page in the full slice.
    pub start: usize,
    /// One past the last item of the page in the full slice.
    pub end: usize,
    /// Total items across all pages.
    pub total: usize,
    pub items: &'a [T],
    /// Leading part of `items` that gets rendered.
    pub visible: &'a [T],
}

impl<T> PageSlice<'_, T> {
    /// More rows exist on this page beyond the visible window.
    pub fn has_more_in_page(&self) -> bool {
        self.items.len() > self.visible.len()
    }

    /// One past the last visible item in the full slice.
    pub fn visible_end(&self) -> usize {
        self.start + self.visible.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    visible_rows: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(100, 20)
    }
}

impl Paginator {
    /// Both sizes are clamped to at least 1.
    pub fn new(page_size: usize, visible_rows: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            visible_rows: visible_rows.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// `ceil(len / page_size)`, never below 1 so an empty page 1 stays valid.
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size).max(1)
    }

    /// Whether `page` addresses an existing page for `len` items.
    pub fn is_valid_page(&self, page: usize, len: usize) -> bool {
        (1..=self.total_pages(len)).contains(&page)
    }

    /// Cut page `page` out of `items`. Pages past the end come back empty.
    pub fn slice<'a, T>(&self, items: &'a [T], page: usize) -> PageSlice<'a, T> {
        let total = items.len();
        let start = page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(total);
        let end = start.saturating_add(self.page_size).min(total);
        let page_items = &items[start..end];
        let visible = &page_items[..page_items.len().min(self.visible_rows)];
        PageSlice {
            page,
            start,
            end,
            total,
            items: page_items,
            visible,
        }
    }
}

pub fn can_go_previous(current: usize) -> bool {
    current > 1
}

pub fn can_go_next(current: usize, total_pages: usize) -> bool {
    current < total_pages
}

/// Page-number strip: first, last, and `current ± 2`, with ellipses in gaps.
pub fn page_numbers(current: usize, total_pages: usize) -> Vec<PageItem> {
    if total_pages <= 1 {
        return vec![PageItem::Page(1)];
    }

    let lo = current.saturating_sub(PAGE_WINDOW).max(2);
    let hi = current.saturating_add(PAGE_WINDOW).min(total_pages - 1);

    let mut items = vec![PageItem::Page(1)];
    if current.saturating_sub(PAGE_WINDOW) > 2 {
        items.push(PageItem::Ellipsis);
    }
    items.extend((lo..=hi).map(PageItem::Page));
    if current.saturating_add(PAGE_WINDOW) < total_pages - 1 {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Page(total_pages));

    items.dedup_by(|a, b| {
        matches!((a, b), (PageItem::Ellipsis, PageItem::Ellipsis))
    });
    items
}
