//! Page bounds and pagination control rows.

use crate::types::page::PageItem;

/// Rows with at most this many pages are shown in full.
const FULL_ROW_LIMIT: u32 = 6;

/// Whether `page` is a valid navigation target for `total_pages` pages.
pub fn in_bounds(page: u32, total_pages: u32) -> bool {
    page >= 1 && page <= total_pages
}

/// Every page number from 1 to `total_pages`, no gaps.
pub fn all_pages(total_pages: u32) -> Vec<PageItem> {
    (1..=total_pages).map(PageItem::Page).collect()
}

/// Compact row of page numbers around `current_page`.
///
/// Up to six pages are listed in full. Beyond that the row keeps the first
/// and last page and shows a window near the current one:
/// `[1,2,3,4,5,…,N]` while `current_page <= 4`,
/// `[1,…,N-4..=N]` once `current_page > N-4`,
/// `[1,…,c-2..=c+2,…,N]` in between.
pub fn pagination_window(current_page: u32, total_pages: u32) -> Vec<PageItem> {
    if total_pages <= FULL_ROW_LIMIT {
        return all_pages(total_pages);
    }

    let mut row = Vec::with_capacity(9);
    if current_page <= 4 {
        row.extend((1..=5).map(PageItem::Page));
        row.push(PageItem::Gap);
        row.push(PageItem::Page(total_pages));
    } else if current_page > total_pages - 4 {
        row.push(PageItem::Page(1));
        row.push(PageItem::Gap);
        row.extend((total_pages - 4..=total_pages).map(PageItem::Page));
    } else {
        row.push(PageItem::Page(1));
        row.push(PageItem::Gap);
        row.extend((current_page - 2..=current_page + 2).map(PageItem::Page));
        row.push(PageItem::Gap);
        row.push(PageItem::Page(total_pages));
    }
    row
}
