use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// A page number shown in the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub active: bool,
}

/// What a click into the pagination bar carries: the page it points to, if
/// any, and whether the control was disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageTarget {
    pub page: Option<usize>,
    pub disabled: bool,
}

impl PageTarget {
    pub fn page(number: usize) -> Self {
        Self {
            page: Some(number),
            disabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: Vec<PageLink>,
    pub previous: PageTarget,
    pub next: PageTarget,
    pub current: usize,
    pub number_of_pages: usize,
}

impl PageWindow {
    pub fn numbers(&self) -> Vec<usize> {
        self.pages.iter().map(|p| p.number).collect()
    }

    /// Target of the n-th (0 based) page number in the window.
    pub fn slot(&self, idx: usize) -> Option<PageTarget> {
        self.pages.get(idx).map(|p| PageTarget::page(p.number))
    }
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

/// Keeps a page inside `[1, number_of_pages]`. An empty dataset still has page 1.
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.clamp(1, page_count(total, page_size).max(1))
}

/// Index range of the records shown on `page`.
pub fn page_bounds(total: usize, page_size: usize, page: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    start..end
}

/// Computes the page numbers to show around `current`.
///
/// Returns `None` when there is nothing to paginate: no records, no page size,
/// or a page size larger than the dataset. The window holds at most
/// `window_size` pages and keeps the current page centered unless it is close
/// to either end of the dataset.
pub fn page_window(
    total: usize,
    page_size: usize,
    current: usize,
    window_size: usize,
) -> Option<PageWindow> {
    if total == 0 || page_size == 0 || page_size > total {
        return None;
    }

    let number_of_pages = page_count(total, page_size);
    let current = current.clamp(1, number_of_pages);
    let len = window_size.clamp(1, number_of_pages);

    let start = current
        .saturating_sub((len - 1) / 2)
        .min(number_of_pages - len + 1)
        .max(1);

    let pages = (start..start + len)
        .map(|number| PageLink {
            number,
            active: number == current,
        })
        .collect();

    Some(PageWindow {
        pages,
        previous: PageTarget {
            page: (current > 1).then(|| current - 1),
            disabled: current == 1,
        },
        next: PageTarget {
            page: Some(current + 1),
            disabled: current == number_of_pages,
        },
        current,
        number_of_pages,
    })
}
