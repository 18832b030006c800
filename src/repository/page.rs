//! Offset pagination for listings.

/// Default number of rows per listing page.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// One page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub number: u32,
    pub per_page: u32,
    /// Total rows across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Number of pages; an empty listing still has one (empty) page.
    pub fn num_pages(&self) -> u32 {
        num_pages(self.total, self.per_page)
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    pub fn previous_number(&self) -> u32 {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_number(&self) -> u32 {
        (self.number + 1).min(self.num_pages())
    }
}

/// Number of pages needed for `total` rows.
pub fn num_pages(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    total.div_ceil(per_page).max(1) as u32
}

/// Resolve a raw `page` parameter against the page count.
///
/// Anything that is not an integer yields the first page; integers out of
/// range yield the last page.
pub fn resolve_page_number(raw: Option<&str>, num_pages: u32) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 1;
    };
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 && n <= i64::from(num_pages) => n as u32,
        Ok(_) => num_pages,
        Err(_) => 1,
    }
}

/// Row offset for a 1-based page number.
pub fn offset_for(number: u32, per_page: u32) -> i64 {
    i64::from(number.saturating_sub(1)) * i64::from(per_page)
}
