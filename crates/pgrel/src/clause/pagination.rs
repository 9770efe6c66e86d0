use super::Order;
use serde::Deserialize;

/// Page request as received from callers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paging {
    pub page_number: Option<i64>,
    /// `None` or a non-positive size disables paging.
    pub page_size: Option<i64>,
    pub order: Option<Order>,
}

impl Paging {
    pub fn new(page_number: i64, page_size: i64) -> Self {
        Self {
            page_number: Some(page_number),
            page_size: Some(page_size),
            order: None,
        }
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Effective page size, if paging is enabled.
    pub fn size(&self) -> Option<i64> {
        self.page_size.filter(|n| *n > 0)
    }
}

/// The LIMIT/OFFSET tail for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// `None` when paging is disabled.
    pub sql: Option<String>,
    pub page_number: i64,
    pub row_offset: i64,
}

/// Compute the window for `paging`. Page numbers below 1 are clamped to 1.
pub fn paginate(paging: &Paging) -> PageWindow {
    let page_number = paging.page_number.unwrap_or(1).max(1);
    let Some(size) = paging.size() else {
        return PageWindow {
            sql: None,
            page_number: 1,
            row_offset: 0,
        };
    };
    if page_number == 1 {
        return PageWindow {
            sql: Some(format!(" LIMIT {size}")),
            page_number,
            row_offset: 0,
        };
    }
    let row_offset = (page_number - 1).saturating_mul(size);
    PageWindow {
        sql: Some(format!(" OFFSET {row_offset} LIMIT {size}")),
        page_number,
        row_offset,
    }
}

/// Number of pages for `total` rows. Without a page size everything is one page.
pub fn total_pages(total: i64, page_size: Option<i64>) -> i64 {
    match page_size.filter(|n| *n > 0) {
        None => i64::from(total > 0),
        Some(size) if total % size == 0 => total / size,
        Some(size) => total / size + 1,
    }
}

/// ` LIMIT n` for a positive limit, nothing otherwise.
pub fn sql_limit(limit: Option<i64>) -> String {
    match limit {
        Some(n) if n > 0 => format!(" LIMIT {n}"),
        _ => String::new(),
    }
}
