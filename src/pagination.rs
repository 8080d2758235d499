//! Page metadata for the list views.
//!
//! Page counts are derived from `total / limit` as a float. By default the page
//! count is that quotient truncated, so a trailing partial page is not counted
//! in `total_pages` (it is still reachable through `next_page`). With
//! [`PageCountMode::RoundUp`] the quotient is rounded up first.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCountMode {
    #[default]
    Truncate,
    RoundUp,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("limit must be greater than zero")]
    ZeroLimit,
    #[error("page numbers start at 1")]
    ZeroPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub next_page: Option<u64>,
    pub prev_page: Option<u64>,
    pub page_range: Vec<u64>,
    #[serde(skip)]
    pub offset: u64,
}

pub fn paginate(
    total: u64,
    page: u64,
    limit: u64,
    mode: PageCountMode,
) -> Result<PageInfo, PaginationError> {
    if limit == 0 {
        return Err(PaginationError::ZeroLimit);
    }
    if page == 0 {
        return Err(PaginationError::ZeroPage);
    }

    let quotient = total as f64 / limit as f64;
    let raw_pages = match mode {
        PageCountMode::Truncate => quotient,
        PageCountMode::RoundUp => quotient.ceil(),
    };
    let total_pages = raw_pages.trunc() as u64;

    let next_page = if (page as f64) < raw_pages {
        Some(page + 1)
    } else {
        None
    };
    let prev_page = if page > 1 { Some(page - 1) } else { None };

    Ok(PageInfo {
        page,
        limit,
        total_items: total,
        total_pages,
        next_page,
        prev_page,
        page_range: (1..=total_pages).collect(),
        offset: (page - 1).saturating_mul(limit),
    })
}
