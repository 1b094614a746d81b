//! Page/limit windows and the listing envelope shared by every job listing.

use serde::{Deserialize, Serialize};

use crate::Job;

/// Page used when the query omits one or carries an unusable value.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the query omits one or carries an unusable value.
pub const DEFAULT_LIMIT: i64 = 4;

/// Raw `?page=&limit=` query parameters, before coercion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

/// A coerced page request.
///
/// `limit` is always at least 1. `page` is not floored: a negative page
/// yields a negative [`PageRequest::skip`], which the store clamps through
/// [`PageRequest::offset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit < 1 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Coerce query-string values the way an integer prefix parse would:
    /// `"3"` and `"3abc"` give 3, while missing, empty, non-numeric or zero
    /// values fall back to the defaults.
    pub fn from_query(query: &PageQuery) -> Self {
        let page = query
            .page
            .as_deref()
            .and_then(parse_int_prefix)
            .unwrap_or(DEFAULT_PAGE);
        let limit = query
            .limit
            .as_deref()
            .and_then(parse_int_prefix)
            .unwrap_or(DEFAULT_LIMIT);
        Self::new(page, limit)
    }

    /// `(page - 1) * limit`, negative for pages below 1.
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Store offset: [`PageRequest::skip`] clamped at zero.
    pub fn offset(&self) -> u64 {
        self.skip().max(0) as u64
    }

    /// Number of pages needed to hold `total` items.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }

    /// Whether a page after this one exists.
    pub fn has_more(&self, total: u64) -> bool {
        self.page < self.total_pages(total) as i64
    }
}

fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Listing envelope: `{jobs, currentPage, totalPages, totalJobs, hasMore}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub current_page: i64,
    pub total_pages: u64,
    pub total_jobs: u64,
    pub has_more: bool,
}

impl JobPage {
    pub fn new(jobs: Vec<Job>, request: PageRequest, total: u64) -> Self {
        Self {
            jobs,
            current_page: request.page,
            total_pages: request.total_pages(total),
            total_jobs: total,
            has_more: request.has_more(total),
        }
    }
}
