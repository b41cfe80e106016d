//! Pagination and ordering for list endpoints.
//!
//! The `sort` value comes straight from the query string and ends up in an
//! `ORDER BY` clause, which cannot take bind parameters. [`Filters::sort_column`]
//! therefore only ever hands out text taken from the static safelist, and
//! returns `None` for anything else.

use serde::Serialize;

use crate::validator::{permitted_value, Validator};

// ---------------------------------------------------------------------------
// Pagination bounds
// ---------------------------------------------------------------------------

/// Default page when `?page=` is absent.
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size when `?page_size=` is absent.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Highest page a client may request.
pub const MAX_PAGE: i64 = 10_000_000;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Sort order derived from the leading `-` of a sort token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Request-scoped pagination and sort parameters.
#[derive(Debug, Clone)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    pub fn new(
        page: i64,
        page_size: i64,
        sort: impl Into<String>,
        sort_safelist: &'static [&'static str],
    ) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            sort_safelist,
        }
    }

    /// Column to order by, with any leading `-` removed.
    ///
    /// The returned text is the safelist entry itself, never the client's
    /// string. `None` when `sort` is not in the safelist.
    pub fn sort_column(&self) -> Option<&'static str> {
        self.sort_safelist
            .iter()
            .copied()
            .find(|candidate| *candidate == self.sort)
            .map(|candidate| candidate.trim_start_matches('-'))
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Freeze these filters into a [`PageRequest`].
    ///
    /// `None` unless the sort token is in the safelist and page/page_size are
    /// within bounds, i.e. exactly when [`validate_filters`] passes.
    pub fn page_request(&self) -> Option<PageRequest> {
        let column = self.sort_column()?;
        let page_ok = (1..=MAX_PAGE).contains(&self.page);
        let size_ok = (1..=MAX_PAGE_SIZE).contains(&self.page_size);
        if !(page_ok && size_ok) {
            return None;
        }
        Some(PageRequest {
            page: self.page,
            page_size: self.page_size,
            column,
            direction: self.sort_direction(),
        })
    }
}

/// Validated pagination and ordering, ready to be turned into SQL.
///
/// Only constructible through [`Filters::page_request`], so holding one means
/// the sort column came from the safelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
    column: &'static str,
    direction: SortDirection,
}

impl PageRequest {
    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn sort_column(&self) -> &'static str {
        self.column
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.direction
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// `ORDER BY` body with `id` as the tie-breaker so pages stay stable.
    pub fn order_by(&self) -> String {
        format!("{} {}, id ASC", self.column, self.direction.as_sql())
    }

    /// Metadata for a result set of `total_records` rows.
    pub fn metadata(&self, total_records: i64) -> Metadata {
        calculate_metadata(total_records, self.page, self.page_size)
    }
}

/// Record every pagination/sort problem in `v`.
pub fn validate_filters(v: &mut Validator, f: &Filters) {
    v.check(f.page > 0, "page", "must be greater than zero");
    v.check(f.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
    v.check(f.page_size > 0, "page_size", "must be greater than zero");
    v.check(
        f.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );
    v.check(
        permitted_value(&f.sort.as_str(), f.sort_safelist),
        "sort",
        "invalid sort value",
    );
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Pagination summary returned alongside a page of results.
///
/// Zero fields are omitted, so an empty result serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// Build [`Metadata`] for a result set of `total_records` rows.
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records <= 0 || page_size <= 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}
