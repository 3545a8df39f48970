//! Sorting, paging, and substring-matching rules for book listings.
//!
//! This is the single place where list parameters are normalized. The API
//! layer and the repository both go through these helpers, so the sort-field
//! allow-list exists exactly once.

/// Default page size when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size accepted for a listing.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Columns a listing may be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    Isbn,
    #[default]
    Title,
    Author,
    Status,
}

impl SortField {
    /// Resolve a user-supplied sort key. Absent or unknown keys fall back to
    /// [`SortField::Title`].
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("isbn") => Self::Isbn,
            Some("title") => Self::Title,
            Some("author") => Self::Author,
            Some("status") => Self::Status,
            _ => Self::default(),
        }
    }

    /// Column name for `ORDER BY`. Always one of a fixed set of identifiers.
    pub fn column(self) -> &'static str {
        match self {
            Self::Isbn => "isbn",
            Self::Title => "title",
            Self::Author => "author",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only a case-insensitive `"desc"` sorts descending.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Clamp a page size into `1..=MAX_PAGE_SIZE`, defaulting when absent.
pub fn clamp_page_size(page_size: Option<i64>) -> i64 {
    page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE)
}

/// Pages are 1-based; anything below 1 is treated as the first page.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Row offset for a 1-based page. Saturates instead of overflowing, so a
/// page far past the end yields an empty page.
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    (page - 1).saturating_mul(page_size)
}

/// Number of pages needed for `total_items`. An empty result is one page.
pub fn total_pages(total_items: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 1;
    }
    let pages = (total_items + page_size - 1) / page_size;
    pages.max(1)
}

/// Build an `ILIKE` pattern matching `needle` as a literal substring.
///
/// `\`, `%` and `_` are escaped with a backslash (PostgreSQL's default LIKE
/// escape character), so user input never acts as a wildcard.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive literal substring test. Mirrors [`contains_pattern`] for
/// implementations that filter in memory.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
