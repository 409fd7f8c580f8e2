//! Shared listing, pagination and upload helpers used by every resource router.

pub mod extract;
pub mod tracing;
pub mod upload;
pub mod utils;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::AppError;
use crate::storage::FileRemoval;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Sort direction accepted in the `order` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "ASC" => Some(SortOrder::Asc),
            "DESC" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// The closed set of columns a resource may be sorted by.
///
/// Values only ever reach SQL through [`SortKey::column`], so a caller can
/// never inject an arbitrary column name.
pub trait SortKey: Sized + Copy + std::fmt::Debug {
    const DEFAULT: Self;
    const DEFAULT_ORDER: SortOrder;

    fn parse(raw: &str) -> Option<Self>;
    fn column(self) -> &'static str;
}

/// Raw `?page=&pageSize=&sortBy=&order=&search=` query string.
///
/// Numbers are kept as strings so unparsable values fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
}

/// A validated list request.
#[derive(Debug, Clone)]
pub struct ListQuery<K: SortKey> {
    pub page: i64,
    pub page_size: i64,
    pub sort: K,
    pub order: SortOrder,
    pub search: Option<String>,
}

impl<K: SortKey> ListQuery<K> {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// `ORDER BY` clause built from the allow-listed key, ties broken by id.
    pub fn order_by_clause(&self) -> String {
        let order = self.order.as_sql();
        let column = self.sort.column();
        if column == "id" {
            format!("ORDER BY id {}", order)
        } else {
            format!("ORDER BY {} {}, id {}", column, order, order)
        }
    }

    pub fn pagination(&self, total: i64) -> PaginationInfo {
        PaginationInfo::new(total, self.page, self.page_size)
    }
}

impl ListParams {
    pub fn validate<K: SortKey>(&self) -> Result<ListQuery<K>, AppError> {
        let sort = match self.sort_by.as_deref() {
            None => K::DEFAULT,
            Some(raw) => K::parse(raw)
                .ok_or_else(|| AppError::Validation("Invalid sortBy or order parameter".into()))?,
        };

        let order = match self.order.as_deref() {
            None => K::DEFAULT_ORDER,
            Some(raw) => SortOrder::parse(raw)
                .ok_or_else(|| AppError::Validation("Invalid sortBy or order parameter".into()))?,
        };

        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(ListQuery {
            page: parse_positive(self.page.as_deref(), DEFAULT_PAGE),
            page_size: parse_positive(self.page_size.as_deref(), DEFAULT_PAGE_SIZE),
            sort,
            order,
            search,
        })
    }
}

fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default)
        .max(1)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl PaginationInfo {
    pub fn new(total: i64, page: i64, page_size: i64) -> Self {
        // No `total + page_size` term: page_size may be as large as i64::MAX.
        let total_pages = if total <= 0 {
            0
        } else {
            (total - 1) / page_size + 1
        };

        Self {
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

/// Body of a delete-all on a file-backed resource: one entry per stored file.
#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub message: String,
    pub deleted: u64,
    pub files: Vec<FileRemoval>,
}

/// Escapes `%`, `_` and `\` so a search term matches literally inside `LIKE ... ESCAPE '\'`.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Portrait (1) or landscape (2).
pub fn validate_orientation(orientation: i64) -> Result<i64, AppError> {
    match orientation {
        1 | 2 => Ok(orientation),
        other => Err(AppError::Validation(format!(
            "orientation must be 1 (portrait) or 2 (landscape), got {}",
            other
        ))),
    }
}

/// A required text field: present and not blank.
pub fn require_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}

/// An optional text field that, when supplied, must not be blank.
pub fn non_blank(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(AppError::Validation(format!("{} must not be empty", field)))
        }
        other => Ok(other),
    }
}

/// Accepts an integer either as a JSON number or as a numeric string.
/// Null, a missing field or an empty string all read as `None`.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Str(String),
    }

    match Option::<IntOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrString::Int(n)) => Ok(Some(n)),
        Some(IntOrString::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(IntOrString::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected an integer, got '{}'", s))),
    }
}
