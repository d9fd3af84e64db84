//! Pagination for admin listing endpoints.
//!
//! Listings accept either offset-based (`limit` + `offset`) or page-based
//! (`limit` + `page`) query parameters. When `page` is present it wins.
//!
//! ```ignore
//! // GET /api/auth/admin/users?limit=20&page=3
//! let users = store.list_users(&filter, params.limit(), params.offset()).await?;
//! let meta = PaginationMeta::for_window(total, &params, users.len());
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Query strings arrive as text; blank values mean "not provided".
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Metadata returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of matching items
    pub total: i64,
    /// Limit that was applied
    pub limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Whether more items exist past this window
    pub has_more: bool,
}

impl PaginationMeta {
    /// Builds the metadata for a window of `returned` items fetched with `params`.
    #[must_use]
    pub fn for_window(total: i64, params: &PaginationParams, returned: usize) -> Self {
        let offset = params.offset();
        let returned = i64::try_from(returned).unwrap_or(i64::MAX);
        Self {
            total,
            limit: params.limit(),
            offset: params.page().is_none().then_some(offset),
            page: params.page(),
            has_more: offset.saturating_add(returned) < total,
        }
    }
}

/// Pagination query parameters.
///
/// `limit` is clamped to `[1, MAX_LIMIT]`, `offset` to `>= 0` and `page` to `>= 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// 1-indexed page number
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        match self.page() {
            Some(page) => (page - 1).saturating_mul(self.limit()),
            None => self.offset.unwrap_or(0).max(0),
        }
    }

    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }
}
