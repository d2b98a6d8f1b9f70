use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::string_or_number;
use crate::system::users::UserRole;

/// One audited backend event (successful or failed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    pub action: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub created_at: String,
}

/// Filters of the audit and error log views.
///
/// Field names are the ones the views use; the serde renames are the query
/// parameter names the backend expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "page_size", skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(rename = "user_email", skip_serializing_if = "Option::is_none")]
    pub user_search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Normalised page handed to the views; never has missing numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogPage<T> {
    pub logs: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// Paginated listing as the backend sends it; every field may be missing
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PagedLogs<T> {
    #[serde(default = "Option::default", alias = "items", alias = "data")]
    pub logs: Option<Vec<T>>,
    #[serde(default, alias = "total")]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, alias = "limit")]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Known shapes of `GET /audit-log/`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LogShape<T> {
    Bare(Vec<T>),
    Paged(PagedLogs<T>),
}

impl<T> LogShape<T> {
    pub fn into_page(self) -> LogPage<T> {
        match self {
            LogShape::Bare(logs) => LogPage {
                total: logs.len() as u64,
                logs,
                page: DEFAULT_PAGE,
                limit: DEFAULT_PAGE_SIZE,
                total_pages: 1,
            },
            LogShape::Paged(paged) => LogPage {
                logs: paged.logs.unwrap_or_default(),
                total: paged.total_count.unwrap_or(0),
                page: paged.page.unwrap_or(DEFAULT_PAGE),
                limit: paged.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
                total_pages: paged.total_pages.unwrap_or(1),
            },
        }
    }
}

impl<T> Default for LogPage<T> {
    fn default() -> Self {
        Self {
            logs: Vec::new(),
            total: 0,
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
            total_pages: 1,
        }
    }
}

/// `GET /audit-log/stats/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogStats {
    #[serde(default, alias = "total")]
    pub total_logs: u64,
    #[serde(default, alias = "success_count")]
    pub successful: u64,
    #[serde(default, alias = "failure_count")]
    pub failed: u64,
    #[serde(default)]
    pub by_action: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_entity_type: BTreeMap<String, u64>,
}

/// Query of `DELETE /audit-log/cleanup/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupQuery {
    pub days_old: u32,
    pub success: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupResult {
    #[serde(default, alias = "deleted")]
    pub deleted_count: u64,
    #[serde(default)]
    pub message: Option<String>,
}
