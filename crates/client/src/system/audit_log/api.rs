//! Audit and error logs.
//!
//! Both views read the same `/audit-log/` endpoints; the audit view always
//! asks for successful entries and the error view for failed ones, whatever
//! the caller put in the filters.

use contracts::shared::api_response::Payload;
use contracts::system::audit_log::{
    AuditLog, AuditLogFilters, AuditLogStats, CleanupQuery, CleanupResult, LogPage, LogShape,
};
use serde::Serialize;

use crate::shared::error::ApiError;
use crate::shared::http::{ApiClient, ApiRequest};

const LOGS_PATH: &str = "/audit-log/";
const STATS_PATH: &str = "/audit-log/stats/";
const CLEANUP_PATH: &str = "/audit-log/cleanup/";

#[derive(Serialize)]
struct StatsQuery {
    success: bool,
}

/// Successful entries; `filters.success` is ignored
pub async fn get_audit_logs(
    client: &ApiClient,
    filters: &AuditLogFilters,
) -> Result<LogPage<AuditLog>, ApiError> {
    fetch_logs(client, filters, true).await
}

/// Failed entries; `filters.success` is ignored
pub async fn get_error_logs(
    client: &ApiClient,
    filters: &AuditLogFilters,
) -> Result<LogPage<AuditLog>, ApiError> {
    fetch_logs(client, filters, false).await
}

pub async fn get_audit_stats(client: &ApiClient) -> Result<AuditLogStats, ApiError> {
    fetch_stats(client, true).await
}

pub async fn get_error_stats(client: &ApiClient) -> Result<AuditLogStats, ApiError> {
    fetch_stats(client, false).await
}

/// Delete successful entries older than `days_old` days
pub async fn cleanup_audit_logs(
    client: &ApiClient,
    days_old: u32,
) -> Result<CleanupResult, ApiError> {
    cleanup(client, days_old, true).await
}

/// Delete failed entries older than `days_old` days
pub async fn cleanup_error_logs(
    client: &ApiClient,
    days_old: u32,
) -> Result<CleanupResult, ApiError> {
    cleanup(client, days_old, false).await
}

async fn fetch_logs(
    client: &ApiClient,
    filters: &AuditLogFilters,
    success: bool,
) -> Result<LogPage<AuditLog>, ApiError> {
    let filters = AuditLogFilters {
        success: Some(success),
        ..filters.clone()
    };
    let request = ApiRequest::get(LOGS_PATH).query(&filters)?;
    let shape: Option<LogShape<AuditLog>> = client.request(request).await?;
    Ok(shape.map(LogShape::into_page).unwrap_or_default())
}

async fn fetch_stats(client: &ApiClient, success: bool) -> Result<AuditLogStats, ApiError> {
    let request = ApiRequest::get(STATS_PATH).query(&StatsQuery { success })?;
    let stats: Option<Payload<AuditLogStats>> = client.request(request).await?;
    Ok(stats.map(Payload::into_inner).unwrap_or_default())
}

async fn cleanup(
    client: &ApiClient,
    days_old: u32,
    success: bool,
) -> Result<CleanupResult, ApiError> {
    let request = ApiRequest::delete(CLEANUP_PATH).query(&CleanupQuery { days_old, success })?;
    let result: Option<Payload<CleanupResult>> = client.request(request).await?;
    let result = result.map(Payload::into_inner).unwrap_or_default();
    tracing::info!(
        "Removed {} {} log entries older than {} days",
        result.deleted_count,
        if success { "audit" } else { "error" },
        days_old
    );
    Ok(result)
}
