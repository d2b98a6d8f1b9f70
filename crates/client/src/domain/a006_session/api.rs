use contracts::domain::a006_session::{
    CreateSessionDto, Session, SessionFilters, UpdateSessionDto,
};

use crate::shared::crud::Resource;
use crate::shared::error::ApiError;
use crate::shared::http::ApiClient;

const SESSIONS: Resource<Session> = Resource::new("session");

/// Sessions matching the filters; an empty filter lists everything
pub async fn list_sessions(
    client: &ApiClient,
    filters: &SessionFilters,
) -> Result<Vec<Session>, ApiError> {
    SESSIONS.list_filtered(client, filters).await
}

pub async fn fetch_sessions(client: &ApiClient) -> Result<Vec<Session>, ApiError> {
    SESSIONS.list(client).await
}

pub async fn fetch_session(client: &ApiClient, id: &str) -> Result<Session, ApiError> {
    SESSIONS.get(client, id).await
}

pub async fn create_session(
    client: &ApiClient,
    dto: &CreateSessionDto,
) -> Result<Session, ApiError> {
    SESSIONS.create(client, dto).await
}

pub async fn update_session(
    client: &ApiClient,
    id: &str,
    dto: &UpdateSessionDto,
) -> Result<Session, ApiError> {
    SESSIONS.update(client, id, dto).await
}

pub async fn delete_session(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    SESSIONS.delete(client, id).await
}

pub async fn bulk_create_sessions(
    client: &ApiClient,
    dtos: &[CreateSessionDto],
) -> Result<Vec<Session>, ApiError> {
    SESSIONS.bulk_create(client, dtos).await
}

pub async fn bulk_delete_sessions(client: &ApiClient, ids: &[String]) -> Result<(), ApiError> {
    SESSIONS.bulk_delete(client, ids.iter().cloned()).await
}
