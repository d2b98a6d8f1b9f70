use contracts::domain::a005_local::{CreateLocalDto, Local, UpdateLocalDto};

use crate::shared::crud::Resource;
use crate::shared::error::ApiError;
use crate::shared::http::ApiClient;

const LOCALS: Resource<Local> = Resource::new("local");

pub async fn fetch_locals(client: &ApiClient) -> Result<Vec<Local>, ApiError> {
    LOCALS.list(client).await
}

pub async fn fetch_local(client: &ApiClient, id: &str) -> Result<Local, ApiError> {
    LOCALS.get(client, id).await
}

pub async fn create_local(client: &ApiClient, dto: &CreateLocalDto) -> Result<Local, ApiError> {
    LOCALS.create(client, dto).await
}

pub async fn update_local(
    client: &ApiClient,
    id: &str,
    dto: &UpdateLocalDto,
) -> Result<Local, ApiError> {
    LOCALS.update(client, id, dto).await
}

pub async fn delete_local(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    LOCALS.delete(client, id).await
}

pub async fn bulk_create_locals(
    client: &ApiClient,
    dtos: &[CreateLocalDto],
) -> Result<Vec<Local>, ApiError> {
    LOCALS.bulk_create(client, dtos).await
}

pub async fn bulk_delete_locals(client: &ApiClient, ids: &[String]) -> Result<(), ApiError> {
    LOCALS.bulk_delete(client, ids.iter().cloned()).await
}
