use contracts::domain::a003_professional::{
    CreateProfessionalDto, Professional, UpdateProfessionalDto,
};

use crate::shared::crud::Resource;
use crate::shared::error::ApiError;
use crate::shared::http::ApiClient;

const PROFESSIONALS: Resource<Professional> = Resource::new("professional");

/// Fetch all professionals
pub async fn fetch_professionals(client: &ApiClient) -> Result<Vec<Professional>, ApiError> {
    PROFESSIONALS.list(client).await
}

pub async fn fetch_professional(client: &ApiClient, id: &str) -> Result<Professional, ApiError> {
    PROFESSIONALS.get(client, id).await
}

pub async fn create_professional(
    client: &ApiClient,
    dto: &CreateProfessionalDto,
) -> Result<Professional, ApiError> {
    PROFESSIONALS.create(client, dto).await
}

pub async fn update_professional(
    client: &ApiClient,
    id: &str,
    dto: &UpdateProfessionalDto,
) -> Result<Professional, ApiError> {
    PROFESSIONALS.update(client, id, dto).await
}

pub async fn delete_professional(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    PROFESSIONALS.delete(client, id).await
}

pub async fn bulk_create_professionals(
    client: &ApiClient,
    dtos: &[CreateProfessionalDto],
) -> Result<Vec<Professional>, ApiError> {
    PROFESSIONALS.bulk_create(client, dtos).await
}

pub async fn bulk_delete_professionals(client: &ApiClient, ids: &[String]) -> Result<(), ApiError> {
    PROFESSIONALS.bulk_delete(client, ids.iter().cloned()).await
}
