use contracts::domain::a004_service::{CreateServiceDto, Service, UpdateServiceDto};
use contracts::domain::a008_association::{ServiceLocal, ServiceProfessional};

use crate::domain::a008_association::api::{SERVICE_LOCALS, SERVICE_PROFESSIONALS};
use crate::shared::crud::Resource;
use crate::shared::error::ApiError;
use crate::shared::http::ApiClient;

const SERVICES: Resource<Service> = Resource::new("service");

pub async fn fetch_services(client: &ApiClient) -> Result<Vec<Service>, ApiError> {
    SERVICES.list(client).await
}

pub async fn fetch_service(client: &ApiClient, id: &str) -> Result<Service, ApiError> {
    SERVICES.get(client, id).await
}

pub async fn create_service(
    client: &ApiClient,
    dto: &CreateServiceDto,
) -> Result<Service, ApiError> {
    SERVICES.create(client, dto).await
}

pub async fn update_service(
    client: &ApiClient,
    id: &str,
    dto: &UpdateServiceDto,
) -> Result<Service, ApiError> {
    SERVICES.update(client, id, dto).await
}

pub async fn delete_service(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    SERVICES.delete(client, id).await
}

pub async fn bulk_create_services(
    client: &ApiClient,
    dtos: &[CreateServiceDto],
) -> Result<Vec<Service>, ApiError> {
    SERVICES.bulk_create(client, dtos).await
}

pub async fn bulk_delete_services(client: &ApiClient, ids: &[String]) -> Result<(), ApiError> {
    SERVICES.bulk_delete(client, ids.iter().cloned()).await
}

/// Professionals qualified for a service
pub async fn get_service_professionals(
    client: &ApiClient,
    service_id: &str,
) -> Result<Vec<ServiceProfessional>, ApiError> {
    SERVICE_PROFESSIONALS.list_for(client, service_id).await
}

/// Locals where a service can be held
pub async fn get_service_locals(
    client: &ApiClient,
    service_id: &str,
) -> Result<Vec<ServiceLocal>, ApiError> {
    SERVICE_LOCALS.list_for(client, service_id).await
}
