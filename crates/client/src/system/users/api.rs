use contracts::system::users::{
    ChangePasswordDto, CreateUserDto, UpdateUserDto, User, UserFilters,
};
use serde::de::IgnoredAny;

use crate::shared::crud::Resource;
use crate::shared::error::ApiError;
use crate::shared::http::{ApiClient, ApiRequest};

/// Also the parent of the per-user listings (`/user/{id}/memberships/`, ...)
pub(crate) const USERS: Resource<User> = Resource::new("user");

/// Fetch all users
pub async fn fetch_users(client: &ApiClient) -> Result<Vec<User>, ApiError> {
    USERS.list(client).await
}

/// Users matching search, role and paging filters
pub async fn list_users(client: &ApiClient, filters: &UserFilters) -> Result<Vec<User>, ApiError> {
    USERS.list_filtered(client, filters).await
}

pub async fn fetch_user(client: &ApiClient, id: &str) -> Result<User, ApiError> {
    USERS.get(client, id).await
}

/// Create new user
pub async fn create_user(client: &ApiClient, dto: &CreateUserDto) -> Result<User, ApiError> {
    USERS.create(client, dto).await
}

/// Update user
pub async fn update_user(
    client: &ApiClient,
    id: &str,
    dto: &UpdateUserDto,
) -> Result<User, ApiError> {
    USERS.update(client, id, dto).await
}

/// Delete user
pub async fn delete_user(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    USERS.delete(client, id).await
}

pub async fn bulk_create_users(
    client: &ApiClient,
    dtos: &[CreateUserDto],
) -> Result<Vec<User>, ApiError> {
    USERS.bulk_create(client, dtos).await
}

pub async fn bulk_delete_users(client: &ApiClient, ids: &[String]) -> Result<(), ApiError> {
    USERS.bulk_delete(client, ids.iter().cloned()).await
}

/// Change password
pub async fn change_password(
    client: &ApiClient,
    user_id: &str,
    dto: &ChangePasswordDto,
) -> Result<(), ApiError> {
    let request = ApiRequest::post(USERS.action(user_id, "change-password")).json(dto)?;
    client.request::<IgnoredAny>(request).await.map(|_| ())
}
