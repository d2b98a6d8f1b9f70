use contracts::domain::a001_community::{Community, CreateCommunityDto, UpdateCommunityDto};
use contracts::domain::a008_association::{CommunityPlan, CommunityService};

use crate::domain::a008_association::api::{COMMUNITY_PLANS, COMMUNITY_SERVICES};
use crate::shared::crud::Resource;
use crate::shared::error::ApiError;
use crate::shared::http::ApiClient;

const COMMUNITIES: Resource<Community> = Resource::new("community");

/// Fetch all communities
pub async fn fetch_communities(client: &ApiClient) -> Result<Vec<Community>, ApiError> {
    COMMUNITIES.list(client).await
}

pub async fn fetch_community(client: &ApiClient, id: &str) -> Result<Community, ApiError> {
    COMMUNITIES.get(client, id).await
}

pub async fn create_community(
    client: &ApiClient,
    dto: &CreateCommunityDto,
) -> Result<Community, ApiError> {
    COMMUNITIES.create(client, dto).await
}

pub async fn update_community(
    client: &ApiClient,
    id: &str,
    dto: &UpdateCommunityDto,
) -> Result<Community, ApiError> {
    COMMUNITIES.update(client, id, dto).await
}

pub async fn delete_community(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    COMMUNITIES.delete(client, id).await
}

pub async fn bulk_create_communities(
    client: &ApiClient,
    dtos: &[CreateCommunityDto],
) -> Result<Vec<Community>, ApiError> {
    COMMUNITIES.bulk_create(client, dtos).await
}

pub async fn bulk_delete_communities(client: &ApiClient, ids: &[String]) -> Result<(), ApiError> {
    COMMUNITIES.bulk_delete(client, ids.iter().cloned()).await
}

/// Services offered by a community
pub async fn get_community_services(
    client: &ApiClient,
    community_id: &str,
) -> Result<Vec<CommunityService>, ApiError> {
    COMMUNITY_SERVICES.list_for(client, community_id).await
}

/// Membership plans sold by a community
pub async fn get_community_plans(
    client: &ApiClient,
    community_id: &str,
) -> Result<Vec<CommunityPlan>, ApiError> {
    COMMUNITY_PLANS.list_for(client, community_id).await
}
