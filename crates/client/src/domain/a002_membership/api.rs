use contracts::domain::a002_membership::{
    CreateMembershipDto, CreateMembershipPlanDto, Membership, MembershipPlan,
    UpdateMembershipDto, UpdateMembershipPlanDto,
};

use crate::shared::crud::{fetch_list, Resource};
use crate::shared::error::ApiError;
use crate::shared::http::{ApiClient, ApiRequest};
use crate::system::users::api::USERS;

const PLANS: Resource<MembershipPlan> = Resource::new("membership-plan");
const MEMBERSHIPS: Resource<Membership> = Resource::new("membership");

// ============================================================================
// Membership plans
// ============================================================================

pub async fn fetch_plans(client: &ApiClient) -> Result<Vec<MembershipPlan>, ApiError> {
    PLANS.list(client).await
}

pub async fn fetch_plan(client: &ApiClient, id: &str) -> Result<MembershipPlan, ApiError> {
    PLANS.get(client, id).await
}

pub async fn create_plan(
    client: &ApiClient,
    dto: &CreateMembershipPlanDto,
) -> Result<MembershipPlan, ApiError> {
    PLANS.create(client, dto).await
}

pub async fn update_plan(
    client: &ApiClient,
    id: &str,
    dto: &UpdateMembershipPlanDto,
) -> Result<MembershipPlan, ApiError> {
    PLANS.update(client, id, dto).await
}

pub async fn delete_plan(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    PLANS.delete(client, id).await
}

pub async fn bulk_create_plans(
    client: &ApiClient,
    dtos: &[CreateMembershipPlanDto],
) -> Result<Vec<MembershipPlan>, ApiError> {
    PLANS.bulk_create(client, dtos).await
}

pub async fn bulk_delete_plans(client: &ApiClient, ids: &[String]) -> Result<(), ApiError> {
    PLANS.bulk_delete(client, ids.iter().cloned()).await
}

// ============================================================================
// Memberships
// ============================================================================

pub async fn fetch_memberships(client: &ApiClient) -> Result<Vec<Membership>, ApiError> {
    MEMBERSHIPS.list(client).await
}

pub async fn fetch_membership(client: &ApiClient, id: &str) -> Result<Membership, ApiError> {
    MEMBERSHIPS.get(client, id).await
}

pub async fn create_membership(
    client: &ApiClient,
    dto: &CreateMembershipDto,
) -> Result<Membership, ApiError> {
    MEMBERSHIPS.create(client, dto).await
}

pub async fn update_membership(
    client: &ApiClient,
    id: &str,
    dto: &UpdateMembershipDto,
) -> Result<Membership, ApiError> {
    MEMBERSHIPS.update(client, id, dto).await
}

pub async fn delete_membership(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    MEMBERSHIPS.delete(client, id).await
}

pub async fn bulk_create_memberships(
    client: &ApiClient,
    dtos: &[CreateMembershipDto],
) -> Result<Vec<Membership>, ApiError> {
    MEMBERSHIPS.bulk_create(client, dtos).await
}

pub async fn bulk_delete_memberships(client: &ApiClient, ids: &[String]) -> Result<(), ApiError> {
    MEMBERSHIPS.bulk_delete(client, ids.iter().cloned()).await
}

/// Memberships of one user, plan included.
///
/// The endpoint answers either a bare array or `{ "memberships": [...] }`
/// depending on the backend version; both come out as a plain list.
pub async fn get_user_memberships(
    client: &ApiClient,
    user_id: &str,
) -> Result<Vec<Membership>, ApiError> {
    fetch_list(client, ApiRequest::get(USERS.nested(user_id, "memberships"))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Reply, StubBackend};
    use contracts::domain::a002_membership::MembershipStatus;
    use serde_json::json;

    const PATH: &str = "/user/u-123/memberships/";

    #[tokio::test]
    async fn test_user_memberships_wrapped_empty() {
        let backend = StubBackend::start().await;
        backend.on("GET", PATH, Reply::json(200, json!({"memberships": []})));
        let (client, _store) = backend.client();

        assert!(get_user_memberships(&client, "u-123").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_memberships_bare_empty() {
        let backend = StubBackend::start().await;
        backend.on("GET", PATH, Reply::json(200, json!([])));
        let (client, _store) = backend.client();

        assert!(get_user_memberships(&client, "u-123").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_memberships_with_plan() {
        let backend = StubBackend::start().await;
        backend.on(
            "GET",
            PATH,
            Reply::json(
                200,
                json!({"memberships": [{
                    "id": "m-1",
                    "user_id": "u-123",
                    "plan_id": "p-1",
                    "status": "expired",
                    "plan": {"id": "p-1", "name": "Mensual", "price": 39.9}
                }]}),
            ),
        );
        let (client, _store) = backend.client();

        let memberships = get_user_memberships(&client, "u-123").await.unwrap();
        assert_eq!(memberships[0].status, MembershipStatus::Expired);
        assert_eq!(memberships[0].plan.as_ref().unwrap().name, "Mensual");
    }

    #[tokio::test]
    async fn test_user_memberships_validation_error() {
        let backend = StubBackend::start().await;
        backend.on(
            "GET",
            PATH,
            Reply::json(422, json!({"message": "UUID del usuario inválido"})),
        );
        let (client, _store) = backend.client();

        let err = get_user_memberships(&client, "u-123").await.unwrap_err();
        assert_eq!(err.to_string(), "UUID del usuario inválido");
        assert_eq!(err.status(), Some(422));
    }

    #[tokio::test]
    async fn test_plan_crud_paths() {
        let backend = StubBackend::start().await;
        backend.on(
            "POST",
            "/membership-plan/",
            Reply::json(201, json!({"id": "p-1", "name": "Bono 10", "price": 80.0, "session_limit": 10})),
        );
        backend.on("DELETE", "/membership-plan/p-1/", Reply::empty(204));
        let (client, _store) = backend.client();

        let dto = CreateMembershipPlanDto {
            name: "Bono 10".into(),
            description: None,
            price: 80.0,
            duration_days: Some(90),
            session_limit: Some(10),
        };
        let plan = create_plan(&client, &dto).await.unwrap();
        assert_eq!(plan.session_limit, Some(10));
        delete_plan(&client, &plan.id).await.unwrap();
        assert_eq!(
            backend.last("POST", "/membership-plan/").json(),
            json!({"name": "Bono 10", "price": 80.0, "duration_days": 90, "session_limit": 10})
        );
    }
}
