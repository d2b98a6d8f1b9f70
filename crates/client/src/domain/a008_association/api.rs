//! Link tables between resources.
//!
//! Each table is an [`Association`]; its methods are the operations
//! (`list`, `list_for`, `link`, `unlink`, `bulk_link`, `bulk_unlink`).

use contracts::domain::a008_association::{
    CommunityPlan, CommunityService, ServiceLocal, ServiceProfessional,
};

use crate::shared::crud::Association;

/// `/service-professional/{service_id}/{professional_id}/`
pub const SERVICE_PROFESSIONALS: Association<ServiceProfessional> =
    Association::new("service-professional");

/// `/service-local/{service_id}/{local_id}/`
pub const SERVICE_LOCALS: Association<ServiceLocal> = Association::new("service-local");

/// `/community-service/{community_id}/{service_id}/`
pub const COMMUNITY_SERVICES: Association<CommunityService> =
    Association::new("community-service");

/// `/community-plan/{community_id}/{plan_id}/`
pub const COMMUNITY_PLANS: Association<CommunityPlan> = Association::new("community-plan");
