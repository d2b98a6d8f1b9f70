use serde::{Deserialize, Serialize};

use crate::domain::common::{default_true, RecordMetadata};

// ============================================================================
// Membership plan
// ============================================================================

/// A purchasable plan (monthly pass, ten-session bundle, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipPlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    /// Validity of a membership bought on this plan
    #[serde(default)]
    pub duration_days: Option<u32>,
    /// Sessions included; `None` means unlimited
    #[serde(default)]
    pub session_limit: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(flatten)]
    pub metadata: RecordMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembershipPlanDto {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMembershipPlanDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ============================================================================
// Membership (a plan bought by a user)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Active,
    Expired,
    Cancelled,
    Pending,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    #[serde(default)]
    pub community_id: Option<String>,
    #[serde(default)]
    pub status: MembershipStatus,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub sessions_used: u32,
    /// Denormalised plan, present on the per-user listing
    #[serde(default)]
    pub plan: Option<MembershipPlan>,

    #[serde(flatten)]
    pub metadata: RecordMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembershipDto {
    pub user_id: String,
    pub plan_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMembershipDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MembershipStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_tolerates_minimal_payload() {
        let json = r#"{"id":"m-1","user_id":"u-1","plan_id":"p-1"}"#;
        let membership: Membership = serde_json::from_str(json).unwrap();
        assert_eq!(membership.status, MembershipStatus::Active);
        assert_eq!(membership.sessions_used, 0);
        assert!(membership.plan.is_none());
        assert_eq!(membership.metadata, RecordMetadata::default());
    }

    #[test]
    fn test_unknown_status_does_not_fail() {
        let json = r#"{"id":"m-1","user_id":"u-1","plan_id":"p-1","status":"frozen"}"#;
        let membership: Membership = serde_json::from_str(json).unwrap();
        assert_eq!(membership.status, MembershipStatus::Unknown);
    }
}
