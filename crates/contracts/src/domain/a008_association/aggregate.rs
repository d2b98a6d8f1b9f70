//! Rows of the many-to-many link tables.
//!
//! Each row is just the pair of ids; the backend keys the row by the pair.

use serde::{Deserialize, Serialize};

/// A link row with a left and a right id, in that order on the wire path
pub trait AssociationRow {
    fn left_id(&self) -> &str;
    fn right_id(&self) -> &str;
}

macro_rules! association_row {
    ($(#[$doc:meta])* $name:ident, $left:ident, $right:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            pub $left: String,
            pub $right: String,
        }

        impl $name {
            pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
                Self {
                    $left: left.into(),
                    $right: right.into(),
                }
            }
        }

        impl AssociationRow for $name {
            fn left_id(&self) -> &str {
                &self.$left
            }

            fn right_id(&self) -> &str {
                &self.$right
            }
        }
    };
}

association_row!(
    /// Professional qualified to run a service
    ServiceProfessional,
    service_id,
    professional_id
);
association_row!(
    /// Local where a service can be held
    ServiceLocal,
    service_id,
    local_id
);
association_row!(
    /// Service offered by a community
    CommunityService,
    community_id,
    service_id
);
association_row!(
    /// Membership plan sold by a community
    CommunityPlan,
    community_id,
    plan_id
);
