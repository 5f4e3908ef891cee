//! Users
//!
//! Three roles exist: Super Admin runs the web panel, Admin and Sub Seizer
//! use the mobile app. Sub Seizers carry a group list restricting which
//! vehicle types they may see.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Role names as stored in the database
pub mod roles {
    pub const SUPER_ADMIN: &str = "Super Admin";
    pub const ADMIN: &str = "Admin";
    pub const SUB_SEIZER: &str = "Sub Seizer";

    pub fn is_assignable(role: &str) -> bool {
        role == ADMIN || role == SUB_SEIZER
    }
}

/// Account status values
pub mod statuses {
    pub const ACTIVE: &str = "Active";
    pub const INACTIVE: &str = "Inactive";
    pub const HOLD: &str = "Hold";

    pub fn is_valid(status: &str) -> bool {
        status == ACTIVE || status == INACTIVE || status == HOLD
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub employee_id: String,
    pub mobile_no: String,
    pub status: String,
    pub i_card: Option<String>,
    pub profile_image: Option<String>,
    pub role: String,
    #[serde(rename = "group")]
    pub groups: Vec<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_super_admin(&self) -> bool {
        self.role == roles::SUPER_ADMIN
    }

    pub fn is_admin_or_above(&self) -> bool {
        self.role == roles::SUPER_ADMIN || self.role == roles::ADMIN
    }

    pub fn is_active(&self) -> bool {
        self.status == statuses::ACTIVE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Test User".to_string(),
            username: "test".to_string(),
            password_hash: "hash".to_string(),
            employee_id: "1234".to_string(),
            mobile_no: "9999999999".to_string(),
            status: statuses::ACTIVE.to_string(),
            i_card: None,
            profile_image: None,
            role: role.to_string(),
            groups: vec![],
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = user_with_role(roles::ADMIN);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "test");
    }

    #[test]
    fn role_helpers() {
        assert!(user_with_role(roles::SUPER_ADMIN).is_super_admin());
        assert!(user_with_role(roles::ADMIN).is_admin_or_above());
        assert!(!user_with_role(roles::SUB_SEIZER).is_admin_or_above());
    }
}
