use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    #[default]
    Staff,
}

/// Staff account allowed to sign in to the console
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub entity_id: Option<Uuid>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Serialize, Deserialize, TS)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub entity_id: Option<Uuid>,
}

impl std::fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("role", &self.role)
            .field("entity_id", &self.entity_id)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, TS)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_value(UserRole::SuperAdmin).unwrap(),
            serde_json::json!("super_admin")
        );
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
    }

    #[test]
    fn test_create_user_debug_hides_password() {
        let request = CreateUser {
            name: "Grace".into(),
            email: "grace@example.org".into(),
            password: "hunter2".into(),
            role: UserRole::Staff,
            entity_id: None,
        };
        let rendered = format!("{:?}", request);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("grace@example.org"));
    }

    #[test]
    fn test_deactivate_request_only_sends_flag() {
        let update = UpdateUser {
            active: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"active": false})
        );
    }
}
