use super::entities::{UserRole, UserStatus};
use serde::Deserialize;
use ts_rs::TS;

/// Accounts are provisioned by the identity service; this mirrors its
/// payload for seeding and tests.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default = "default_status")]
    pub status: UserStatus,
}

fn default_status() -> UserStatus {
    UserStatus::Active
}

impl CreateUserRequest {
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            email: None,
            display_name: None,
            role,
            is_staff: false,
            status: UserStatus::Active,
        }
    }
}
