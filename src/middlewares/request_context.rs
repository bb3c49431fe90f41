use actix_web::web;
use serde::Deserialize;

use crate::models::users::entities::{User, UserRole};

/// Authenticated caller, resolved once by [`RequireJWT`](super::RequireJWT).
///
/// A superuser may preview the site as another role through the `view_as`
/// query parameter. Role gates read [`effective_role`](Self::effective_role);
/// course scoping keeps using the real identity.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: User,
    pub preview_role: Option<UserRole>,
}

impl RequestContext {
    /// `view_as` is ignored for everyone but superusers, and previewing the
    /// role one already has is a no-op.
    pub fn new(user: User, view_as: Option<&str>) -> Self {
        let preview_role = if user.is_superuser() {
            view_as
                .and_then(UserRole::parse_loose)
                .filter(|role| *role != user.role)
        } else {
            None
        };
        Self { user, preview_role }
    }

    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn effective_role(&self) -> UserRole {
        self.preview_role.unwrap_or(self.user.role)
    }

    pub fn is_previewing(&self) -> bool {
        self.preview_role.is_some()
    }

    pub fn is_superuser(&self) -> bool {
        self.user.is_superuser()
    }

    /// Superusers and staff accounts, regardless of preview.
    pub fn is_privileged(&self) -> bool {
        self.user.is_privileged()
    }

    /// Whether the caller should see internal failure details such as
    /// `notif_error`.
    pub fn sees_diagnostics(&self) -> bool {
        self.is_privileged()
    }
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    view_as: Option<String>,
}

/// Reads `view_as` from a raw query string.
pub(crate) fn view_as_from_query(query: &str) -> Option<String> {
    web::Query::<PreviewQuery>::from_query(query)
        .ok()
        .and_then(|q| q.into_inner().view_as)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserStatus;

    fn user(role: UserRole, is_staff: bool) -> User {
        User {
            id: 1,
            username: "u".to_string(),
            email: None,
            display_name: None,
            role,
            is_staff,
            status: UserStatus::Active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_superuser_can_preview() {
        let ctx = RequestContext::new(user(UserRole::Admin, false), Some("Padres"));
        assert_eq!(ctx.effective_role(), UserRole::Parent);
        assert!(ctx.is_previewing());
        assert!(ctx.is_superuser());
    }

    #[test]
    fn test_preview_ignored_for_other_roles() {
        let ctx = RequestContext::new(user(UserRole::Teacher, true), Some("admin"));
        assert_eq!(ctx.effective_role(), UserRole::Teacher);
        assert!(!ctx.is_previewing());
        assert!(ctx.is_privileged());
    }

    #[test]
    fn test_unknown_preview_role_is_ignored() {
        let ctx = RequestContext::new(user(UserRole::Admin, false), Some("visitante"));
        assert_eq!(ctx.effective_role(), UserRole::Admin);
    }

    #[test]
    fn test_view_as_from_query() {
        assert_eq!(
            view_as_from_query("limit=5&view_as=preceptor"),
            Some("preceptor".to_string())
        );
        assert_eq!(view_as_from_query("view_as="), None);
        assert_eq!(view_as_from_query(""), None);
    }
}
