/*!
 * Role gate. Must be wrapped inside [`RequireJWT`](super::RequireJWT).
 *
 * ```rust,ignore
 * web::resource("/register")
 *     .route(web::post().to(register))
 *     .wrap(RequireRole::new_any(UserRole::staff_roles()))
 * ```
 *
 * The check uses the effective role, so a superuser previewing as a parent
 * is gated like a parent. `or_staff()` also admits back-office accounts
 * (`is_staff`) that are not previewing.
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{ErrorCode, users::entities::UserRole};

use super::{RequestContext, create_error_response};

#[derive(Clone)]
pub struct RequireRole {
    required_roles: Vec<UserRole>,
    allow_staff: bool,
}

impl RequireRole {
    pub fn new(role: &UserRole) -> Self {
        Self {
            required_roles: vec![*role],
            allow_staff: false,
        }
    }

    pub fn new_any(roles: &[&UserRole]) -> Self {
        Self {
            required_roles: roles.iter().map(|r| **r).collect(),
            allow_staff: false,
        }
    }

    pub fn or_staff(mut self) -> Self {
        self.allow_staff = true;
        self
    }

    fn admits(required_roles: &[UserRole], allow_staff: bool, ctx: &RequestContext) -> bool {
        required_roles.contains(&ctx.effective_role())
            || (allow_staff && ctx.user.is_staff && !ctx.is_previewing())
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_roles: self.required_roles.clone(),
            allow_staff: self.allow_staff,
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_roles: Vec<UserRole>,
    allow_staff: bool,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let required_roles = self.required_roles.clone();
        let allow_staff = self.allow_staff;

        Box::pin(async move {
            let context = req.extensions().get::<RequestContext>().cloned();

            match context {
                Some(ctx) if RequireRole::admits(&required_roles, allow_staff, &ctx) => {
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Some(ctx) => {
                    info!(
                        "Access denied for user {} (effective role: {}). Required roles: {:?}",
                        ctx.user_id(),
                        ctx.effective_role(),
                        required_roles
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::Forbidden,
                            "No tenés permisos para esta acción.",
                        )
                        .map_into_right_body(),
                    ))
                }
                None => {
                    info!(
                        "Role check failed: no request context. Make sure RequireJWT wraps this route."
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Authentication required",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{User, UserStatus};

    fn ctx(role: UserRole, is_staff: bool, view_as: Option<&str>) -> RequestContext {
        RequestContext::new(
            User {
                id: 9,
                username: "x".to_string(),
                email: None,
                display_name: None,
                role,
                is_staff,
                status: UserStatus::Active,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            },
            view_as,
        )
    }

    #[test]
    fn test_effective_role_is_gated() {
        let roles = vec![UserRole::Preceptor, UserRole::Admin];
        assert!(RequireRole::admits(&roles, false, &ctx(UserRole::Admin, false, None)));
        assert!(!RequireRole::admits(&roles, false, &ctx(UserRole::Admin, false, Some("parent"))));
        assert!(!RequireRole::admits(&roles, false, &ctx(UserRole::Teacher, false, None)));
    }

    #[test]
    fn test_staff_flag_admitted_only_when_requested() {
        let roles = vec![UserRole::Preceptor, UserRole::Admin];
        let staff_teacher = ctx(UserRole::Teacher, true, None);
        assert!(!RequireRole::admits(&roles, false, &staff_teacher));
        assert!(RequireRole::admits(&roles, true, &staff_teacher));
    }
}
