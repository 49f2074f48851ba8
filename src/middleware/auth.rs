//! Bearer authentication for customers and route-declared permission
//! gating for administrators.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppError,
    state::AppState,
    store::ErrorKind,
    token::{Claims, TokenKind},
};

/// Account status that may sign in.
pub const STATUS_ACTIVE: i16 = 1;

/// Coarse permission families. The discriminant is the permission id seeded
/// by the initial migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i64)]
pub enum PermissionCategory {
    UsersRoles = 1,
    Products = 2,
    Orders = 3,
    Coupons = 4,
    News = 5,
}

impl PermissionCategory {
    pub const ALL: [PermissionCategory; 5] = [
        PermissionCategory::UsersRoles,
        PermissionCategory::Products,
        PermissionCategory::Orders,
        PermissionCategory::Coupons,
        PermissionCategory::News,
    ];

    pub fn id(self) -> i64 {
        self as i64
    }

    pub fn is_granted(self, permission_ids: &[i64]) -> bool {
        permission_ids.contains(&self.id())
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_str = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("authorization header is not provided".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("invalid authorization header format".into()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("unsupported authorization type".into()))?;
    Ok(token)
}

fn verified_claims(state: &AppState, headers: &HeaderMap, kind: TokenKind) -> Result<Claims, AppError> {
    let claims = state.token_maker.verify_token(bearer_token(headers)?)?;
    if claims.kind != kind {
        return Err(AppError::Unauthorized("token is invalid".into()));
    }
    Ok(claims)
}

/// A customer authenticated by an access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = verified_claims(state, &parts.headers, TokenKind::User)?;
        Ok(AuthUser {
            account: claims.sub,
        })
    }
}

/// An administrator that passed [`require_permission`].
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub admin_user_id: i64,
    pub account: String,
    pub permission_ids: Vec<i64>,
}

impl<S: Send + Sync> FromRequestParts<S> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthAdmin>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("admin authentication required".into()))
    }
}

/// State of the permission middleware: the app plus the category a route
/// group declared at registration.
#[derive(Clone)]
pub struct PermissionGate {
    pub state: AppState,
    pub category: PermissionCategory,
}

pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = verified_claims(&gate.state, req.headers(), TokenKind::Admin)?;

    let q = gate.state.store.queries();
    let admin_user = q
        .get_admin_user_by_account(&claims.sub)
        .await
        .map_err(|err| match err.kind() {
            ErrorKind::NotFound => AppError::Unauthorized("admin user no longer exists".into()),
            _ => AppError::from(err),
        })?;
    if admin_user.status != STATUS_ACTIVE {
        return Err(AppError::Unauthorized("admin user is disabled".into()));
    }

    let permission_ids: Vec<i64> = q
        .list_permissions_for_admin_user(admin_user.id)
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(|permission| permission.id)
        .collect();

    if !gate.category.is_granted(&permission_ids) {
        tracing::debug!(
            account = %admin_user.account,
            category = ?gate.category,
            "permission denied"
        );
        return Err(AppError::Forbidden("permission denied".into()));
    }

    req.extensions_mut().insert(AuthAdmin {
        admin_user_id: admin_user.id,
        account: admin_user.account,
        permission_ids,
    });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn categories_match_seeded_permission_ids() {
        let ids: Vec<i64> = PermissionCategory::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn category_requires_its_own_permission() {
        assert!(PermissionCategory::Orders.is_granted(&[1, 3]));
        assert!(!PermissionCategory::Coupons.is_granted(&[1, 3]));
        assert!(!PermissionCategory::Products.is_granted(&[]));
    }

    #[test]
    fn bearer_scheme_is_required() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Err(AppError::Unauthorized(_))));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(bearer_token(&headers), Err(AppError::Unauthorized(_))));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }
}
