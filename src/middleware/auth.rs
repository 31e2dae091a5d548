use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{verify_jwt, Claims, UserType};
use crate::config;
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub tenant_id: i64,
    pub user_type_id: i16,
}

impl AuthUser {
    /// Tenant predicate for row-level user operations: SUPER_ADMIN reaches
    /// every tenant, everyone else only their own.
    pub fn tenant_scope(&self) -> Option<i64> {
        if self.user_type_id == UserType::SuperAdmin.as_i16() {
            None
        } else {
            Some(self.tenant_id)
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            tenant_id: claims.tenant_id,
            user_type_id: claims.user_type_id,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context.
///
/// Missing or malformed credentials answer 401; a present but invalid or
/// expired token answers 403. Downstream handlers read the decoded identity
/// from the `AuthUser` request extension.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let claims = verify_jwt(&token, &config::config().security.jwt_secret)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;

    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Second-stage gate: re-verifies the bearer token and permits the request
/// only when its `user_type_id` claim is in `allowed`.
pub async fn require_role(
    allowed: &'static [UserType],
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        extract_bearer_token(request.headers()).map_err(ApiError::unauthorized)?;

    let claims = verify_jwt(&token, &config::config().security.jwt_secret)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;

    if !role_allowed(claims.user_type_id, allowed) {
        return Err(ApiError::forbidden(
            "You do not have permission to access this resource",
        ));
    }

    Ok(next.run(request).await)
}

pub(crate) fn role_allowed(user_type_id: i16, allowed: &[UserType]) -> bool {
    allowed.iter().any(|role| role.as_i16() == user_type_id)
}

/// Extract bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
