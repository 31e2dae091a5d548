use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::{SignupRequest, UserUpdateRequest};
use crate::services::UserService;

/// GET /api/user - List the caller's tenant's users
pub async fn user_list(Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    let service = UserService::new().await?;
    let users = service.list(auth.tenant_id).await?;
    Ok(ApiResponse::success(json!(users)))
}

/// POST /api/user - Admin-create a user within the caller's tenant
pub async fn user_add(
    Extension(auth): Extension<AuthUser>,
    Json(mut payload): Json<SignupRequest>,
) -> ApiResult<Value> {
    if payload.tenant_id.is_none() {
        payload.tenant_id = Some(auth.tenant_id);
    }
    if payload.created_by_id.is_none() {
        payload.created_by_id = Some(auth.user_id);
    }

    let service = UserService::new().await?;
    let user_id = service.signup(payload).await?;

    Ok(ApiResponse::created(json!({
        "message": "User added successfully",
        "user_id": user_id,
    })))
}

/// GET /api/user/:id
///
/// Non-SUPER_ADMIN callers only see users of their own tenant.
pub async fn user_view(
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> ApiResult<Value> {
    let service = UserService::new().await?;
    let user = service.view(user_id, auth.tenant_scope()).await?;
    Ok(ApiResponse::success(json!(user)))
}

/// PUT /api/user/:id - Partial update of supplied fields
pub async fn user_update(
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UserUpdateRequest>,
) -> ApiResult<Value> {
    let service = UserService::new().await?;
    service.update(user_id, auth.tenant_scope(), payload).await?;
    Ok(ApiResponse::success(json!({
        "message": "User updated successfully"
    })))
}

/// DELETE /api/user/:id
pub async fn user_delete(
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> ApiResult<Value> {
    let service = UserService::new().await?;
    service.delete(user_id, auth.tenant_scope()).await?;
    Ok(ApiResponse::success(json!({
        "message": "User deleted successfully"
    })))
}
