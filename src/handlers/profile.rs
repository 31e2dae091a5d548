use std::collections::HashMap;

use axum::{
    extract::{Extension, Path, Query},
    response::Json,
};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::search::{HrProfile, HrProfileUpdate};
use crate::services::ProfileService;

/// GET /api/hrprofile - List/search profiles in the caller's tenant core.
/// Free-text field params become search clauses; default is match-all.
pub async fn profile_list(
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let service = ProfileService::new();
    let profiles = service.list(auth.tenant_id, &params).await?;
    Ok(ApiResponse::success(json!(profiles)))
}

/// POST /api/hrprofile - Add a profile document
pub async fn profile_add(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<HrProfile>,
) -> ApiResult<Value> {
    let service = ProfileService::new();
    let id = service.add(auth.tenant_id, payload).await?;

    Ok(ApiResponse::created(json!({
        "message": "HR profile added successfully",
        "id": id,
    })))
}

/// GET /api/hrprofile/:id
pub async fn profile_view(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let service = ProfileService::new();
    let profile = service.view(auth.tenant_id, &id).await?;
    Ok(ApiResponse::success(json!(profile)))
}

/// PUT /api/hrprofile/:id - Partial update; untouched fields keep their values
pub async fn profile_update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<HrProfileUpdate>,
) -> ApiResult<Value> {
    let service = ProfileService::new();
    service.update(auth.tenant_id, &id, payload).await?;
    Ok(ApiResponse::success(json!({
        "message": "HR profile updated successfully"
    })))
}

/// DELETE /api/hrprofile/:id
pub async fn profile_delete(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let service = ProfileService::new();
    service.delete(auth.tenant_id, &id).await?;
    Ok(ApiResponse::success(json!({
        "message": "HR profile deleted successfully"
    })))
}
