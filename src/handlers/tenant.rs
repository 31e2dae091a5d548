use axum::{
    extract::{Extension, Path},
    response::Json,
};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::tenant_service::{TenantCreateRequest, TenantUpdateRequest};
use crate::services::TenantService;

/// GET /api/tenant - List all tenants (SUPER_ADMIN surface, global)
pub async fn tenant_list() -> ApiResult<Value> {
    let service = TenantService::new().await?;
    let tenants = service.list().await?;
    Ok(ApiResponse::success(json!(tenants)))
}

/// POST /api/tenant - Provision a tenant with its admin user and search core
pub async fn tenant_add(
    Extension(auth): Extension<AuthUser>,
    Json(mut payload): Json<TenantCreateRequest>,
) -> ApiResult<Value> {
    if payload.created_by_id.is_none() {
        payload.created_by_id = Some(auth.user_id);
    }

    let service = TenantService::new().await?;
    let tenant_id = service.provision(payload).await?;

    Ok(ApiResponse::created(json!({
        "message": "Tenant added successfully",
        "tenant_id": tenant_id,
    })))
}

/// GET /api/tenant/:id
pub async fn tenant_view(Path(tenant_id): Path<i64>) -> ApiResult<Value> {
    let service = TenantService::new().await?;
    let tenant = service.view(tenant_id).await?;
    Ok(ApiResponse::success(json!(tenant)))
}

/// PUT /api/tenant/:id - Partial update of supplied fields
pub async fn tenant_update(
    Path(tenant_id): Path<i64>,
    Json(payload): Json<TenantUpdateRequest>,
) -> ApiResult<Value> {
    let service = TenantService::new().await?;
    service.update(tenant_id, payload).await?;
    Ok(ApiResponse::success(json!({
        "message": "Tenant updated successfully"
    })))
}

/// DELETE /api/tenant/:id
pub async fn tenant_delete(Path(tenant_id): Path<i64>) -> ApiResult<Value> {
    let service = TenantService::new().await?;
    service.delete(tenant_id).await?;
    Ok(ApiResponse::success(json!({
        "message": "Tenant deleted successfully"
    })))
}
