use axum::response::Json;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::{LoginRequest, SignupRequest};
use crate::services::UserService;

/// POST /login - Authenticate and receive a JWT
///
/// Unknown email and wrong password answer the same 401.
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let service = UserService::new().await?;
    let session = service.login(payload).await?;

    Ok(ApiResponse::success(json!({
        "token": session.token,
        "expires_in": session.expires_in,
        "user": session.user,
    })))
}

/// POST /signup - Self-register a new user account
///
/// Role and tenant fields in the payload are ignored; self-registered
/// accounts always come up as plain USERs with no tenant.
pub async fn signup(Json(payload): Json<SignupRequest>) -> ApiResult<Value> {
    let service = UserService::new().await?;
    let user_id = service.signup(payload.for_self_signup()).await?;

    Ok(ApiResponse::created(json!({
        "message": "User registered successfully",
        "user_id": user_id,
    })))
}
