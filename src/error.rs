// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

/// Map a raw sqlx error onto the API taxonomy without leaking SQL details.
/// Unique-constraint violations (class 23505) surface as 409 Conflict so
/// duplicate-email races lost at the index still answer correctly.
pub(crate) fn sqlx_to_api(err: sqlx::Error) -> ApiError {
    match &err {
        sqlx::Error::RowNotFound => ApiError::not_found("Record not found"),
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            ApiError::conflict("Record with the same unique key already exists")
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            tracing::error!("Database unavailable: {}", err);
            ApiError::service_unavailable("Database temporarily unavailable")
        }
        _ => {
            tracing::error!("Database error: {}", err);
            ApiError::internal_server_error("An error occurred while processing your request")
        }
    }
}

// Convert other error types to ApiError
impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        match err {
            crate::database::manager::DatabaseError::ConfigMissing(name) => {
                tracing::error!("Missing configuration: {}", name);
                ApiError::service_unavailable("Service is not configured")
            }
            crate::database::manager::DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Invalid DATABASE_URL");
                ApiError::service_unavailable("Service is not configured")
            }
            crate::database::manager::DatabaseError::Sqlx(e) => sqlx_to_api(e),
        }
    }
}

impl From<crate::search::SearchError> for ApiError {
    fn from(err: crate::search::SearchError) -> Self {
        match err {
            crate::search::SearchError::Http(e) => {
                tracing::error!("Search engine request failed: {}", e);
                ApiError::internal_server_error("Search engine request failed")
            }
            crate::search::SearchError::Status { status, body } => {
                tracing::error!("Search engine returned {}: {}", status, body);
                ApiError::internal_server_error("Search engine request failed")
            }
            crate::search::SearchError::Codec(e) => {
                tracing::error!("Profile document codec error: {}", e);
                ApiError::internal_server_error("Failed to process profile document")
            }
        }
    }
}

impl From<crate::services::tenant_service::TenantError> for ApiError {
    fn from(err: crate::services::tenant_service::TenantError) -> Self {
        use crate::services::tenant_service::TenantError;
        match err {
            TenantError::MissingField(field) => {
                ApiError::bad_request(format!("Missing required field: {}", field))
            }
            TenantError::DuplicateEmail(email) => {
                ApiError::conflict(format!("User with email '{}' already exists", email))
            }
            TenantError::NotFound(id) => ApiError::not_found(format!("Tenant {} not found", id)),
            TenantError::CoreProvisioning(msg) => {
                tracing::error!("Search core provisioning failed: {}", msg);
                ApiError::internal_server_error("Tenant created but search core provisioning failed")
            }
            TenantError::Database(e) => sqlx_to_api(e),
            TenantError::DatabaseManager(e) => e.into(),
            TenantError::Hash(e) => {
                tracing::error!("Password hashing failed: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::services::user_service::UserError> for ApiError {
    fn from(err: crate::services::user_service::UserError) -> Self {
        use crate::services::user_service::UserError;
        match err {
            UserError::MissingField(field) => {
                ApiError::bad_request(format!("Missing required field: {}", field))
            }
            UserError::DuplicateEmail(email) => {
                ApiError::conflict(format!("User with email '{}' already exists", email))
            }
            UserError::NotFound(id) => ApiError::not_found(format!("User {} not found", id)),
            // One message for bad email and bad password: no credential oracle
            UserError::InvalidCredentials => ApiError::unauthorized("Invalid email or password"),
            UserError::Database(e) => sqlx_to_api(e),
            UserError::DatabaseManager(e) => e.into(),
            UserError::Hash(e) => {
                tracing::error!("Password hashing failed: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            UserError::Token(e) => {
                tracing::error!("Token generation failed: {}", e);
                ApiError::internal_server_error("Failed to issue token")
            }
        }
    }
}

impl From<crate::services::profile_service::ProfileError> for ApiError {
    fn from(err: crate::services::profile_service::ProfileError) -> Self {
        use crate::services::profile_service::ProfileError;
        match err {
            ProfileError::MissingField(field) => {
                ApiError::bad_request(format!("Missing required field: {}", field))
            }
            ProfileError::NotFound(id) => {
                ApiError::not_found(format!("HR profile {} not found", id))
            }
            ProfileError::Search(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(ApiError::bad_request("x").status_code(), 400);
        assert_eq!(ApiError::unauthorized("x").status_code(), 401);
        assert_eq!(ApiError::forbidden("x").status_code(), 403);
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::conflict("x").status_code(), 409);
        assert_eq!(ApiError::internal_server_error("x").status_code(), 500);
        assert_eq!(ApiError::service_unavailable("x").status_code(), 503);
    }

    #[test]
    fn json_body_carries_code_and_message() {
        let body = ApiError::conflict("duplicate email").to_json();
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(body["message"], "duplicate email");
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let api = sqlx_to_api(sqlx::Error::RowNotFound);
        assert_eq!(api.status_code(), 404);
    }
}
