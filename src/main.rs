use axum::{
    extract::Request,
    middleware::{from_fn, Next},
    routing::get,
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use talent_api::auth::UserType;
use talent_api::error::ApiError;
use talent_api::handlers::{auth, profile, tenant, user};
use talent_api::middleware::{jwt_auth_middleware, require_role};

const SUPER_ADMIN_ONLY: &[UserType] = &[UserType::SuperAdmin];
const ADMIN_ROLES: &[UserType] = &[UserType::SuperAdmin, UserType::Admin];
const HR_ROLES: &[UserType] = &[UserType::Admin, UserType::HrUser];

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = talent_api::config::config();
    tracing::info!("Starting Talent API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("TALENT_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Talent API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        // Protected, role-gated
        .merge(user_routes())
        .merge(tenant_routes())
        .merge(profile_routes())
        // Any unmatched path becomes a JSON 404
        .fallback(not_found)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn user_routes() -> Router {
    Router::new()
        .route("/api/user", get(user::user_list).post(user::user_add))
        .route(
            "/api/user/:id",
            get(user::user_view)
                .put(user::user_update)
                .delete(user::user_delete),
        )
        .route_layer(from_fn(|req: Request, next: Next| {
            require_role(ADMIN_ROLES, req, next)
        }))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn tenant_routes() -> Router {
    Router::new()
        .route(
            "/api/tenant",
            get(tenant::tenant_list).post(tenant::tenant_add),
        )
        .route(
            "/api/tenant/:id",
            get(tenant::tenant_view)
                .put(tenant::tenant_update)
                .delete(tenant::tenant_delete),
        )
        .route_layer(from_fn(|req: Request, next: Next| {
            require_role(SUPER_ADMIN_ONLY, req, next)
        }))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn profile_routes() -> Router {
    Router::new()
        .route(
            "/api/hrprofile",
            get(profile::profile_list).post(profile::profile_add),
        )
        .route(
            "/api/hrprofile/:id",
            get(profile::profile_view)
                .put(profile::profile_update)
                .delete(profile::profile_delete),
        )
        .route_layer(from_fn(|req: Request, next: Next| {
            require_role(HR_ROLES, req, next)
        }))
        .route_layer(from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Talent API",
            "version": version,
            "description": "Multi-tenant talent management REST API",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/login, /signup (public)",
                "user": "/api/user[/:id] (protected - SUPER_ADMIN, ADMIN)",
                "tenant": "/api/tenant[/:id] (protected - SUPER_ADMIN)",
                "hrprofile": "/api/hrprofile[/:id] (protected - ADMIN, HR_USER)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match talent_api::database::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}
