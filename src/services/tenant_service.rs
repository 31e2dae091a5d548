use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::{hash_password, UserType};
use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Tenant;
use crate::search::SearchClient;
use crate::services::non_empty;

#[derive(Debug, Clone, Deserialize)]
pub struct AdminUserRequest {
    pub user_name: Option<String>,
    pub email_id: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenantCreateRequest {
    pub name: Option<String>,
    pub tenant_type_id: Option<i16>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created_by_id: Option<i64>,
    pub admin_user: Option<AdminUserRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantUpdateRequest {
    pub name: Option<String>,
    pub tenant_type_id: Option<i16>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),
    #[error("Tenant {0} not found")]
    NotFound(i64),
    #[error("Search core provisioning failed: {0}")]
    CoreProvisioning(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

pub struct TenantService {
    pool: PgPool,
}

impl TenantService {
    pub async fn new() -> Result<Self, TenantError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Provision a new tenant: tenant row plus its admin user in a single
    /// transaction, then a dedicated search core named from the tenant id.
    ///
    /// Any failure before commit rolls the whole relational unit back; no
    /// partial tenant or user persists. Core creation happens after commit
    /// and cannot be rolled back relationally: on failure the tenant row is
    /// flagged inactive so the incomplete provisioning is visible, and the
    /// caller receives an error.
    pub async fn provision(&self, input: TenantCreateRequest) -> Result<i64, TenantError> {
        let name = non_empty(&input.name).ok_or(TenantError::MissingField("name"))?;
        let admin = input
            .admin_user
            .as_ref()
            .ok_or(TenantError::MissingField("admin_user"))?;
        let user_name =
            non_empty(&admin.user_name).ok_or(TenantError::MissingField("user_name"))?;
        let email = non_empty(&admin.email_id).ok_or(TenantError::MissingField("email_id"))?;
        let password =
            non_empty(&admin.password).ok_or(TenantError::MissingField("password"))?;

        let mut tx = self.pool.begin().await?;

        let (tenant_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO tenant (name, tenant_type_id, description, location, active, created_by_id)
            VALUES ($1, $2, $3, $4, true, $5)
            RETURNING tenant_id
            "#,
        )
        .bind(name)
        .bind(input.tenant_type_id)
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.created_by_id)
        .fetch_one(&mut *tx)
        .await?;

        // In-transaction duplicate check; the unique index on email_id is the
        // arbiter for concurrent signups racing past this point.
        let existing: Option<(i64,)> =
            sqlx::query_as(r#"SELECT user_id FROM "user" WHERE email_id = $1"#)
                .bind(email)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            // Dropping the transaction rolls the tenant row back
            return Err(TenantError::DuplicateEmail(email.to_string()));
        }

        let hash = hash_password(password, config::config().security.bcrypt_cost)?;

        sqlx::query(
            r#"
            INSERT INTO "user"
                (tenant_id, user_type_id, user_name, password, email_id,
                 user_status_id, active, created_by_id)
            VALUES ($1, $2, $3, $4, $5, 1, true, $6)
            "#,
        )
        .bind(tenant_id)
        .bind(UserType::Admin.as_i16())
        .bind(user_name)
        .bind(&hash)
        .bind(email)
        .bind(input.created_by_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let search = SearchClient::global();
        let core = search.core_name(tenant_id);
        if let Err(e) = search.create_core(&core).await {
            // Committed rows stay; mark the tenant so the gap is observable
            let _ = sqlx::query(
                "UPDATE tenant SET active = false, last_updated_dt = now() WHERE tenant_id = $1",
            )
            .bind(tenant_id)
            .execute(&self.pool)
            .await;
            return Err(TenantError::CoreProvisioning(e.to_string()));
        }

        Ok(tenant_id)
    }

    pub async fn list(&self) -> Result<Vec<Tenant>, TenantError> {
        let tenants = sqlx::query_as::<_, Tenant>(
            "SELECT * FROM tenant ORDER BY created_dt DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tenants)
    }

    pub async fn view(&self, tenant_id: i64) -> Result<Tenant, TenantError> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenant WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(TenantError::NotFound(tenant_id))
    }

    /// Partial update: only supplied fields change
    pub async fn update(
        &self,
        tenant_id: i64,
        input: TenantUpdateRequest,
    ) -> Result<(), TenantError> {
        let result = sqlx::query(
            r#"
            UPDATE tenant SET
                name = COALESCE($2, name),
                tenant_type_id = COALESCE($3, tenant_type_id),
                description = COALESCE($4, description),
                location = COALESCE($5, location),
                active = COALESCE($6, active),
                last_updated_dt = now()
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .bind(&input.name)
        .bind(input.tenant_type_id)
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TenantError::NotFound(tenant_id));
        }
        Ok(())
    }

    /// Delete the tenant row, then drop its search core best-effort
    pub async fn delete(&self, tenant_id: i64) -> Result<(), TenantError> {
        let result = sqlx::query("DELETE FROM tenant WHERE tenant_id = $1")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TenantError::NotFound(tenant_id));
        }

        let search = SearchClient::global();
        let core = search.core_name(tenant_id);
        if let Err(e) = search.unload_core(&core).await {
            tracing::warn!("Failed to unload search core {}: {}", core, e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> TenantCreateRequest {
        TenantCreateRequest {
            name: Some("acme".to_string()),
            tenant_type_id: Some(1),
            description: None,
            location: None,
            created_by_id: None,
            admin_user: Some(AdminUserRequest {
                user_name: Some("admin".to_string()),
                email_id: Some("admin@acme.example".to_string()),
                password: Some("secret".to_string()),
            }),
        }
    }

    fn validate(input: &TenantCreateRequest) -> Result<(), TenantError> {
        non_empty(&input.name).ok_or(TenantError::MissingField("name"))?;
        let admin = input
            .admin_user
            .as_ref()
            .ok_or(TenantError::MissingField("admin_user"))?;
        non_empty(&admin.user_name).ok_or(TenantError::MissingField("user_name"))?;
        non_empty(&admin.email_id).ok_or(TenantError::MissingField("email_id"))?;
        non_empty(&admin.password).ok_or(TenantError::MissingField("password"))?;
        Ok(())
    }

    #[test]
    fn provision_requires_tenant_name() {
        let mut input = valid_request();
        input.name = None;
        assert!(matches!(
            validate(&input),
            Err(TenantError::MissingField("name"))
        ));
    }

    #[test]
    fn provision_requires_embedded_admin() {
        let mut input = valid_request();
        input.admin_user = None;
        assert!(matches!(
            validate(&input),
            Err(TenantError::MissingField("admin_user"))
        ));
    }

    #[test]
    fn provision_requires_admin_credentials() {
        let mut input = valid_request();
        input.admin_user.as_mut().unwrap().password = Some("  ".to_string());
        assert!(matches!(
            validate(&input),
            Err(TenantError::MissingField("password"))
        ));
    }

    #[test]
    fn valid_input_passes_validation() {
        assert!(validate(&valid_request()).is_ok());
    }
}
