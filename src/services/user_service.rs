use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::{generate_jwt, hash_password, verify_password, Claims, JwtError, UserType};
use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::User;
use crate::services::non_empty;

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub tenant_id: Option<i64>,
    pub user_type_id: Option<i16>,
    pub user_name: Option<String>,
    pub email_id: Option<String>,
    pub password: Option<String>,
    pub created_by_id: Option<i64>,
}

impl SignupRequest {
    /// Harden a payload from the public signup route: the caller supplies
    /// credentials only. Role and tenant assignment belong to the role-gated
    /// admin path; anything the caller sent for them is discarded.
    pub fn for_self_signup(mut self) -> Self {
        self.user_type_id = Some(UserType::User.as_i16());
        self.tenant_id = None;
        self.created_by_id = None;
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdateRequest {
    pub user_name: Option<String>,
    pub email_id: Option<String>,
    pub password: Option<String>,
    pub user_type_id: Option<i16>,
    pub user_status_id: Option<i16>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email_id: Option<String>,
    pub password: Option<String>,
}

/// Issued session: token plus the authenticated user row
pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),
    #[error("User {0} not found")]
    NotFound(i64),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Token(#[from] JwtError),
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub async fn new() -> Result<Self, UserError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Create a user. Self-signup defaults the role to USER; admin creation
    /// paths pass an explicit `user_type_id`.
    pub async fn signup(&self, input: SignupRequest) -> Result<i64, UserError> {
        let user_name =
            non_empty(&input.user_name).ok_or(UserError::MissingField("user_name"))?;
        let email = non_empty(&input.email_id).ok_or(UserError::MissingField("email_id"))?;
        let password = non_empty(&input.password).ok_or(UserError::MissingField("password"))?;

        let existing: Option<(i64,)> =
            sqlx::query_as(r#"SELECT user_id FROM "user" WHERE email_id = $1"#)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        if existing.is_some() {
            return Err(UserError::DuplicateEmail(email.to_string()));
        }

        let hash = hash_password(password, config::config().security.bcrypt_cost)?;
        let user_type_id = input.user_type_id.unwrap_or(UserType::User.as_i16());

        let (user_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO "user"
                (tenant_id, user_type_id, user_name, password, email_id,
                 user_status_id, active, created_by_id)
            VALUES ($1, $2, $3, $4, $5, 1, true, $6)
            RETURNING user_id
            "#,
        )
        .bind(input.tenant_id)
        .bind(user_type_id)
        .bind(user_name)
        .bind(&hash)
        .bind(email)
        .bind(input.created_by_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user_id)
    }

    /// Verify credentials and issue a JWT. Unknown email and wrong password
    /// both answer InvalidCredentials; the caller cannot tell which failed.
    pub async fn login(&self, input: LoginRequest) -> Result<Session, UserError> {
        let email = non_empty(&input.email_id).ok_or(UserError::MissingField("email_id"))?;
        let password = non_empty(&input.password).ok_or(UserError::MissingField("password"))?;

        let user = sqlx::query_as::<_, User>(
            r#"SELECT * FROM "user" WHERE email_id = $1 AND active = true"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(password, &user.password)? {
            return Err(UserError::InvalidCredentials);
        }

        sqlx::query(r#"UPDATE "user" SET last_access = now() WHERE user_id = $1"#)
            .bind(user.user_id)
            .execute(&self.pool)
            .await?;

        let security = &config::config().security;
        let claims = Claims::new(
            user.user_id,
            user.tenant_id.unwrap_or(0),
            user.user_type_id,
            security.jwt_expiry_minutes,
        );
        let expires_in = claims.expires_in();
        let token = generate_jwt(&claims, &security.jwt_secret)?;

        Ok(Session {
            token,
            expires_in,
            user,
        })
    }

    /// List the caller's tenant's users
    pub async fn list(&self, tenant_id: i64) -> Result<Vec<User>, UserError> {
        let users = sqlx::query_as::<_, User>(
            r#"SELECT * FROM "user" WHERE tenant_id = $1 ORDER BY created_dt DESC"#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Fetch one user. A `tenant_scope` of `Some` confines the lookup to that
    /// tenant's rows; rows outside it answer as if they do not exist.
    pub async fn view(&self, user_id: i64, tenant_scope: Option<i64>) -> Result<User, UserError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM "user"
            WHERE user_id = $1 AND ($2::bigint IS NULL OR tenant_id = $2)
            "#,
        )
        .bind(user_id)
        .bind(tenant_scope)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(UserError::NotFound(user_id))
    }

    /// Partial update: only supplied fields change. A changed email must not
    /// collide with another user's.
    pub async fn update(
        &self,
        user_id: i64,
        tenant_scope: Option<i64>,
        input: UserUpdateRequest,
    ) -> Result<(), UserError> {
        if let Some(email) = non_empty(&input.email_id) {
            let taken: Option<(i64,)> = sqlx::query_as(
                r#"SELECT user_id FROM "user" WHERE email_id = $1 AND user_id <> $2"#,
            )
            .bind(email)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
            if taken.is_some() {
                return Err(UserError::DuplicateEmail(email.to_string()));
            }
        }

        let password_hash = match non_empty(&input.password) {
            Some(password) => {
                Some(hash_password(password, config::config().security.bcrypt_cost)?)
            }
            None => None,
        };

        let result = sqlx::query(
            r#"
            UPDATE "user" SET
                user_name = COALESCE($2, user_name),
                email_id = COALESCE($3, email_id),
                password = COALESCE($4, password),
                user_type_id = COALESCE($5, user_type_id),
                user_status_id = COALESCE($6, user_status_id),
                active = COALESCE($7, active),
                last_updated_dt = now()
            WHERE user_id = $1 AND ($8::bigint IS NULL OR tenant_id = $8)
            "#,
        )
        .bind(user_id)
        .bind(&input.user_name)
        .bind(&input.email_id)
        .bind(&password_hash)
        .bind(input.user_type_id)
        .bind(input.user_status_id)
        .bind(input.active)
        .bind(tenant_scope)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(user_id));
        }
        Ok(())
    }

    pub async fn delete(&self, user_id: i64, tenant_scope: Option<i64>) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            DELETE FROM "user"
            WHERE user_id = $1 AND ($2::bigint IS NULL OR tenant_id = $2)
            "#,
        )
        .bind(user_id)
        .bind(tenant_scope)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(user_id));
        }
        Ok(())
    }
}
