use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Fixed role constants gating route access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    SuperAdmin,
    Admin,
    HrUser,
    User,
}

impl UserType {
    pub const fn as_i16(self) -> i16 {
        match self {
            UserType::SuperAdmin => 1,
            UserType::Admin => 2,
            UserType::HrUser => 3,
            UserType::User => 4,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            1 => Some(UserType::SuperAdmin),
            2 => Some(UserType::Admin),
            3 => Some(UserType::HrUser),
            4 => Some(UserType::User),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub tenant_id: i64,
    pub user_type_id: i16,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, tenant_id: i64, user_type_id: i16, expiry_minutes: i64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::minutes(expiry_minutes)).timestamp();

        Self {
            user_id,
            tenant_id,
            user_type_id,
            exp,
            iat: now.timestamp(),
        }
    }

    /// Remaining validity in seconds, for the login response body.
    pub fn expires_in(&self) -> i64 {
        self.exp - self.iat
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    TokenValidation(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::TokenValidation(e.to_string()))
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn user_type_round_trips_constants() {
        assert_eq!(UserType::SuperAdmin.as_i16(), 1);
        assert_eq!(UserType::Admin.as_i16(), 2);
        assert_eq!(UserType::HrUser.as_i16(), 3);
        assert_eq!(UserType::User.as_i16(), 4);
        assert_eq!(UserType::from_i16(2), Some(UserType::Admin));
        assert_eq!(UserType::from_i16(9), None);
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let claims = Claims::new(42, 7, UserType::HrUser.as_i16(), 30);
        let token = generate_jwt(&claims, SECRET).unwrap();
        let decoded = verify_jwt(&token, SECRET).unwrap();

        assert_eq!(decoded.user_id, 42);
        assert_eq!(decoded.tenant_id, 7);
        assert_eq!(decoded.user_type_id, 3);
        assert_eq!(decoded.expires_in(), 30 * 60);
    }

    #[test]
    fn tampered_secret_is_rejected() {
        let claims = Claims::new(1, 1, UserType::User.as_i16(), 30);
        let token = generate_jwt(&claims, SECRET).unwrap();
        assert!(verify_jwt(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Expired an hour ago, well past the default leeway
        let claims = Claims {
            user_id: 1,
            tenant_id: 1,
            user_type_id: 4,
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
            iat: (Utc::now() - Duration::hours(2)).timestamp(),
        };
        let token = generate_jwt(&claims, SECRET).unwrap();
        assert!(verify_jwt(&token, SECRET).is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let claims = Claims::new(1, 1, 4, 30);
        assert!(matches!(generate_jwt(&claims, ""), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn password_hash_verifies_and_never_matches_plaintext() {
        // Low cost keeps the test fast
        let hash = hash_password("s3cret!", 4).unwrap();
        assert_ne!(hash, "s3cret!");
        assert!(verify_password("s3cret!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }
}
