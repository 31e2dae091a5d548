use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the Solr instance, without trailing slash.
    pub base_url: String,
    /// Core names are derived as `core_prefix` + tenant id.
    pub core_prefix: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_minutes: i64,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment-specific defaults, then explicit env overrides
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        if let Ok(v) = env::var("SOLR_BASE_URL") {
            self.search.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("SOLR_CORE_PREFIX") {
            self.search.core_prefix = v;
        }
        if let Ok(v) = env::var("SOLR_REQUEST_TIMEOUT_SECS") {
            self.search.request_timeout_secs = v.parse().unwrap_or(self.search.request_timeout_secs);
        }

        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_MINUTES") {
            self.security.jwt_expiry_minutes = v.parse().unwrap_or(self.security.jwt_expiry_minutes);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            search: SearchConfig {
                base_url: "http://localhost:8983/solr".to_string(),
                core_prefix: "hrprofile_".to_string(),
                request_timeout_secs: 30,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_minutes: 30,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            search: SearchConfig {
                base_url: "http://localhost:8983/solr".to_string(),
                core_prefix: "hrprofile_".to_string(),
                request_timeout_secs: 10,
            },
            ..Self::development()
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.security.jwt_expiry_minutes, 30);
        assert_eq!(config.search.core_prefix, "hrprofile_");
    }

    #[test]
    fn production_tightens_pool() {
        let config = AppConfig::production();
        assert_eq!(config.database.max_connections, 50);
        assert_eq!(config.search.request_timeout_secs, 10);
    }
}
