//! Service configuration loaded from environment variables (after `.env`).
//!
//! - `HOST` (default `0.0.0.0`), `PORT` (default `3002`)
//! - `STORE` - `mongo` (default) or `memory`
//! - `DATABASE_URL` - MongoDB URI, required when `STORE=mongo`
//! - `JWT_SECRET`, `JWT_ISSUER`, `JWT_AUDIENCE` - identity token verification;
//!   the secret is required when `STORE=mongo`
//! - `PUBLIC_BASE_URL` - front end origin used in QR code URLs
//! - `CORS_ORIGINS` - comma separated allowed origins

use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "default-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub public_base_url: String,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, which keeps tests off the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidEnvVar("PORT", e.to_string()))?,
            None => 3002,
        };

        let store = match lookup("STORE").as_deref() {
            None | Some("mongo") => StoreKind::Mongo,
            Some("memory") => StoreKind::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "STORE",
                    format!("expected mongo or memory, got {}", other),
                ))
            }
        };

        let database_url = lookup("DATABASE_URL");
        if store == StoreKind::Mongo && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL"));
        }

        let secret = match (lookup("JWT_SECRET"), store) {
            (Some(secret), _) => secret,
            (None, StoreKind::Mongo) => return Err(ConfigError::MissingEnvVar("JWT_SECRET")),
            (None, StoreKind::Memory) => {
                log::warn!("⚠️  JWT_SECRET not set, using the development default");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "motto-identity".to_string()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "motto-service".to_string()),
        };

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec![public_base_url.clone()]);

        Ok(AppConfig {
            host,
            port,
            store,
            database_url,
            jwt,
            public_base_url,
            cors_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_memory_store_needs_no_database_url() {
        let config = load(&[("STORE", "memory")]).unwrap();
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.port, 3002);
        assert_eq!(config.public_base_url, "http://localhost:3000");
        assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn test_mongo_store_requires_database_url() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::MissingEnvVar("DATABASE_URL"))
        ));
    }

    #[test]
    fn test_parses_overrides() {
        let config = load(&[
            ("DATABASE_URL", "mongodb://localhost:27017/mottos"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "8080"),
            ("PUBLIC_BASE_URL", "https://ikikae.example/"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.public_base_url, "https://ikikae.example");
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.jwt.secret, "s3cret");
    }

    #[test]
    fn test_mongo_store_requires_jwt_secret() {
        assert!(matches!(
            load(&[("DATABASE_URL", "mongodb://localhost:27017/mottos")]),
            Err(ConfigError::MissingEnvVar("JWT_SECRET"))
        ));

        let dev = load(&[("STORE", "memory")]).unwrap();
        assert_eq!(dev.jwt.secret, DEFAULT_JWT_SECRET);
    }

    #[test]
    fn test_rejects_bad_port_and_store() {
        assert!(matches!(
            load(&[("STORE", "memory"), ("PORT", "eighty")]),
            Err(ConfigError::InvalidEnvVar("PORT", _))
        ));
        assert!(matches!(
            load(&[("STORE", "redis")]),
            Err(ConfigError::InvalidEnvVar("STORE", _))
        ));
    }
}
