use crate::middleware::access::AccessPolicy;
use crate::utils::AppError;
use std::env;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub token_secret: String,
    pub client_origins: Vec<String>,
    pub stripe_secret_key: Option<String>,
    /// Access policy for `/category-stats` and `/popular-tests`.
    pub stats_access: AccessPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let port = var_or("PORT", "5000")
            .parse::<u16>()
            .map_err(|e| AppError::Configuration(format!("Invalid PORT: {}", e)))?;

        let stats_access = var_or("STATS_ACCESS", "public")
            .parse::<AccessPolicy>()
            .map_err(AppError::Configuration)?;

        let client_origins = var_or("CLIENT_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port,
            database_url: required("DATABASE_URL")?,
            database_name: var_or("DATABASE_NAME", "carequestDB"),
            token_secret: required("ACCESS_TOKEN_SECRET")?,
            client_origins,
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").ok().filter(|k| !k.is_empty()),
            stats_access,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        log::debug!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::Configuration(format!("{} must be set", key)))
}
