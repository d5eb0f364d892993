//! Server configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use ambulatorio_core::auth::{DEFAULT_TOKEN_TTL_HOURS, MAX_TOKEN_TTL_HOURS};
use ambulatorio_core::TokenKeys;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_DB_PATH: &str = "ambulatorio.db";
const DEV_JWT_SECRET: &str = "ambulatorio-infermieristico-secret-key-2024";

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    /// Allowed origins; `*` allows any
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let jwt_expiration_hours = parse_or(&lookup, "JWT_EXPIRATION_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&jwt_expiration_hours) {
            anyhow::bail!(
                "JWT_EXPIRATION_HOURS must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_HOURS,
                jwt_expiration_hours
            );
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            host: lookup("AMBULATORIO_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "AMBULATORIO_PORT", DEFAULT_PORT)?,
            db_path: lookup("AMBULATORIO_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            jwt_secret,
            jwt_expiration_hours,
            cors_origins,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_keys(&self) -> TokenKeys {
        TokenKeys::new(self.jwt_secret.as_bytes(), self.jwt_expiration_hours)
    }

    pub fn cors_layer(&self) -> Result<CorsLayer> {
        let layer = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any);

        if self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*") {
            return Ok(layer.allow_origin(Any));
        }

        let origins = self
            .cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .with_context(|| format!("Invalid CORS origin: {}", origin))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(layer.allow_origin(origins))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {}", key, raw)),
        None => Ok(default),
    }
}
