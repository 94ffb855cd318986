//! Server configuration read from the environment.

use std::net::SocketAddr;

use crate::error::AppError;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable, for local development.
    Pretty,
}

/// Typed server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    /// Public base URL of the object storage serving content assets.
    pub asset_public_url: String,
    pub asset_bucket: String,
    /// When set, CORS only admits this origin; otherwise any origin.
    pub cors_allowed_origin: Option<String>,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from the process environment, reading `.env`
    /// first if one exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or malformed.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| AppError::Config("DATABASE_URL environment variable must be set".into()))?;
        let port = match var("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let database_max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("DATABASE_MAX_CONNECTIONS must be a valid u32: {e}"))
            })?,
            None => 10,
        };
        let log_format = match var("LOG_FORMAT").as_deref() {
            None | Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "LOG_FORMAT must be `json` or `pretty`, got `{other}`"
                )));
            }
        };

        Ok(Self {
            database_url,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            database_max_connections,
            asset_public_url: var("ASSET_PUBLIC_URL")
                .unwrap_or_else(|| "http://localhost:9000".to_owned()),
            asset_bucket: var("ASSET_BUCKET").unwrap_or_else(|| "lathi".to_owned()),
            cors_allowed_origin: var("CORS_ALLOWED_ORIGIN"),
            log_format,
        })
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST` and `PORT` do not form an address.
    pub fn bind_address(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
