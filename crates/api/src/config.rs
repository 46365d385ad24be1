use std::path::PathBuf;
use std::str::FromStr;

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding one folder per video (default: `assets`).
    pub assets_dir: PathBuf,
    /// Delivery prefix that segment URIs are rewritten onto (default: `/assets`).
    pub assets_url_prefix: String,
    /// Register videos found under `assets_dir` at startup (default: `true`).
    pub seed_assets: bool,
    /// PostgreSQL URL. Without one the server keeps annotations in memory.
    pub database_url: Option<String>,
    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `ASSETS_DIR`           | `assets`                   |
    /// | `ASSETS_URL_PREFIX`    | `/assets`                  |
    /// | `SEED_ASSETS`          | `true`                     |
    /// | `DATABASE_URL`         | unset (in-memory store)    |
    /// | `LOG_FORMAT`           | `text` (`json` to switch)  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = get("HOST", "0.0.0.0");
        let port: u16 = parse_var("PORT", &get("PORT", "5000"))?;

        let cors_origins: Vec<String> = get("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 =
            parse_var("REQUEST_TIMEOUT_SECS", &get("REQUEST_TIMEOUT_SECS", "30"))?;

        let assets_dir = PathBuf::from(get("ASSETS_DIR", "assets"));

        let assets_url_prefix = get("ASSETS_URL_PREFIX", "/assets");
        if !(assets_url_prefix.starts_with('/') || assets_url_prefix.contains("://")) {
            return Err(ConfigError::Invalid {
                var: "ASSETS_URL_PREFIX",
                value: assets_url_prefix,
                reason: "must be a rooted path or an absolute URL".to_string(),
            });
        }

        let seed_assets = parse_bool("SEED_ASSETS", &get("SEED_ASSETS", "true"))?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());

        let log_json = get("LOG_FORMAT", "text").eq_ignore_ascii_case("json");

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            assets_dir,
            assets_url_prefix,
            seed_assets,
            database_url,
            log_json,
        })
    }

    /// Path under which the assets directory is served by this process, if
    /// the delivery prefix is local rather than a CDN URL.
    pub fn local_assets_mount(&self) -> Option<&str> {
        let prefix = self.assets_url_prefix.trim_end_matches('/');
        (prefix.starts_with('/') && prefix.len() > 1).then_some(prefix)
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
