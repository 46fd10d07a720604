/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SESSION_SECRET`: Secret key for session signing, at least 32 characters (required)
/// - `SESSION_TTL_HOURS`: Session lifetime (default: 168)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3000)
/// - `PUBLIC_BASE_URL`: Externally visible origin (default: http://localhost:3000)
/// - `CORS_ORIGINS`: Comma separated origins (default: *)
/// - `PRODUCTION`: Enables HSTS and `Secure` cookies (default: false)
/// - `FACEBOOK_CLIENT_ID` / `FACEBOOK_CLIENT_SECRET`: Facebook app credentials (required)
/// - `FACEBOOK_REDIRECT_URI`: OAuth callback (default: `{PUBLIC_BASE_URL}/api/social/facebook/callback`)
/// - `FACEBOOK_API_VERSION`: Graph API version (default: v19.0)
/// - `FACEBOOK_GRAPH_URL`: Graph API host (default: https://graph.facebook.com)
/// - `OPENAI_API_KEY`: Enables AI generation when set
/// - `OPENAI_BASE_URL` / `OPENAI_MODEL`: Completion endpoint and model
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use pagepilot_api::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}:{}", config.api.host, config.api.port);
/// # Ok(())
/// # }
/// ```

use pagepilot_shared::{
    db::pool::DatabaseConfig as PoolConfig,
    generator::{DEFAULT_BASE_URL as OPENAI_DEFAULT_BASE_URL, DEFAULT_MODEL as OPENAI_DEFAULT_MODEL},
    social::graph::{DEFAULT_API_VERSION, DEFAULT_GRAPH_URL},
};
use std::{env, fmt, str::FromStr};

/// Minimum length of the session signing secret
const MIN_SECRET_LEN: usize = 32;

/// Longest accepted session lifetime (one year)
const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

const REDACTED: &str = "<redacted>";

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session configuration
    pub session: SessionConfig,

    /// Facebook app configuration
    pub facebook: FacebookConfig,

    /// AI generation; `None` disables the generate endpoint
    pub openai: Option<OpenAiConfig>,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Externally visible origin, without trailing slash
    pub public_base_url: String,

    /// Allowed CORS origins (`*` for any)
    pub cors_origins: Vec<String>,

    /// Production mode
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret key for session signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Session lifetime in hours
    pub ttl_hours: i64,
}

/// Facebook app configuration
#[derive(Clone)]
pub struct FacebookConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub api_version: String,
    pub graph_url: String,
}

/// OpenAI-compatible completion endpoint
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &REDACTED)
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

impl fmt::Debug for FacebookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacebookConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .field("redirect_uri", &self.redirect_uri)
            .field("api_version", &self.api_version)
            .field("graph_url", &self.graph_url)
            .finish()
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &REDACTED)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl DatabaseConfig {
    /// Pool settings for the shared pool builder
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            ..Default::default()
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value: {}", key, e)),
        None => Ok(default),
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "API_PORT", 3000u16)?;
        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();
        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        let production = parse_or(&lookup, "PRODUCTION", false)?;

        let database_url = required(&lookup, "DATABASE_URL")?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;

        let session_secret = required(&lookup, "SESSION_SECRET")?;
        if session_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("SESSION_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }
        let ttl_hours = parse_or(&lookup, "SESSION_TTL_HOURS", 168i64)?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&ttl_hours) {
            anyhow::bail!(
                "SESSION_TTL_HOURS must be between 1 and {}",
                MAX_SESSION_TTL_HOURS
            );
        }

        let facebook = FacebookConfig {
            client_id: required(&lookup, "FACEBOOK_CLIENT_ID")?,
            client_secret: required(&lookup, "FACEBOOK_CLIENT_SECRET")?,
            redirect_uri: lookup("FACEBOOK_REDIRECT_URI")
                .unwrap_or_else(|| format!("{}/api/social/facebook/callback", public_base_url)),
            api_version: lookup("FACEBOOK_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            graph_url: lookup("FACEBOOK_GRAPH_URL").unwrap_or_else(|| DEFAULT_GRAPH_URL.to_string()),
        };

        let openai = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| OpenAiConfig {
                api_key,
                base_url: lookup("OPENAI_BASE_URL")
                    .unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string()),
                model: lookup("OPENAI_MODEL").unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            });

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                public_base_url,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig {
                secret: session_secret,
                ttl_hours,
            },
            facebook,
            openai,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
