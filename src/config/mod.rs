use serde::{Deserialize, Deserializer};
use std::sync::{Mutex, OnceLock};
use thiserror::Error;


/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Custom deserializer for comma-separated strings
fn deserialize_comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(s.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

/// Application settings with environment variable support
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    // Server
    pub bind_address: String,
    pub environment: String,

    // Database (unset: run on the in-memory store)
    pub database_url: Option<String>,

    // Sessions
    pub session_max_age_seconds: i64,
    #[serde(deserialize_with = "deserialize_comma_separated")]
    pub public_assets: Vec<String>,
    pub static_dir: String,

    // First admin account, created on startup when missing
    pub bootstrap_admin_username: Option<String>,
    pub bootstrap_admin_password: Option<String>,

    // Security
    #[serde(deserialize_with = "deserialize_comma_separated")]
    pub cors_allow_origins: Vec<String>,

    // Logging
    pub log_level: String,
    pub log_format: String,

    // Remote log sink
    pub logtail_url: Option<String>,
    pub logtail_token: Option<String>,

    // Transcript field extraction
    pub cohere_api_key: Option<String>,
    pub cohere_api_url: String,

    pub http_timeout_seconds: f64,
}

impl Settings {
    /// Create new settings instance from environment variables and .env file
    pub fn new() -> Result<Self, ConfigError> {
        Self::new_with_env_file(true)
    }

    /// Create new settings instance with optional .env file loading
    pub fn new_with_env_file(load_env_file: bool) -> Result<Self, ConfigError> {
        // Tests mutate the process environment; serialize reads of it
        static SETTINGS_BUILD_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        let build_mutex = SETTINGS_BUILD_MUTEX.get_or_init(|| Mutex::new(()));
        let _guard = build_mutex
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        #[cfg(not(test))]
        {
            if load_env_file {
                dotenvy::dotenv().ok();
            }
        }
        #[cfg(test)]
        let _ = load_env_file;

        let mut builder = config::Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("environment", "development")?
            .set_default("database_url", None::<String>)?
            .set_default("session_max_age_seconds", 604_800i64)?
            .set_default("public_assets", "/logo.png")?
            .set_default("static_dir", "./public")?
            .set_default("bootstrap_admin_username", None::<String>)?
            .set_default("bootstrap_admin_password", None::<String>)?
            .set_default("cors_allow_origins", "http://localhost:3000,http://127.0.0.1:3000")?
            .set_default("log_level", "INFO")?
            .set_default("log_format", "json")?
            .set_default("logtail_url", None::<String>)?
            .set_default("logtail_token", None::<String>)?
            .set_default("cohere_api_key", None::<String>)?
            .set_default("cohere_api_url", "https://api.cohere.ai/v1/chat")?
            .set_default("http_timeout_seconds", 30.0)?;

        fn read_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|v| !v.trim().is_empty())
        }

        // String overrides (UPPERCASE only)
        for (env_key, key) in [
            ("BIND_ADDRESS", "bind_address"),
            ("ENVIRONMENT", "environment"),
            ("DATABASE_URL", "database_url"),
            ("PUBLIC_ASSETS", "public_assets"),
            ("STATIC_DIR", "static_dir"),
            ("BOOTSTRAP_ADMIN_USERNAME", "bootstrap_admin_username"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "bootstrap_admin_password"),
            ("CORS_ALLOW_ORIGINS", "cors_allow_origins"),
            ("LOG_LEVEL", "log_level"),
            ("LOG_FORMAT", "log_format"),
            ("LOGTAIL_URL", "logtail_url"),
            ("LOGTAIL_TOKEN", "logtail_token"),
            ("COHERE_API_KEY", "cohere_api_key"),
            ("COHERE_API_URL", "cohere_api_url"),
        ] {
            if let Some(v) = read_env(env_key) {
                builder = builder.set_override(key, v)?;
            }
        }

        // Numeric overrides
        if let Some(v) = read_env("SESSION_MAX_AGE_SECONDS").and_then(|s| s.parse::<i64>().ok()) { builder = builder.set_override("session_max_age_seconds", v)?; }
        if let Some(v) = read_env("HTTP_TIMEOUT_SECONDS").and_then(|s| s.parse::<f64>().ok()) { builder = builder.set_override("http_timeout_seconds", v)?; }

        let settings = builder.build()?;

        let config: Settings = settings.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.log_format.as_str(), "json" | "plain") {
            return Err(ConfigError::Validation(
                "log_format must be 'json' or 'plain'".to_string(),
            ));
        }

        if self.session_max_age_seconds <= 0 {
            return Err(ConfigError::Validation(
                "session_max_age_seconds must be greater than 0".to_string(),
            ));
        }

        if self.http_timeout_seconds <= 0.0 {
            return Err(ConfigError::Validation(
                "http_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if let Some(asset) = self.public_assets.iter().find(|a| !a.starts_with('/')) {
            return Err(ConfigError::Validation(format!(
                "public asset '{}' must be an absolute path",
                asset
            )));
        }

        if self.bootstrap_admin_username.is_some() != self.bootstrap_admin_password.is_some() {
            return Err(ConfigError::Validation(
                "bootstrap_admin_username and bootstrap_admin_password must be set together"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
