use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub uploads: UploadsConfig,
    pub stories: StoriesConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub database_url: String,
    #[serde(default)]
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Prefix for upload URLs; empty serves them relative to this host
    #[serde(default)]
    pub public_base_url: String,
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Run against the in-process store instead of MySQL
    #[serde(default)]
    pub in_memory: bool,
    pub max_connections: u32,
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub token_ttl_hours: i64,
    pub reset_token_ttl_minutes: i64,
    /// Return the raw reset token from forgot-password; only for local runs
    /// without a mailer
    #[serde(default)]
    pub expose_reset_token: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    pub dir: String,
    pub max_file_bytes: usize,
    pub max_files: usize,
}

impl UploadsConfig {
    /// Largest multipart body accepted; a little headroom for field headers
    pub fn max_body_bytes(&self) -> usize {
        self.max_file_bytes
            .saturating_mul(self.max_files)
            .saturating_add(64 * 1024)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoriesConfig {
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables of the form GURI_<SECTION>__<KEY>,
    ///    e.g. `GURI_SERVER__PORT=9000` or `GURI_DATABASE__IN_MEMORY=true`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(false)
    }

    /// Like [`Config::load`], with `force_memory` switching the store to the
    /// in-process backend whatever the files say
    pub fn load_with(force_memory: bool) -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // 3. Environment variables override everything
            .add_source(
                Environment::with_prefix("GURI")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.origins")
                    .try_parsing(true),
            )
            .set_override_option("database.in_memory", force_memory.then_some(true))?;

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        cfg.jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| ConfigError::Message("JWT_SECRET environment variable is required".to_string()))?;
        if !cfg.database.in_memory {
            cfg.database_url = std::env::var("DATABASE_URL").map_err(|_| {
                ConfigError::Message("DATABASE_URL environment variable is required".to_string())
            })?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            return Err(ConfigError::Message(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }
        if self.auth.token_ttl_hours <= 0 || self.auth.reset_token_ttl_minutes <= 0 {
            return Err(ConfigError::Message("auth TTLs must be positive".to_string()));
        }
        if self.stories.ttl_hours <= 0 {
            return Err(ConfigError::Message("stories.ttl_hours must be positive".to_string()));
        }
        if self.uploads.max_files == 0 {
            return Err(ConfigError::Message("uploads.max_files must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 3000

        [cors]
        enabled = true
        origins = ["http://localhost:3000"]

        [database]
        max_connections = 5
        acquire_timeout_ms = 3000

        [auth]
        token_ttl_hours = 24
        reset_token_ttl_minutes = 60

        [uploads]
        dir = "/tmp/guri-uploads"
        max_file_bytes = 1048576
        max_files = 4

        [stories]
        ttl_hours = 24

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert!(!config.database.in_memory);
        assert!(!config.auth.expose_reset_token);
        assert_eq!(config.uploads.max_body_bytes(), 4 * 1048576 + 64 * 1024);
    }

    #[test]
    fn test_validate_requires_long_secret() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());

        config.jwt_secret = "x".repeat(32);
        assert!(config.validate().is_ok());

        config.stories.ttl_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let config = Config::from_file(path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.stories.ttl_hours, 24);
        assert_eq!(config.auth.reset_token_ttl_minutes, 60);
    }
}
