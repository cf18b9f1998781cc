use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    /// Session token configuration
    pub jwt: JwtAuthConfig,
    /// LINE Login channel configuration
    pub line: LineConfig,
    /// Front-end applications the callbacks redirect to
    pub frontend: FrontendConfig,
    /// Locker device settings
    pub iot: IotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Public base URL of this server, used to build OAuth callback URLs
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// HMAC secret for signing session tokens
    pub secret: String,

    /// Session token expiration in seconds (default: 86400 = 1 day)
    #[serde(default = "default_jwt_expiry")]
    pub expiry_secs: i64,

    /// Leeway in seconds for clock skew tolerance (default: 30)
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineConfig {
    pub channel_id: String,

    /// Channel secret; also keys the OAuth state encryption
    pub channel_secret: String,

    #[serde(default = "default_line_authorize_url")]
    pub authorize_url: String,

    #[serde(default = "default_line_token_url")]
    pub token_url: String,

    /// Timeout for the server-to-server token exchange
    #[serde(default = "default_line_timeout")]
    pub request_timeout_secs: u64,

    /// Passphrase embedded in the OAuth state; must not contain `|`
    #[serde(default = "default_state_passphrase")]
    pub state_passphrase: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    /// LIFF application base URL
    pub liff_url: String,

    /// Admin console base URL
    pub admin_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IotConfig {
    /// Shared secret presented by locker devices
    pub device_secret: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_jwt_expiry() -> i64 {
    86400
}
fn default_jwt_leeway() -> u64 {
    30
}
fn default_line_authorize_url() -> String {
    "https://access.line.me/oauth2/v2.1/authorize".to_string()
}
fn default_line_token_url() -> String {
    "https://api.line.me/oauth2/v2.1/token".to_string()
}
fn default_line_timeout() -> u64 {
    10
}
fn default_state_passphrase() -> String {
    "Hello World!".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with LOCKER__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("LOCKER").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration from embedded defaults plus overrides.
    ///
    /// Does not touch the file system or environment and skips validation,
    /// so tests can build partial configurations.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 30
            base_url = "https://api.locker.test"

            [database]
            url = ""
            max_connections = 5
            min_connections = 0
            connect_timeout_secs = 1
            idle_timeout_secs = 60

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []

            [jwt]
            secret = "test-jwt-secret"
            expiry_secs = 3600
            leeway_secs = 0

            [line]
            channel_id = "1234567890"
            channel_secret = "test-channel-secret"
            authorize_url = "https://access.line.me/oauth2/v2.1/authorize"
            token_url = "https://api.line.me/oauth2/v2.1/token"
            request_timeout_secs = 5
            state_passphrase = "Hello World!"

            [frontend]
            liff_url = "https://liff.locker.test"
            admin_url = "https://admin.locker.test"

            [iot]
            device_secret = "test-device-secret"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let required = [
            (&self.database.url, "LOCKER__DATABASE__URL"),
            (&self.line.channel_id, "LOCKER__LINE__CHANNEL_ID"),
            (&self.line.channel_secret, "LOCKER__LINE__CHANNEL_SECRET"),
            (&self.jwt.secret, "LOCKER__JWT__SECRET"),
            (&self.iot.device_secret, "LOCKER__IOT__DEVICE_SECRET"),
        ];
        for (value, env_var) in required {
            if value.is_empty() {
                return Err(ConfigValidationError::MissingRequired(format!(
                    "{} environment variable must be set",
                    env_var
                )));
            }
        }

        // Validate port range
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        // Validate connection pool settings
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.line.state_passphrase.contains('|') {
            return Err(ConfigValidationError::InvalidValue(
                "line.state_passphrase must not contain '|'".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
