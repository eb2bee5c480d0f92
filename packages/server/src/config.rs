use common::retry::PollPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens. Default: 7 days.
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
}

fn default_token_ttl_days() -> i64 {
    7
}

/// Remote execution engine (Judge0-compatible batch API).
#[derive(Debug, Deserialize, Clone)]
pub struct ExecutorConfig {
    /// Base URL of the engine, e.g. `http://localhost:2358`.
    pub base_url: String,
    /// Sent as `X-Auth-Token` when set.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Timeout for a single HTTP request to the engine. Default: 10.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Polling rounds before a batch is reported as timed out. Default: 30.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    /// Default: 500.
    #[serde(default = "default_poll_base_delay_ms")]
    pub poll_base_delay_ms: u64,
    /// Default: 4000.
    #[serde(default = "default_poll_max_delay_ms")]
    pub poll_max_delay_ms: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}
fn default_max_poll_attempts() -> u32 {
    PollPolicy::default().max_attempts
}
fn default_poll_base_delay_ms() -> u64 {
    PollPolicy::default().base_delay_ms
}
fn default_poll_max_delay_ms() -> u64 {
    PollPolicy::default().max_delay_ms
}

impl ExecutorConfig {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_attempts: self.max_poll_attempts,
            base_delay_ms: self.poll_base_delay_ms,
            max_delay_ms: self.poll_max_delay_ms,
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:2358".into(),
            auth_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            max_poll_attempts: default_max_poll_attempts(),
            poll_base_delay_ms: default_poll_base_delay_ms(),
            poll_max_delay_ms: default_poll_max_delay_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("LEETLAB_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("executor.base_url", "http://localhost:2358")?
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., LEETLAB__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("LEETLAB").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
