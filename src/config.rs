use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
///
/// Resolved once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub bookings: BookingSettings,
    #[serde(default)]
    pub assistant: AssistantSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// `*` allows any origin
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_cors_origins() -> Vec<String> { vec!["*".to_string()] }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl_hours() -> i64 { 168 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// L1 only when unset
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_max_per_category")]
    pub max_per_category: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            max_per_category: default_max_per_category(),
        }
    }
}

fn default_max_per_category() -> usize { 3 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingSettings {
    /// Restrict booking creation to the event's owner
    #[serde(default)]
    pub require_event_owner: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantSettings {
    #[serde(default = "default_assistant_endpoint")]
    pub endpoint: String,
    /// The gateway answers with its fallback message when unset
    pub api_key: Option<String>,
    #[serde(default = "default_assistant_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_assistant_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_vendors_in_prompt")]
    pub max_vendors_in_prompt: usize,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            endpoint: default_assistant_endpoint(),
            api_key: None,
            model: default_assistant_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_assistant_timeout(),
            max_vendors_in_prompt: default_max_vendors_in_prompt(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_assistant_endpoint() -> String { "https://api.anthropic.com/v1".to_string() }
fn default_assistant_model() -> String { "claude-3-5-sonnet-latest".to_string() }
fn default_max_tokens() -> u32 { 1024 }
fn default_assistant_timeout() -> u64 { 30 }
fn default_max_vendors_in_prompt() -> usize { 20 }
fn default_history_limit() -> usize { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

const ENV_PREFIX: &str = "ARANGETRAM";

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Configuration file (config/default.toml)
    /// 2. Local overrides (config/local.toml)
    /// 3. Environment variables (prefixed with ARANGETRAM__)
    /// 4. DATABASE_URL, JWT_SECRET and ASSISTANT_API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ARANGETRAM__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the conventional unprefixed variables on top of the layered config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    let overrides = [
        ("DATABASE_URL", "database.url"),
        ("JWT_SECRET", "auth.jwt_secret"),
        ("ASSISTANT_API_KEY", "assistant.api_key"),
    ];
    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
