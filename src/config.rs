//! Configuration management for plan-agent.
//!
//! Configuration can be set via environment variables (a `.env` file in the
//! working directory is loaded first by the binary):
//! - `GROQ_API_KEY` - Required. API key for the chat-completion provider.
//! - `GROQ_MODEL` - Optional. Model identifier. Defaults to `llama-3.1-8b-instant`.
//! - `GROQ_BASE_URL` - Optional. OpenAI-compatible base URL. Defaults to Groq.
//! - `OPENWEATHER_API_KEY` - Optional. Enables the weather tool.
//! - `DEBUG_MODE` - Optional. Verbose tool diagnostics and the debug toggle endpoint.
//! - `DATABASE_PATH` - Optional. SQLite file for saved plans. Defaults to `plans.db`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.
//! - `REQUEST_TIMEOUT_SECS` - Optional. Timeout for every outbound call. Defaults to `60`.
//! - `SEARCH_BASE_URL` / `WEATHER_BASE_URL` - Optional. Tool endpoint overrides.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://api.duckduckgo.com/";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Endpoints and credentials for the lookup tools.
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// OpenWeatherMap API key; the weather tool reports itself unconfigured without it
    pub weather_api_key: Option<String>,

    /// DuckDuckGo instant answer endpoint
    pub search_base_url: String,

    /// OpenWeatherMap current weather endpoint
    pub weather_base_url: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            weather_api_key: None,
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
        }
    }
}

/// Service configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider API key
    pub api_key: String,

    /// Model identifier sent with every completion request
    pub model: String,

    /// OpenAI-compatible base URL (without `/chat/completions`)
    pub provider_base_url: String,

    /// Debug diagnostics enabled at startup
    pub debug_mode: bool,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Timeout applied to provider and tool requests
    pub request_timeout: Duration,

    /// Lookup tool configuration
    pub tools: ToolsConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `GROQ_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_non_blank("GROQ_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("GROQ_API_KEY".to_string()))?;

        let model = env_non_blank("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let provider_base_url = env_non_blank("GROQ_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PROVIDER_BASE_URL.to_string());

        let debug_mode = std::env::var("DEBUG_MODE")
            .ok()
            .map(|v| {
                parse_bool(&v)
                    .map_err(|e| ConfigError::InvalidValue("DEBUG_MODE".to_string(), e))
            })
            .transpose()?
            .unwrap_or(false);

        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("plans.db"));

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let tools = ToolsConfig {
            weather_api_key: env_non_blank("OPENWEATHER_API_KEY"),
            search_base_url: env_non_blank("SEARCH_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SEARCH_BASE_URL.to_string()),
            weather_base_url: env_non_blank("WEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
        };

        Ok(Self {
            api_key,
            model,
            provider_base_url,
            debug_mode,
            database_path,
            host,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            tools,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, model: String, database_path: PathBuf) -> Self {
        Self {
            api_key,
            model,
            provider_base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            debug_mode: false,
            database_path,
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout: Duration::from_secs(60),
            tools: ToolsConfig::default(),
        }
    }

    /// Listen address for the HTTP server.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Set and not just whitespace; blank values fall back to defaults.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_non_blank(name: &str) -> Option<String> {
    non_blank(std::env::var(name).ok())
}

/// Parse a boolean-like environment value (`true`, `1`, `yes`, ...).
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected boolean-like value, got: {}", other)),
    }
}
