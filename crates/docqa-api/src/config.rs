use config::{Config as ConfigLoader, ConfigError, Environment, File};
use docqa_core::inference::{CREDENTIAL_ENV, DEFAULT_MODEL, MODEL_ENV};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const BASE_URL_ENV: &str = "GROQ_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,

    // Inference settings (from ENV only)
    #[serde(skip)]
    pub groq_api_key: Option<String>,
    #[serde(skip_deserializing, default = "default_model")]
    pub model: String,
    #[serde(skip_deserializing)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Cap on a whole request body, uploads included
    pub max_upload_bytes: usize,
    /// Whole-request deadline, enforced by the router
    pub request_timeout_secs: u64,
    /// Deadline for one model call; keep below `request_timeout_secs`
    #[serde(default = "default_inference_timeout")]
    pub inference_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_inference_timeout() -> u64 {
    90
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_upload_bytes: 32 * 1024 * 1024,
                request_timeout_secs: 120,
                inference_timeout_secs: default_inference_timeout(),
            },
            cors: CorsConfig {
                enabled: false,
                origins: vec!["*".to_string()],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
            groq_api_key: None,
            model: default_model(),
            base_url: None,
        }
    }
}

impl Config {
    /// Load configuration from built-in defaults, TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. built-in defaults
    /// 2. config/default.toml
    /// 3. config/{ENV}.toml (if ENV is set)
    /// 4. DOCQA_-prefixed variables, e.g. `DOCQA_SERVER__PORT=8080`
    ///
    /// The inference credential, model and base URL are read afterwards
    /// from `GROQ_API_KEY`, `GROQ_MODEL` and `GROQ_BASE_URL`.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(ConfigLoader::try_from(&Config::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("DOCQA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder()
            .add_source(ConfigLoader::try_from(&Config::default())?)
            .add_source(File::from(path.as_ref()));

        builder.build()?.try_deserialize()
    }

    /// Overlay the provider settings. Blank values count as unset.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        self.groq_api_key = non_blank(CREDENTIAL_ENV);
        if let Some(model) = non_blank(MODEL_ENV) {
            self.model = model;
        }
        if let Some(base_url) = non_blank(BASE_URL_ENV) {
            self.base_url = Some(base_url);
        }
    }

    pub fn credential_configured(&self) -> bool {
        self.groq_api_key.is_some()
    }
}
