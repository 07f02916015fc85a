//! Gateway configuration. Load from TOML and `EKA__*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_APP_NAME: &str = "EKA-AI Gateway";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8001;
const DEFAULT_STORAGE_PATH: &str = "./data/eka";
const DEFAULT_JWT_SECRET: &str = "change-me-in-production";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_BCRYPT_COST: u32 = 12;
const DEFAULT_LLM_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PERSIST_TIMEOUT_SECS: u64 = 5;

/// Global gateway configuration (HTTP surface, storage, tokens, answer generator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Service identity reported by `/api/` and `/api/health`.
    pub app_name: String,
    pub host: String,
    pub port: u16,
    /// Directory for the sled document store.
    pub storage_path: String,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
    /// Session lifetime. Tokens are rejected once `exp` has passed.
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    /// OpenAI-compatible base URL (`{base}/chat/completions`).
    pub llm_api_base: String,
    /// Env fallback: `OPENAI_API_KEY`. Without a key every answer takes the degrade path.
    #[serde(default)]
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub generation_timeout_secs: u64,
    pub persist_timeout_secs: u64,
    /// Allowed browser origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage_path: DEFAULT_STORAGE_PATH.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            llm_api_base: DEFAULT_LLM_API_BASE.to_string(),
            llm_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            generation_timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
            persist_timeout_secs: DEFAULT_PERSIST_TIMEOUT_SECS,
            cors_origins: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Load config from file and environment. Precedence: `EKA__*` env > `EKA_CONFIG` file
    /// (default `config/gateway.toml`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("EKA_CONFIG").unwrap_or_else(|_| "config/gateway.toml".to_string());
        let builder = config::Config::builder()
            .set_default("app_name", DEFAULT_APP_NAME)?
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("storage_path", DEFAULT_STORAGE_PATH)?
            .set_default("jwt_secret", DEFAULT_JWT_SECRET)?
            .set_default("token_ttl_hours", DEFAULT_TOKEN_TTL_HOURS)?
            .set_default("bcrypt_cost", i64::from(DEFAULT_BCRYPT_COST))?
            .set_default("llm_api_base", DEFAULT_LLM_API_BASE)?
            .set_default("llm_model", DEFAULT_LLM_MODEL)?
            .set_default("generation_timeout_secs", DEFAULT_GENERATION_TIMEOUT_SECS as i64)?
            .set_default("persist_timeout_secs", DEFAULT_PERSIST_TIMEOUT_SECS as i64)?
            .set_default("cors_origins", Vec::<String>::new())?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("EKA")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: Self = built.try_deserialize()?;
        if cfg.llm_api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            cfg.llm_api_key = std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty());
        }
        Ok(cfg)
    }

    /// True while the signing secret is still the shipped placeholder.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn persist_timeout(&self) -> Duration {
        Duration::from_secs(self.persist_timeout_secs)
    }
}
