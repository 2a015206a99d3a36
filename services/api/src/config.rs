use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub google_api_key: String,
    pub gemini_host: String,
    /// Model name, always carrying the `models/` prefix.
    pub gemini_model: String,
    /// HTTP proxy for the upstream connection, if any.
    pub proxy_url: Option<String>,
    /// Speech synthesis stays disabled while this is unset.
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_voice_id: String,
    pub elevenlabs_voice_model: String,
    pub log_level: Level,
    pub static_dir: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let google_api_key = std::env::var("GOOGLE_API_KEY")
            .map_err(|_| ConfigError::MissingVar("GOOGLE_API_KEY".to_string()))?;

        let gemini_host =
            std::env::var("GEMINI_HOST").unwrap_or_else(|_| gemini_live::DEFAULT_HOST.to_string());

        let model_name =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash-exp".to_string());
        let gemini_model = if model_name.starts_with("models/") {
            model_name
        } else {
            format!("models/{model_name}")
        };

        let proxy_url = std::env::var("HTTP_PROXY").ok();

        let elevenlabs_api_key = std::env::var("ELEVENLABS_API_KEY").ok();
        let elevenlabs_voice_id = std::env::var("ELEVENLABS_VOICE_ID")
            .unwrap_or_else(|_| "nPczCjzI2devNBz1zQrb".to_string());
        let elevenlabs_voice_model = std::env::var("ELEVENLABS_VOICE_MODEL")
            .unwrap_or_else(|_| "eleven_flash_v2_5".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let static_dir = std::env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./frontend"));

        Ok(Self {
            bind_address,
            google_api_key,
            gemini_host,
            gemini_model,
            proxy_url,
            elevenlabs_api_key,
            elevenlabs_voice_id,
            elevenlabs_voice_model,
            log_level,
            static_dir,
        })
    }

    /// Connection parameters for a new upstream live session.
    pub fn live_config(&self) -> gemini_live::LiveConfig {
        gemini_live::LiveConfig {
            model: self.gemini_model.clone(),
            api_key: self.google_api_key.clone(),
            host: self.gemini_host.clone(),
            proxy_url: self.proxy_url.clone(),
            instructions: crate::prompts::PERSONA.to_string(),
        }
    }
}
