use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_REQUEST_LOG_PATH: &str = "/tmp/info.csv";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct AttractionsConfig {
    pub common: core_config::Config,
    pub models: ModelConfig,
    pub google: GoogleConfig,
    pub request_log: RequestLogConfig,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model used for schema-constrained generation (e.g., gemini-2.5-flash)
    pub text_model: String,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RequestLogConfig {
    /// CSV file appended on every request and uploaded as context.
    pub path: PathBuf,
}

impl AttractionsConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let api_key = get_env("GOOGLE_API_KEY", None, is_prod)
            .or_else(|err| env::var("GEMINI_API_KEY").map_err(|_| err))?;

        Ok(AttractionsConfig {
            common: common_config,
            models: ModelConfig {
                text_model: get_env("GENAI_TEXT_MODEL", Some(DEFAULT_TEXT_MODEL), is_prod)?,
            },
            google: GoogleConfig {
                api_key: Secret::new(api_key),
                api_base: get_env(
                    "GEMINI_API_BASE",
                    Some(crate::services::providers::gemini::GEMINI_API_BASE),
                    is_prod,
                )?,
                timeout: parse_timeout_secs(&get_env(
                    "GEMINI_TIMEOUT_SECS",
                    Some(&DEFAULT_GEMINI_TIMEOUT_SECS.to_string()),
                    is_prod,
                )?)?,
            },
            request_log: RequestLogConfig {
                path: get_env("REQUEST_LOG_PATH", Some(DEFAULT_REQUEST_LOG_PATH), is_prod)?.into(),
            },
        })
    }
}

fn parse_timeout_secs(raw: &str) -> Result<Duration, AppError> {
    raw.trim().parse().map(Duration::from_secs).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "GEMINI_TIMEOUT_SECS must be a whole number of seconds, got '{}': {}",
            raw,
            e
        ))
    })
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
