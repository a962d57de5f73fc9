use crate::error::{Result, RoutineError};
use crate::materialize::{SinkOptions, DEFAULT_COPY_BUFFER};
use crate::metadata::{TextEncoding, DEFAULT_SCHEMA};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ENV_PREFIX: &str = "ROUTINE_ENGINE_";

/// Engine-wide settings shared by every call a `RoutineCaller` makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Schema used for procedures declared without one
    pub default_schema: String,
    /// Applied when the descriptor has no timeout of its own
    pub default_timeout_secs: Option<u64>,
    pub stream_buffer_size: usize,
    /// Used by text stream targets that do not name an encoding
    pub text_encoding: TextEncoding,
    pub logging_enabled: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_schema: DEFAULT_SCHEMA.to_string(),
            default_timeout_secs: None,
            stream_buffer_size: DEFAULT_COPY_BUFFER,
            text_encoding: TextEncoding::Utf8,
            logging_enabled: true,
        }
    }
}

impl EngineOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| RoutineError::Configuration(format!("invalid engine options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Defaults overridden by `ROUTINE_ENGINE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();
        if let Some(schema) = env_value("DEFAULT_SCHEMA") {
            options.default_schema = schema;
        }
        if let Some(secs) = env_value("TIMEOUT_SECS") {
            options.default_timeout_secs = Some(parse_env("TIMEOUT_SECS", &secs)?);
        }
        if let Some(size) = env_value("STREAM_BUFFER_SIZE") {
            options.stream_buffer_size = parse_env("STREAM_BUFFER_SIZE", &size)?;
        }
        if let Some(encoding) = env_value("TEXT_ENCODING") {
            options.text_encoding = serde_json::from_value(serde_json::Value::String(
                encoding.to_lowercase(),
            ))
            .map_err(|_| {
                RoutineError::Configuration(format!(
                    "{}TEXT_ENCODING: unknown encoding '{}'",
                    ENV_PREFIX, encoding
                ))
            })?;
        }
        if let Some(enabled) = env_value("LOGGING") {
            options.logging_enabled = match enabled.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "y" => true,
                "0" | "false" | "no" | "n" => false,
                other => {
                    return Err(RoutineError::Configuration(format!(
                        "{}LOGGING: expected a boolean, got '{}'",
                        ENV_PREFIX, other
                    )))
                }
            };
        }
        options.validate()?;
        Ok(options)
    }

    /// Loads `.env` once, then reads the environment.
    #[cfg(feature = "test-helpers")]
    pub fn from_dotenv() -> Result<Self> {
        use std::sync::Once;
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let _ = dotenvy::dotenv();
        });
        Self::from_env()
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_schema.trim().is_empty() {
            return Err(RoutineError::Configuration(
                "default_schema must not be empty".to_string(),
            ));
        }
        if self.stream_buffer_size == 0 {
            return Err(RoutineError::Configuration(
                "stream_buffer_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_secs.map(Duration::from_secs)
    }

    pub fn sink_options(&self) -> SinkOptions {
        SinkOptions {
            buffer_size: self.stream_buffer_size,
            default_encoding: self.text_encoding,
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, key))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        RoutineError::Configuration(format!("{}{}: cannot parse '{}'", ENV_PREFIX, key, raw))
    })
}
