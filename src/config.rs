//! Configuration management for the Frontdesk console

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use std::env;

/// How strictly list responses must follow the `{ success, data, pagination }` envelope
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    /// Reject anything but the documented envelope
    #[default]
    Strict,
    /// Accept bare arrays and differently named collection fields
    Lenient,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub base_url: String,
    pub response_shape: ResponseShape,
    /// Request timeout; no timeout when unset
    pub timeout_secs: Option<u64>,
}

/// A back-end section as written; missing keys come from that back end's defaults
#[derive(Debug, Deserialize)]
struct BackendSection {
    base_url: Option<String>,
    response_shape: Option<ResponseShape>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ListConfig {
    pub page_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// When set, logs also go to a daily rolling file in this directory
    pub directory: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "BackendConfig::library", deserialize_with = "BackendConfig::library_section")]
    pub library: BackendConfig,
    #[serde(default = "BackendConfig::hotel", deserialize_with = "BackendConfig::hotel_section")]
    pub hotel: BackendConfig,
    #[serde(default)]
    pub lists: ListConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (e.g. FRONTDESK_LIBRARY__BASE_URL)
            .add_source(
                Environment::with_prefix("FRONTDESK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("library.base_url", env::var("LIBRARY_API_URL").ok())?
            .set_override_option("hotel.base_url", env::var("HOTEL_API_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl BackendConfig {
    pub(crate) fn library() -> Self {
        Self {
            base_url: "https://backend-library-one.vercel.app/api".to_string(),
            response_shape: ResponseShape::Strict,
            timeout_secs: None,
        }
    }

    pub(crate) fn hotel() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            response_shape: ResponseShape::Lenient,
            timeout_secs: None,
        }
    }

    fn library_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::library().merge(BackendSection::deserialize(deserializer)?))
    }

    fn hotel_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::hotel().merge(BackendSection::deserialize(deserializer)?))
    }

    fn merge(self, section: BackendSection) -> Self {
        Self {
            base_url: section.base_url.unwrap_or(self.base_url),
            response_shape: section.response_shape.unwrap_or(self.response_shape),
            timeout_secs: section.timeout_secs.or(self.timeout_secs),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library: BackendConfig::library(),
            hotel: BackendConfig::hotel(),
            lists: ListConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
