//! Configuration management for `AtollTravel`
//!
//! Handles loading configuration from files and environment variables
//! and validates every setting before it reaches the clients.

use crate::TravelError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Booking backend settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Geocoding service settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Client-side storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Listing defaults
    #[serde(default)]
    pub listings: ListingsConfig,
}

/// Booking backend REST API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the REST API
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_seconds: u32,
}

/// Nominatim geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the geocoding service
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// ISO 3166-1 alpha-2 country restriction
    #[serde(default = "default_country_code")]
    pub country_code: String,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_seconds: u32,
    /// Maximum results per search
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
    /// Radius in meters for the nearby fallback search
    #[serde(default = "default_fallback_radius")]
    pub fallback_radius_m: u32,
    /// Debounce delay for free-text search input
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Shortest query that triggers a search
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    /// Client-side request budget
    #[serde(default = "default_max_requests_per_minute")]
    pub max_requests_per_minute: u32,
    /// Lifetime of cached reverse lookups, 0 disables caching
    #[serde(default = "default_reverse_cache_ttl")]
    pub reverse_cache_ttl_hours: u32,
}

/// Client-side storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the persistent store
    #[serde(default = "default_storage_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Listing defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingsConfig {
    /// Upper bound of the default price range
    #[serde(default = "default_max_price")]
    pub max_price: f64,
}

fn default_backend_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_backend_timeout() -> u32 {
    30
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_country_code() -> String {
    "mv".to_string()
}

fn default_user_agent() -> String {
    format!("AtollTravel/{}", env!("CARGO_PKG_VERSION"))
}

fn default_geocoding_timeout() -> u32 {
    10
}

fn default_search_limit() -> u32 {
    10
}

fn default_fallback_radius() -> u32 {
    5000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    2
}

fn default_max_requests_per_minute() -> u32 {
    60
}

fn default_reverse_cache_ttl() -> u32 {
    24
}

fn default_storage_location() -> String {
    dirs::data_local_dir()
        .map(|dir| dir.join("atoll-travel").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".atoll-travel".to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_max_price() -> f64 {
    5000.0
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_base_url(),
            timeout_seconds: default_backend_timeout(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            country_code: default_country_code(),
            user_agent: default_user_agent(),
            timeout_seconds: default_geocoding_timeout(),
            search_limit: default_search_limit(),
            fallback_radius_m: default_fallback_radius(),
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            max_requests_per_minute: default_max_requests_per_minute(),
            reverse_cache_ttl_hours: default_reverse_cache_ttl(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            location: default_storage_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            max_price: default_max_price(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            geocoding: GeocodingConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            listings: ListingsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ATOLL_GEOCODING__BASE_URL etc.
        builder = builder.add_source(
            Environment::with_prefix("ATOLL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("atoll-travel").join("config.toml"))
    }

    /// Apply default values to empty or zeroed fields
    pub fn apply_defaults(&mut self) {
        if self.backend.base_url.is_empty() {
            self.backend.base_url = default_backend_base_url();
        }
        if self.backend.timeout_seconds == 0 {
            self.backend.timeout_seconds = default_backend_timeout();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.country_code.is_empty() {
            self.geocoding.country_code = default_country_code();
        }
        if self.geocoding.user_agent.is_empty() {
            self.geocoding.user_agent = default_user_agent();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.geocoding.search_limit == 0 {
            self.geocoding.search_limit = default_search_limit();
        }
        if self.geocoding.max_requests_per_minute == 0 {
            self.geocoding.max_requests_per_minute = default_max_requests_per_minute();
        }
        if self.storage.location.is_empty() {
            self.storage.location = default_storage_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.listings.max_price <= 0.0 {
            self.listings.max_price = default_max_price();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_urls()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_urls(&self) -> Result<()> {
        for (name, url) in [
            ("Backend", &self.backend.base_url),
            ("Geocoding", &self.geocoding.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TravelError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.backend.timeout_seconds > 300 || self.geocoding.timeout_seconds > 300 {
            return Err(TravelError::config("Request timeout cannot exceed 300 seconds").into());
        }

        // Nominatim caps `limit` at 40
        if self.geocoding.search_limit > 40 {
            return Err(TravelError::config("Geocoding search limit cannot exceed 40").into());
        }

        if self.geocoding.debounce_ms > 5000 {
            return Err(TravelError::config("Search debounce cannot exceed 5000 ms").into());
        }

        if self.geocoding.reverse_cache_ttl_hours > 24 * 30 {
            return Err(
                TravelError::config("Reverse geocoding cache TTL cannot exceed 30 days").into(),
            );
        }

        if !self.listings.max_price.is_finite() {
            return Err(TravelError::config("Maximum listing price must be finite").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let code = &self.geocoding.country_code;
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TravelError::config(format!(
                "Invalid country code '{code}'. Expected two letters such as 'mv'"
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.geocoding.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.geocoding.country_code, "mv");
        assert_eq!(config.geocoding.debounce_ms, 300);
        assert_eq!(config.geocoding.min_query_len, 2);
        assert_eq!(config.logging.level, "info");
        assert!(config.geocoding.user_agent.starts_with("AtollTravel/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AppConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AppConfig::default();
        config.geocoding.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_bad_url_and_country() {
        let mut config = AppConfig::default();
        config.backend.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.geocoding.country_code = "mdv".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid country code"));
    }

    #[test]
    fn test_apply_defaults_fills_zeroed_fields() {
        let mut config = AppConfig::default();
        config.geocoding.search_limit = 0;
        config.backend.base_url.clear();
        config.listings.max_price = 0.0;
        config.apply_defaults();
        assert_eq!(config.geocoding.search_limit, 10);
        assert_eq!(config.backend.base_url, "http://localhost:8000/api");
        assert_eq!(config.listings.max_price, 5000.0);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[geocoding]\ndebounce_ms = 450\n\n[logging]\nlevel = \"debug\"\n"
        )
        .unwrap();

        let config = AppConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.geocoding.debounce_ms, 450);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.geocoding.country_code, "mv");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = AppConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("atoll-travel"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
