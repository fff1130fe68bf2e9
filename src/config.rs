use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::criteria::{DEFAULT_MAX_DISTANCE_MILES, DEFAULT_MIN_RATING, MAX_STAR_RATING};

pub const MIN_GEOCODE_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub geocoder: GeocoderConfig,

    pub listings: ListingsConfig,

    pub search: SearchConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    /// `"*"` allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,

    /// Nominatim's usage policy requires an identifying user agent.
    pub user_agent: String,

    pub country_codes: String,

    pub cache_ttl_seconds: u64,

    pub cache_capacity: usize,

    /// Minimum spacing between outbound geocoding calls, process-wide.
    /// Never below [`MIN_GEOCODE_INTERVAL_MS`] (Nominatim usage policy: 1 req/s).
    pub min_interval_ms: u64,

    pub request_timeout_seconds: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: format!("restaurant-finder/{}", env!("CARGO_PKG_VERSION")),
            country_codes: "gb".to_string(),
            cache_ttl_seconds: 3600,
            cache_capacity: 100,
            min_interval_ms: MIN_GEOCODE_INTERVAL_MS,
            request_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingsConfig {
    pub base_url: String,

    pub user_agent: String,

    pub request_timeout_seconds: u64,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://uk.api.just-eat.io".to_string(),
            user_agent: "Mozilla/5.0 (compatible; RestaurantFinder/1.0)".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_distance_miles: u32,

    pub default_min_rating: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_distance_miles: DEFAULT_MAX_DISTANCE_MILES,
            default_min_rating: DEFAULT_MIN_RATING,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("restaurant-finder").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".restaurant-finder").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.geocoder.base_url.is_empty() {
            anyhow::bail!("Geocoder base URL cannot be empty");
        }

        if self.listings.base_url.is_empty() {
            anyhow::bail!("Listings base URL cannot be empty");
        }

        if self.geocoder.cache_capacity == 0 {
            anyhow::bail!("Geocode cache capacity must be > 0");
        }

        if self.geocoder.min_interval_ms < MIN_GEOCODE_INTERVAL_MS {
            anyhow::bail!(
                "Geocoder min_interval_ms must be at least {MIN_GEOCODE_INTERVAL_MS}, got {}",
                self.geocoder.min_interval_ms
            );
        }

        if self.geocoder.cache_ttl_seconds == 0 {
            anyhow::bail!("Geocode cache TTL must be > 0");
        }

        if self.search.default_min_rating > MAX_STAR_RATING {
            anyhow::bail!(
                "Default minimum rating must be between 0 and {MAX_STAR_RATING}, got {}",
                self.search.default_min_rating
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.geocoder.cache_ttl_seconds, 3600);
        assert_eq!(config.geocoder.cache_capacity, 100);
        assert_eq!(config.geocoder.min_interval_ms, 1000);
        assert_eq!(config.search.default_distance_miles, 3);
        assert_eq!(config.search.default_min_rating, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[geocoder]"));
        assert!(toml_str.contains("[listings]"));
        assert!(toml_str.contains("[search]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [geocoder]
            cache_capacity = 10
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.geocoder.cache_capacity, 10);

        assert_eq!(config.geocoder.cache_ttl_seconds, 3600);
        assert_eq!(config.listings.base_url, "https://uk.api.just-eat.io");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.geocoder.cache_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.default_min_rating = 6;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.listings.base_url.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_keeps_geocode_rate_ceiling() {
        let mut config = Config::default();
        config.geocoder.min_interval_ms = 0;
        assert!(config.validate().is_err());

        config.geocoder.min_interval_ms = 999;
        assert!(config.validate().is_err());

        config.geocoder.min_interval_ms = 1500;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "restaurant-finder-config-{}.toml",
            uuid::Uuid::new_v4()
        ));
        let mut config = Config::default();
        config.server.port = 9123;

        config.save_to_path(&path).unwrap();
        let loaded = Config::load_from_path(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.server.port, 9123);
    }
}
