//! Centralized configuration management for dartzip

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the OpenDART API
    pub base_url: String,
    /// Directory under which per-company output folders are created
    pub output_root: PathBuf,
    /// Directory holding the cached company master
    pub cache_dir: PathBuf,
    /// Company master cache lifetime in days
    pub corp_cache_ttl_days: u64,
    /// Maximum number of search candidates shown
    pub max_candidates: usize,
    /// Keep archives that already exist on disk instead of downloading again
    pub skip_existing: bool,
    /// Rate limiting configuration
    pub rate_limits: RateLimits,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// Rate limiting configuration for the OpenDART API
#[derive(Debug, Clone)]
pub struct RateLimits {
    /// Delay between disclosure list pages (milliseconds)
    pub list_page_delay_ms: u64,
    /// Delay between document downloads (milliseconds)
    pub download_delay_ms: u64,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

pub const DEFAULT_BASE_URL: &str = "https://opendart.fss.or.kr";

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            list_page_delay_ms: 150,
            download_delay_ms: 350,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            user_agent: "dartzip/0.1.0".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_root: PathBuf::from("."),
            cache_dir: PathBuf::from("_dart_cache"),
            corp_cache_ttl_days: 30,
            max_candidates: 200,
            skip_existing: false,
            rate_limits: RateLimits::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let base_url = std::env::var("DART_BASE_URL")
            .unwrap_or(defaults.base_url)
            .trim_end_matches('/')
            .to_string();

        let output_root = std::env::var("DART_OUTPUT_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_root);

        let cache_dir = std::env::var("DART_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.cache_dir);

        let rate_limits = RateLimits {
            list_page_delay_ms: parse_env_var("DART_LIST_PAGE_DELAY_MS")?
                .unwrap_or(defaults.rate_limits.list_page_delay_ms),
            download_delay_ms: parse_env_var("DART_DOWNLOAD_DELAY_MS")?
                .unwrap_or(defaults.rate_limits.download_delay_ms),
        };

        let http = HttpConfig {
            timeout_seconds: parse_env_var("DART_HTTP_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.http.timeout_seconds),
            user_agent: std::env::var("DART_USER_AGENT").unwrap_or(defaults.http.user_agent),
        };

        Ok(Config {
            base_url,
            output_root,
            cache_dir,
            corp_cache_ttl_days: parse_env_var("DART_CORP_CACHE_TTL_DAYS")?
                .unwrap_or(defaults.corp_cache_ttl_days),
            max_candidates: parse_env_var("DART_MAX_CANDIDATES")?
                .unwrap_or(defaults.max_candidates),
            skip_existing: parse_env_var("DART_SKIP_EXISTING")?
                .unwrap_or(defaults.skip_existing),
            rate_limits,
            http,
        })
    }

    /// Get list page delay as Duration
    pub fn list_page_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limits.list_page_delay_ms)
    }

    /// Get download delay as Duration
    pub fn download_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limits.download_delay_ms)
    }

    /// Get company master cache lifetime as Duration
    pub fn corp_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.corp_cache_ttl_days.saturating_mul(24 * 3600))
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "DART_BASE_URL must be an http(s) URL: {}",
                self.base_url
            ));
        }

        if self.max_candidates == 0 {
            return Err(anyhow::anyhow!("DART_MAX_CANDIDATES must be at least 1"));
        }

        std::fs::create_dir_all(&self.cache_dir)
            .with_context(|| format!("Cannot create cache directory: {}", self.cache_dir.display()))?;

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.trim().parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.output_root, PathBuf::from("."));
        assert_eq!(config.corp_cache_ttl_days, 30);
        assert_eq!(config.max_candidates, 200);
        assert!(!config.skip_existing);
        assert_eq!(config.list_page_delay(), Duration::from_millis(150));
        assert_eq!(config.download_delay(), Duration::from_millis(350));
        assert_eq!(config.http_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_validation() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            cache_dir: temp_dir.path().join("cache"),
            ..Config::default()
        };
        config.validate().unwrap();
        assert!(config.cache_dir.exists());

        let bad_url = Config {
            base_url: "opendart.fss.or.kr".to_string(),
            cache_dir: temp_dir.path().join("cache"),
            ..Config::default()
        };
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_huge_cache_ttl_saturates() {
        let config = Config {
            corp_cache_ttl_days: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.corp_cache_ttl(), Duration::from_secs(u64::MAX));

        let week = Config {
            corp_cache_ttl_days: 7,
            ..Config::default()
        };
        assert_eq!(week.corp_cache_ttl(), Duration::from_secs(7 * 24 * 3600));
    }

    #[test]
    fn test_parse_env_var_missing_is_none() {
        let parsed: Option<u64> = parse_env_var("DARTZIP_TEST_UNSET_VARIABLE").unwrap();
        assert!(parsed.is_none());
    }
}
