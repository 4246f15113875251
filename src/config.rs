//! Configuration for fund-temp.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::mapping::{default_entries, MappingEntry};
use crate::scraper;

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36"
        .to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Source addresses and projected fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_temperature_url")]
    pub temperature_url: String,
    #[serde(default = "default_fund_list_urls")]
    pub fund_list_urls: Vec<String>,
    /// First field is the trading code
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,
    #[serde(default = "default_listing_fields")]
    pub listing_fields: Vec<String>,
    #[serde(default = "default_company_url")]
    pub company_url: String,
    #[serde(default = "default_gauges_url")]
    pub gauges_url: String,
}

fn default_temperature_url() -> String {
    scraper::TEMPERATURE_URL.to_string()
}

fn default_fund_list_urls() -> Vec<String> {
    vec![
        scraper::etf_list_url(),
        scraper::qdii_list_url("A"),
        scraper::qdii_list_url("E"),
    ]
}

fn default_fields() -> Vec<String> {
    ["fund_id", "price", "increase_rt", "discount_rt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_listing_fields() -> Vec<String> {
    ["fund_id", "price", "increase_rt", "discount_rt", "volume"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_company_url() -> String {
    scraper::COMPANY_URL.to_string()
}

fn default_gauges_url() -> String {
    scraper::TEMPERATURE_URL.to_string()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            temperature_url: default_temperature_url(),
            fund_list_urls: default_fund_list_urls(),
            fields: default_fields(),
            listing_fields: default_listing_fields(),
            company_url: default_company_url(),
            gauges_url: default_gauges_url(),
        }
    }
}

/// Return thresholds in percent points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_low_return")]
    pub low_return: f64,
    #[serde(default = "default_high_return")]
    pub high_return: f64,
}

fn default_low_return() -> f64 {
    -1.0
}

fn default_high_return() -> f64 {
    1.0
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            low_return: default_low_return(),
            high_return: default_high_return(),
        }
    }
}

/// Fund company ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompaniesConfig {
    /// Minimum managed scale, unit 亿
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
}

fn default_min_scale() -> f64 {
    1000.0
}

impl Default for CompaniesConfig {
    fn default() -> Self {
        Self {
            min_scale: default_min_scale(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub companies: CompaniesConfig,
    #[serde(default = "default_entries")]
    pub funds: Vec<MappingEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            sources: SourcesConfig::default(),
            selection: SelectionConfig::default(),
            companies: CompaniesConfig::default(),
            funds: default_entries(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name("fund_temp").required(false),
        };

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(file)
            // Override with environment variables (FUNDTEMP_HTTP__TIMEOUT_SECS, etc.)
            .add_source(
                config::Environment::with_prefix("FUNDTEMP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
        assert_eq!(config.sources.fund_list_urls.len(), 3);
        assert_eq!(config.sources.fields[0], "fund_id");
        assert_eq!(config.selection.low_return, -1.0);
        assert_eq!(config.selection.high_return, 1.0);
        assert_eq!(config.funds.len(), 15);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"selection": {"low_return": -2.0}}"#).unwrap();
        assert_eq!(config.selection.low_return, -2.0);
        assert_eq!(config.selection.high_return, 1.0);
        assert_eq!(config.funds.len(), 15);
    }

    #[test]
    fn test_funds_table_from_json() {
        let config: AppConfig = serde_json::from_str(
            r#"{"funds": [{"id": "000905", "name": "中证500", "cn": "510500"}]}"#,
        )
        .unwrap();
        assert_eq!(config.funds.len(), 1);
        assert_eq!(config.funds[0].cw, "");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fund_temp.toml");
        std::fs::write(
            &path,
            r#"
[selection]
low_return = -2.5

[[funds]]
id = "000905"
name = "中证500"
cn = "510500"
cw = "160119"
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.selection.low_return, -2.5);
        assert_eq!(config.selection.high_return, 1.0);
        assert_eq!(config.funds.len(), 1);
        assert_eq!(config.funds[0].cw, "160119");
        assert_eq!(config.http.timeout_secs, 10);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(dir.path().join("absent.toml").as_path())).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fund_temp.toml");
        std::fs::write(&path, "[companies]\nmin_scale = 500.0\n").unwrap();

        // Only this test touches this variable
        std::env::set_var("FUNDTEMP_COMPANIES__MIN_SCALE", "250");
        let config = AppConfig::load(Some(path.as_path()));
        std::env::remove_var("FUNDTEMP_COMPANIES__MIN_SCALE");

        assert_eq!(config.unwrap().companies.min_scale, 250.0);
    }
}
