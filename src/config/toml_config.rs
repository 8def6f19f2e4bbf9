use crate::domain::model::{DateRange, Endpoint, RunPlan};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_path, validate_range, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 執行設定檔 (`--config piwik-etl.toml`)，每個欄位都有預設值
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RunConfig {
    pub run: RunSection,
    pub http: HttpConfig,
    pub storage: LocalStorageSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunSection {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub endpoints: Vec<String>,
}

fn january_2021(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, day).unwrap_or(NaiveDate::MIN)
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            start_date: january_2021(1),
            end_date: january_2021(31),
            endpoints: Endpoint::ALL.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    /// 每次請求的總嘗試次數 (含第一次)
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            connect_timeout_seconds: 10,
            retry_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocalStorageSection {
    /// 本機模式下 `piwik-data/` 的上層目錄
    pub output_root: String,
}

impl Default for LocalStorageSection {
    fn default() -> Self {
        Self {
            output_root: ".".to_string(),
        }
    }
}

impl RunConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_ROOT})，找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn date_range(&self) -> Result<DateRange> {
        DateRange::new(self.run.start_date, self.run.end_date)
    }

    pub fn endpoints(&self) -> Result<Vec<Endpoint>> {
        self.run
            .endpoints
            .iter()
            .map(|name| {
                name.parse::<Endpoint>()
                    .map_err(|_| EtlError::InvalidConfigValueError {
                        field: "run.endpoints".to_string(),
                        value: name.clone(),
                        reason: "Unknown endpoint. Valid endpoints: sessions, events, query"
                            .to_string(),
                    })
            })
            .collect()
    }

    pub fn plan(&self) -> Result<RunPlan> {
        RunPlan::new(self.date_range()?, self.endpoints()?)
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        self.plan()?;

        validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 3600)?;
        validate_range(
            "http.connect_timeout_seconds",
            self.http.connect_timeout_seconds,
            1,
            300,
        )?;
        validate_range("http.retry_attempts", self.http.retry_attempts, 1, 10)?;
        validate_range("http.retry_delay_ms", self.http.retry_delay_ms, 0, 60_000)?;
        validate_path("storage.output_root", &self.storage.output_root)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_cover_january_2021_and_all_endpoints() {
        let config = RunConfig::default();
        let plan = config.plan().unwrap();

        assert_eq!(plan.range().num_days(), 31);
        assert_eq!(plan.endpoints(), &Endpoint::ALL);
        assert_eq!(config.http.retry_attempts, 3);
        assert_eq!(config.storage.output_root, ".");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_keeps_defaults() {
        let toml_content = r#"
[run]
start_date = "2021-02-01"
end_date = "2021-02-03"
endpoints = ["events"]

[http]
retry_attempts = 5
"#;

        let config = RunConfig::from_toml_str(toml_content).unwrap();
        let plan = config.plan().unwrap();

        assert_eq!(plan.range().num_days(), 3);
        assert_eq!(plan.endpoints(), &[Endpoint::Events]);
        assert_eq!(config.http.retry_attempts, 5);
        assert_eq!(config.http.timeout_seconds, 60);
    }

    #[test]
    fn test_unknown_endpoint_in_config_is_rejected() {
        let toml_content = r#"
[run]
endpoints = ["sessions", "analytics"]
"#;
        let config = RunConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, EtlError::InvalidConfigValueError { ref value, .. } if value == "analytics")
        );
    }

    #[test]
    fn test_inverted_range_fails_validation() {
        let toml_content = r#"
[run]
start_date = "2021-01-31"
end_date = "2021-01-01"
"#;
        let config = RunConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_retry_attempts() {
        let mut config = RunConfig::default();
        config.http.retry_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PIWIK_ETL_TEST_OUTPUT_ROOT", "/tmp/piwik-out");

        let toml_content = r#"
[storage]
output_root = "${PIWIK_ETL_TEST_OUTPUT_ROOT}"
"#;

        let config = RunConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.storage.output_root, "/tmp/piwik-out");

        std::env::remove_var("PIWIK_ETL_TEST_OUTPUT_ROOT");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = RunConfig::from_toml_str("[run\nstart_date = 1").unwrap_err();
        assert!(matches!(err, EtlError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[run]\nstart_date = \"2021-01-05\"\nend_date = \"2021-01-05\"\n")
            .unwrap();

        let config = RunConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.plan().unwrap().partition_count(), 3);
    }
}
