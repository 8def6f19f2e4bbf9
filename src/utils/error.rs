use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    #[error("Extraction of {endpoint} for {date} failed: {message}")]
    ExtractionError {
        endpoint: String,
        date: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Storage write to {key} failed: {message}")]
    StorageError { key: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Extraction,
    Storage,
    Network,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 暫時性錯誤，重跑通常可以解決
    Medium,
    /// 處理中斷，已寫入的分區保留
    High,
    /// 設定或授權錯誤，不修正無法執行
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::AuthenticationError { .. } => ErrorCategory::Authentication,
            EtlError::ExtractionError { .. } => ErrorCategory::Extraction,
            EtlError::StorageError { .. } | EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Authentication => {
                ErrorSeverity::Critical
            }
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Extraction => match self {
                // 5xx 代表遠端暫時不可用
                EtlError::ExtractionError {
                    status: Some(code), ..
                } if *code >= 500 => ErrorSeverity::Medium,
                EtlError::ExtractionError { status: None, .. } => ErrorSeverity::Medium,
                _ => ErrorSeverity::High,
            },
            ErrorCategory::Storage | ErrorCategory::Data => ErrorSeverity::High,
        }
    }

    /// 依嚴重程度決定程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the .env file, environment variables and --config file, then run again"
            }
            ErrorCategory::Authentication => {
                "Verify AUTH_URL, CLIENT_ID and CLIENT_SECRET against the Piwik PRO API credentials"
            }
            ErrorCategory::Extraction => {
                "Re-run the same date range; partitions already written will be overwritten with identical data"
            }
            ErrorCategory::Storage => {
                "Check free disk space and write permissions of the output directory"
            }
            ErrorCategory::Network => "Check network connectivity to the analytics API and retry",
            ErrorCategory::Data => "The API returned data that could not be encoded as JSON",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingConfigError { field } => {
                format!("Required setting {} is not set", field)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting {} is invalid: {}", field, reason)
            }
            EtlError::AuthenticationError { .. } => {
                "Could not obtain an access token from the analytics API".to_string()
            }
            EtlError::ExtractionError { endpoint, date, .. } => {
                format!("Could not extract {} data for {}", endpoint, date)
            }
            EtlError::StorageError { key, .. } => format!("Could not save {}", key),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
