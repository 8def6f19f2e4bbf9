use crate::utils::error::{EtlError, Result};
use std::path::{Path, PathBuf};
use crate::utils::validation::{
    validate_aws_region, validate_base_url, validate_non_empty_string, validate_s3_bucket_name,
    validate_url, Validate,
};

/// API 連線與授權設定，全部來自環境變數
#[derive(Clone)]
pub struct ApiConfig {
    pub auth_url: String,
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub website_id: String,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| EtlError::MissingConfigError {
                    field: name.to_string(),
                })
        };

        Ok(Self {
            auth_url: required("AUTH_URL")?,
            base_url: required("BASE_URL")?,
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            website_id: required("WEBSITE_ID")?,
        })
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("auth_url", &self.auth_url)
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("website_id", &self.website_id)
            .finish()
    }
}

impl Validate for ApiConfig {
    fn validate(&self) -> Result<()> {
        validate_url("AUTH_URL", &self.auth_url)?;
        validate_base_url("BASE_URL", &self.base_url)?;
        validate_non_empty_string("CLIENT_ID", &self.client_id)?;
        validate_non_empty_string("CLIENT_SECRET", &self.client_secret)?;
        validate_non_empty_string("WEBSITE_ID", &self.website_id)?;
        Ok(())
    }
}

/// 託管執行環境 (角色憑證由平台提供)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagedEnvironment {
    Lambda,
    Container,
}

impl ManagedEnvironment {
    pub fn detect<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| lookup(name).is_some_and(|v| !v.trim().is_empty());

        if present("AWS_LAMBDA_FUNCTION_NAME") {
            Some(ManagedEnvironment::Lambda)
        } else if present("AWS_CONTAINER_CREDENTIALS_RELATIVE_URI")
            || present("AWS_CONTAINER_CREDENTIALS_FULL_URI")
        {
            Some(ManagedEnvironment::Container)
        } else {
            None
        }
    }
}

/// 物件儲存設定；bucket 可缺省 (缺省時上傳一律略過)
#[derive(Clone, Default)]
pub struct StorageConfig {
    pub bucket: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub managed: Option<ManagedEnvironment>,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            bucket: optional("S3_BUCKET"),
            access_key_id: optional("AWS_ACCESS_KEY_ID"),
            secret_access_key: optional("AWS_SECRET_ACCESS_KEY"),
            region: optional("AWS_REGION").or_else(|| optional("AWS_DEFAULT_REGION")),
            endpoint_url: optional("S3_ENDPOINT_URL"),
            managed: ManagedEnvironment::detect(&lookup),
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("managed", &self.managed)
            .finish()
    }
}

impl Validate for StorageConfig {
    fn validate(&self) -> Result<()> {
        if let Some(bucket) = &self.bucket {
            validate_s3_bucket_name("S3_BUCKET", bucket)?;
        }
        if let Some(region) = &self.region {
            validate_aws_region("AWS_REGION", region)?;
        }
        if let Some(endpoint) = &self.endpoint_url {
            validate_url("S3_ENDPOINT_URL", endpoint)?;
        }
        Ok(())
    }
}

/// 載入 `.env`；檔案不存在不算錯誤，內容無法解析則回傳 `ConfigError`
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    interpret_dotenv(dotenvy::dotenv())
}

pub fn load_dotenv_from(path: &Path) -> Result<Option<PathBuf>> {
    interpret_dotenv(dotenvy::from_path(path).map(|_| path.to_path_buf()))
}

fn interpret_dotenv(result: dotenvy::Result<PathBuf>) -> Result<Option<PathBuf>> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(EtlError::ConfigError {
            message: format!(".env file could not be loaded: {}", e),
        }),
    }
}
