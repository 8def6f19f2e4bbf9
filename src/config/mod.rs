#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use env::{load_dotenv, ApiConfig, ManagedEnvironment, StorageConfig};
pub use toml_config::{HttpConfig, RunConfig};

use crate::domain::model::RunPlan;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

/// 本機檔案或物件儲存，一次執行只選一種
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Local,
    ObjectStore,
}

/// 程序啟動時組好一次，之後以參考傳給各元件
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub run: RunConfig,
    pub mode: StorageMode,
}

impl AppConfig {
    /// 從環境變數讀取 API 與儲存設定
    pub fn from_env(run: RunConfig, mode: StorageMode) -> Result<Self> {
        Ok(Self {
            api: ApiConfig::from_env()?,
            storage: StorageConfig::from_env(),
            run,
            mode,
        })
    }

    pub fn plan(&self) -> Result<RunPlan> {
        self.run.plan()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.run.validate()?;
        if self.mode == StorageMode::ObjectStore {
            self.storage.validate()?;
            if self.storage.bucket.is_none() {
                tracing::warn!("⚠️  S3_BUCKET is not set, uploads will be skipped");
            }
        }
        Ok(())
    }
}
