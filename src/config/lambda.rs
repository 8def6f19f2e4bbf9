use crate::config::{AppConfig, RunConfig, StorageMode};
use crate::domain::model::RunSummary;
use crate::utils::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lambda 事件；沒給的日期沿用預設區間
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LambdaRequest {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl LambdaRequest {
    pub fn run_config(&self) -> RunConfig {
        let mut run = RunConfig::default();
        if let Some(start) = self.start_date {
            run.run.start_date = start;
        }
        if let Some(end) = self.end_date {
            run.run.end_date = end;
        }
        run
    }

    /// Lambda 一律上傳到物件儲存
    pub fn into_app_config(self) -> Result<AppConfig> {
        AppConfig::from_env(self.run_config(), StorageMode::ObjectStore)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LambdaResponse {
    pub message: String,
    pub dates_processed: usize,
    pub partitions_written: usize,
    pub partitions_skipped: usize,
}

impl From<&RunSummary> for LambdaResponse {
    fn from(summary: &RunSummary) -> Self {
        Self {
            message: "ETL process completed successfully".to_string(),
            dates_processed: summary.dates_processed,
            partitions_written: summary.partitions_written(),
            partitions_skipped: summary.partitions_skipped(),
        }
    }
}
