use crate::config::{AppConfig, RunConfig, StorageMode};
use crate::utils::error::Result;
use chrono::NaiveDate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "piwik-etl")]
#[command(about = "Extract Piwik PRO analytics data into date-partitioned JSON files")]
pub struct CliConfig {
    /// Save files under ./piwik-data instead of uploading to S3
    #[arg(long)]
    pub local: bool,

    /// First day to extract (YYYY-MM-DD), overrides the config file
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last day to extract (YYYY-MM-DD), overrides the config file
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Path to a TOML file with run, http and storage settings
    #[arg(short, long)]
    pub config: Option<String>,

    /// Root directory for --local output, overrides the config file
    #[arg(long)]
    pub output_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage after each day")]
    pub monitor: bool,
}

impl CliConfig {
    pub fn storage_mode(&self) -> StorageMode {
        if self.local {
            StorageMode::Local
        } else {
            StorageMode::ObjectStore
        }
    }

    /// 套用設定檔後再以命令列參數覆寫
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut run = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };

        if let Some(start) = self.start_date {
            run.run.start_date = start;
        }
        if let Some(end) = self.end_date {
            run.run.end_date = end;
        }
        if let Some(dir) = &self.output_dir {
            run.storage.output_root = dir.clone();
        }

        Ok(run)
    }

    pub fn into_app_config(self) -> Result<AppConfig> {
        let run = self.run_config()?;
        AppConfig::from_env(run, self.storage_mode())
    }
}
