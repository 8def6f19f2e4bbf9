use crate::core::Pipeline;
use crate::domain::model::{Endpoint, PartitionKey, RunPlan, RunSummary, SkippedPartition};
use crate::utils::error::Result;
use crate::utils::monitor::ResourceMonitor;
use chrono::NaiveDate;
use std::fmt;

/// 執行狀態：Init → Authenticated → Extracting* → Done，任何致命錯誤轉為 Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Authenticated,
    Extracting { date: NaiveDate, endpoint: Endpoint },
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Init => f.write_str("init"),
            RunState::Authenticated => f.write_str("authenticated"),
            RunState::Extracting { date, endpoint } => {
                write!(f, "extracting({}, {})", date, endpoint)
            }
            RunState::Done => f.write_str("done"),
            RunState::Failed => f.write_str("failed"),
        }
    }
}

fn transition(state: &mut RunState, next: RunState) {
    tracing::debug!("State: {} → {}", state, next);
    *state = next;
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    plan: RunPlan,
    monitor_enabled: bool,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P, plan: RunPlan) -> Self {
        Self::new_with_monitoring(pipeline, plan, false)
    }

    pub fn new_with_monitoring(pipeline: P, plan: RunPlan, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            plan,
            monitor_enabled,
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// 依序處理所有 (date, endpoint)；擷取或本機寫入失敗會中止，已寫入的分區保留
    pub async fn run(&self) -> Result<RunSummary> {
        let mut state = RunState::Init;
        let result = self.drive(&mut state).await;

        match &result {
            Ok(_) => transition(&mut state, RunState::Done),
            Err(e) => {
                tracing::error!("❌ Run aborted while {}: {}", state, e);
                transition(&mut state, RunState::Failed);
            }
        }
        result
    }

    async fn drive(&self, state: &mut RunState) -> Result<RunSummary> {
        let mut monitor = ResourceMonitor::new(self.monitor_enabled);
        let range = self.plan.range();

        tracing::info!(
            "🚀 Starting Piwik ETL for {} ({} day(s) × {} endpoint(s))",
            range,
            range.num_days(),
            self.plan.endpoints().len()
        );

        let token = self.pipeline.authenticate().await?;
        transition(state, RunState::Authenticated);

        let mut summary = RunSummary::default();
        for date in range.days() {
            tracing::info!("📅 Processing data for {}...", date);

            for &endpoint in self.plan.endpoints() {
                transition(state, RunState::Extracting { date, endpoint });
                tracing::info!("  🔍 Extracting {} for {}...", endpoint, date);

                let data = self.pipeline.extract(&token, endpoint, date).await?;
                let key = PartitionKey::new(date, endpoint);

                if self.pipeline.load(&key, &data).await? {
                    summary.persisted.push(key);
                } else {
                    tracing::warn!(
                        date = %date,
                        endpoint = %endpoint,
                        key = %key,
                        "⚠️  Partition was not persisted, continuing with the next one"
                    );
                    summary.skipped.push(SkippedPartition {
                        date,
                        endpoint,
                        key,
                    });
                }
            }

            summary.dates_processed += 1;
            monitor.checkpoint(&date.to_string());
        }

        tracing::info!(
            "🎉 ETL completed: {} date(s), {} partition(s) written, {} skipped",
            summary.dates_processed,
            summary.partitions_written(),
            summary.partitions_skipped()
        );
        monitor.finish(summary.partitions_written());

        Ok(summary)
    }
}
