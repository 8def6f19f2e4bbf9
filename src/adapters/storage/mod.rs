pub mod local;
pub mod s3;

pub use local::LocalSink;
pub use s3::{build_s3_client, resolve_credential_source, CredentialSource, ObjectStoreSink};

use crate::config::{AppConfig, StorageMode};
use crate::domain::model::PartitionKey;
use crate::domain::ports::Sink;
use crate::utils::error::Result;
use serde_json::Value;

/// 執行期由 `--local` 決定的輸出目的地
#[derive(Debug, Clone)]
pub enum OutputSink {
    Local(LocalSink),
    ObjectStore(ObjectStoreSink),
}

impl OutputSink {
    pub async fn from_config(config: &AppConfig) -> Self {
        match config.mode {
            StorageMode::Local => {
                let sink = LocalSink::new(&config.run.storage.output_root);
                tracing::info!(
                    "🗂️  Storage mode: local ({})",
                    sink.root().join(crate::domain::model::PARTITION_ROOT).display()
                );
                OutputSink::Local(sink)
            }
            StorageMode::ObjectStore => match &config.storage.bucket {
                Some(bucket) => {
                    let client =
                        build_s3_client(&config.storage, config.run.http.retry_attempts).await;
                    tracing::info!("🗂️  Storage mode: S3 (bucket: {})", bucket);
                    OutputSink::ObjectStore(ObjectStoreSink::new(client, Some(bucket.clone())))
                }
                None => {
                    tracing::warn!("🗂️  Storage mode: S3 without bucket, uploads will be skipped");
                    OutputSink::ObjectStore(ObjectStoreSink::without_bucket())
                }
            },
        }
    }
}

impl Sink for OutputSink {
    async fn persist(&self, data: &Value, key: &PartitionKey) -> Result<bool> {
        match self {
            OutputSink::Local(sink) => sink.persist(data, key).await,
            OutputSink::ObjectStore(sink) => sink.persist(data, key).await,
        }
    }
}
