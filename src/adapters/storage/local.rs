use crate::domain::model::PartitionKey;
use crate::domain::ports::Sink;
use crate::utils::error::{EtlError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// 把 JSON 寫到 `{root}/{key}`，失敗即中止整次執行
#[derive(Debug, Clone)]
pub struct LocalSink {
    root: PathBuf,
}

impl LocalSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &PartitionKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    async fn write(&self, data: &Value, key: &PartitionKey) -> Result<PathBuf> {
        let full_path = self.path_for(key);
        let storage_error = |e: std::io::Error| EtlError::StorageError {
            key: key.to_string(),
            message: format!("{}: {}", full_path.display(), e),
        };

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(storage_error)?;
        }

        let json = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&full_path, json)
            .await
            .map_err(storage_error)?;

        Ok(full_path)
    }
}

impl Sink for LocalSink {
    async fn persist(&self, data: &Value, key: &PartitionKey) -> Result<bool> {
        let path = self.write(data, key).await?;
        tracing::info!("  💾 Saved data to {}", path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Endpoint;
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::TempDir;

    fn key(endpoint: Endpoint) -> PartitionKey {
        PartitionKey::new(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(), endpoint)
    }

    #[tokio::test]
    async fn test_persist_creates_directories_and_pretty_prints() {
        let temp_dir = TempDir::new().unwrap();
        let sink = LocalSink::new(temp_dir.path());

        let written = sink
            .persist(&json!({"rows": []}), &key(Endpoint::Sessions))
            .await
            .unwrap();

        assert!(written);
        let path = temp_dir.path().join("piwik-data/2021/01/01/sessions.json");
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "{\n  \"rows\": []\n}");
    }

    #[tokio::test]
    async fn test_persist_twice_is_idempotent_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let sink = LocalSink::new(temp_dir.path());
        let key = key(Endpoint::Events);

        sink.persist(&json!({"rows": [1, 2, 3]}), &key).await.unwrap();
        sink.persist(&json!({"rows": [1]}), &key).await.unwrap();
        let first = std::fs::read_to_string(sink.path_for(&key)).unwrap();
        sink.persist(&json!({"rows": [1]}), &key).await.unwrap();
        let second = std::fs::read_to_string(sink.path_for(&key)).unwrap();

        assert_eq!(first, second);
        assert_eq!(serde_json::from_str::<Value>(&second).unwrap(), json!({"rows": [1]}));
    }

    #[tokio::test]
    async fn test_unwritable_location_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        // piwik-data 是檔案而不是目錄，無法建立子目錄
        std::fs::write(temp_dir.path().join("piwik-data"), b"").unwrap();
        let sink = LocalSink::new(temp_dir.path());

        let err = sink
            .persist(&json!({}), &key(Endpoint::Query))
            .await
            .unwrap_err();

        match err {
            EtlError::StorageError { key, .. } => {
                assert_eq!(key, "piwik-data/2021/01/01/query.json")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
