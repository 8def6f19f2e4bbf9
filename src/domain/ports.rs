use crate::domain::model::{Endpoint, PartitionKey};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

/// 存放 API 回應的目的地
///
/// `Ok(true)` 表示已寫入；`Ok(false)` 表示略過 (例如物件儲存上傳失敗)，
/// 呼叫端記錄後繼續下一個分區；`Err` 代表必須中止整次執行。
pub trait Sink: Send + Sync {
    fn persist(
        &self,
        data: &Value,
        key: &PartitionKey,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

/// Bearer token，不在 Debug 輸出中顯示內容
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(***)")
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn authenticate(&self) -> Result<Token>;
    async fn extract(&self, token: &Token, endpoint: Endpoint, date: NaiveDate) -> Result<Value>;
    async fn load(&self, key: &PartitionKey, data: &Value) -> Result<bool>;
}
