use crate::adapters::http::{build_http_client, Extractor, RetryPolicy, TokenProvider};
use crate::adapters::storage::OutputSink;
use crate::config::AppConfig;
use crate::core::{Pipeline, Sink, Token};
use crate::domain::model::{Endpoint, PartitionKey};
use crate::utils::error::Result;
use chrono::NaiveDate;
use serde_json::Value;

/// Piwik PRO 的 authenticate / extract / load 三個步驟
pub struct PiwikPipeline<S: Sink> {
    token_provider: TokenProvider,
    extractor: Extractor,
    sink: S,
}

impl<S: Sink> PiwikPipeline<S> {
    pub fn new(token_provider: TokenProvider, extractor: Extractor, sink: S) -> Self {
        Self {
            token_provider,
            extractor,
            sink,
        }
    }
}

impl PiwikPipeline<OutputSink> {
    /// 依設定組出 HTTP client、token provider、extractor 與輸出目的地
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let client = build_http_client(&config.run.http)?;
        let token_provider = TokenProvider::from_config(client.clone(), &config.api);
        let extractor =
            Extractor::from_config(client, &config.api, RetryPolicy::from(&config.run.http));
        let sink = OutputSink::from_config(config).await;

        Ok(Self::new(token_provider, extractor, sink))
    }
}

#[async_trait::async_trait]
impl<S: Sink> Pipeline for PiwikPipeline<S> {
    async fn authenticate(&self) -> Result<Token> {
        tracing::info!("🔑 Getting authentication token...");
        let token = self.token_provider.fetch_token().await?;
        tracing::info!("✅ Token obtained successfully");
        Ok(token)
    }

    async fn extract(&self, token: &Token, endpoint: Endpoint, date: NaiveDate) -> Result<Value> {
        // 單日擷取：date_from == date_to
        self.extractor.extract(endpoint, token, date, date).await
    }

    async fn load(&self, key: &PartitionKey, data: &Value) -> Result<bool> {
        self.sink.persist(data, key).await
    }
}
