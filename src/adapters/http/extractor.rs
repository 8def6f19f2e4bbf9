use crate::adapters::http::RetryPolicy;
use crate::config::ApiConfig;
use crate::domain::model::Endpoint;
use crate::domain::payload::ExtractionRequest;
use crate::domain::ports::Token;
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDate;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// 單次請求失敗的原因，決定是否值得重試
#[derive(Debug)]
enum AttemptFailure {
    Status { status: StatusCode, body: String },
    Transport(reqwest::Error),
    Decode(serde_json::Error),
}

impl AttemptFailure {
    fn is_transient(&self) -> bool {
        match self {
            AttemptFailure::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            // 讀取 body 中途逾時或斷線也算暫時性錯誤
            AttemptFailure::Transport(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            AttemptFailure::Decode(_) => false,
        }
    }

    fn status(&self) -> Option<u16> {
        match self {
            AttemptFailure::Status { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            AttemptFailure::Status { status, body } if body.is_empty() => {
                format!("API request failed with status: {}", status)
            }
            AttemptFailure::Status { status, body } => {
                format!("API request failed with status: {} ({})", status, body)
            }
            AttemptFailure::Transport(e) => format!("request error: {}", e),
            AttemptFailure::Decode(e) => format!("response is not valid JSON: {}", e),
        }
    }
}

/// 呼叫 `{base_url}{endpoint}/` 取得某端點某段日期的原始資料
pub struct Extractor {
    client: Client,
    base_url: String,
    website_id: String,
    retry: RetryPolicy,
}

impl Extractor {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        website_id: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            website_id: website_id.into(),
            retry,
        }
    }

    pub fn from_config(client: Client, config: &ApiConfig, retry: RetryPolicy) -> Self {
        Self::new(
            client,
            config.base_url.clone(),
            config.website_id.clone(),
            retry,
        )
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}/", self.base_url, endpoint)
    }

    pub async fn extract(
        &self,
        endpoint: Endpoint,
        token: &Token,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Value> {
        let url = self.endpoint_url(endpoint);
        let payload = ExtractionRequest::for_endpoint(endpoint, &self.website_id, date_from, date_to);

        let mut attempt = 1;
        loop {
            match self.send_once(&url, &payload, token).await {
                Ok(data) => return Ok(data),
                Err(failure) if failure.is_transient() && self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        "⚠️  {} for {} attempt {}/{} failed: {}, retrying in {:?}",
                        endpoint,
                        date_from,
                        attempt,
                        self.retry.max_attempts,
                        failure.describe(),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => {
                    return Err(EtlError::ExtractionError {
                        endpoint: endpoint.to_string(),
                        date: date_from.to_string(),
                        status: failure.status(),
                        message: format!(
                            "{} (after {} attempt(s))",
                            failure.describe(),
                            attempt
                        ),
                    });
                }
            }
        }
    }

    async fn send_once(
        &self,
        url: &str,
        payload: &ExtractionRequest,
        token: &Token,
    ) -> std::result::Result<Value, AttemptFailure> {
        tracing::debug!("Making API request to: {}", url);
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", token.as_str()))
            .json(payload)
            .send()
            .await
            .map_err(AttemptFailure::Transport)?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptFailure::Status {
                status,
                body: body.trim().chars().take(200).collect(),
            });
        }

        let body = response.bytes().await.map_err(AttemptFailure::Transport)?;
        serde_json::from_slice(&body).map_err(AttemptFailure::Decode)
    }
}
