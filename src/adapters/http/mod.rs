pub mod extractor;
pub mod retry;
pub mod token;

pub use extractor::Extractor;
pub use retry::RetryPolicy;
pub use token::{ClientCredentials, TokenProvider};

use crate::config::HttpConfig;
use crate::utils::error::Result;
use reqwest::Client;

/// 建立共用的 HTTP client，連線與整體逾時都明確設定
pub fn build_http_client(config: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .connect_timeout(config.connect_timeout())
        .timeout(config.timeout())
        .user_agent(concat!("piwik-etl/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
