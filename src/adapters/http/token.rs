use crate::config::ApiConfig;
use crate::domain::ports::Token;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use serde::Serialize;

#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
}

/// 以 client credentials 換取 bearer token，每次執行只呼叫一次
pub struct TokenProvider {
    client: Client,
    auth_url: String,
    credentials: ClientCredentials,
}

impl TokenProvider {
    pub fn new(client: Client, auth_url: impl Into<String>, credentials: ClientCredentials) -> Self {
        Self {
            client,
            auth_url: auth_url.into(),
            credentials,
        }
    }

    pub fn from_config(client: Client, config: &ApiConfig) -> Self {
        Self::new(
            client,
            config.auth_url.clone(),
            ClientCredentials {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            },
        )
    }

    pub async fn fetch_token(&self) -> Result<Token> {
        let body = TokenRequest {
            grant_type: "client_credentials",
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
        };

        tracing::debug!("Requesting access token from: {}", self.auth_url);
        let response = self
            .client
            .post(&self.auth_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EtlError::AuthenticationError {
                message: format!("token request failed: {}", e),
            })?;

        let status = response.status();
        tracing::debug!("Token response status: {}", status);

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EtlError::AuthenticationError {
                message: format!("token endpoint returned {}: {}", status, detail.trim()),
            });
        }

        let json: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| EtlError::AuthenticationError {
                    message: format!("token response is not valid JSON: {}", e),
                })?;

        match json.get("access_token").and_then(|v| v.as_str()) {
            Some(token) if !token.is_empty() => Ok(Token::new(token)),
            _ => Err(EtlError::AuthenticationError {
                message: "token response has no access_token".to_string(),
            }),
        }
    }
}
