use crate::config::{ManagedEnvironment, StorageConfig};
use crate::domain::model::PartitionKey;
use crate::domain::ports::Sink;
use crate::utils::error::Result;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use serde_json::Value;

/// S3 憑證來源，啟動時決定一次
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// 平台提供的角色憑證 (Lambda / ECS)
    ManagedRole(ManagedEnvironment),
    Explicit {
        access_key_id: String,
        secret_access_key: String,
    },
    DefaultChain,
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::ManagedRole(env) => f.debug_tuple("ManagedRole").field(env).finish(),
            CredentialSource::Explicit { access_key_id, .. } => f
                .debug_struct("Explicit")
                .field("access_key_id", access_key_id)
                .finish_non_exhaustive(),
            CredentialSource::DefaultChain => f.write_str("DefaultChain"),
        }
    }
}

/// 託管環境優先；其次是成對且非空白的 access key；最後交給 SDK 預設鏈
pub fn resolve_credential_source(config: &StorageConfig) -> CredentialSource {
    if let Some(managed) = config.managed {
        return CredentialSource::ManagedRole(managed);
    }

    match (&config.access_key_id, &config.secret_access_key) {
        (Some(key), Some(secret)) if !key.trim().is_empty() && !secret.trim().is_empty() => {
            CredentialSource::Explicit {
                access_key_id: key.clone(),
                secret_access_key: secret.clone(),
            }
        }
        _ => CredentialSource::DefaultChain,
    }
}

/// 依設定建立 S3 client；`S3_ENDPOINT_URL` 存在時改用 path-style 位址
pub async fn build_s3_client(config: &StorageConfig, max_attempts: u32) -> S3Client {
    let source = resolve_credential_source(config);
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .retry_config(RetryConfig::standard().with_max_attempts(max_attempts.max(1)));

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }

    loader = match &source {
        CredentialSource::ManagedRole(ManagedEnvironment::Lambda) => {
            tracing::info!("🔒 Using Lambda execution role for S3 access");
            loader.credentials_provider(
                aws_config::environment::credentials::EnvironmentVariableCredentialsProvider::new(),
            )
        }
        CredentialSource::ManagedRole(ManagedEnvironment::Container) => {
            tracing::info!("🔒 Using container task role for S3 access");
            loader.credentials_provider(aws_config::ecs::EcsCredentialsProvider::builder().build())
        }
        CredentialSource::Explicit {
            access_key_id,
            secret_access_key,
        } => {
            tracing::info!("🔑 Using explicit AWS credentials");
            loader.credentials_provider(Credentials::new(
                access_key_id.clone(),
                secret_access_key.clone(),
                None,
                None,
                "piwik-etl-environment",
            ))
        }
        CredentialSource::DefaultChain => {
            tracing::info!("🔒 Using default AWS credential chain for S3 access");
            loader
        }
    };

    let shared = loader.load().await;
    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(endpoint) = &config.endpoint_url {
        builder = builder.endpoint_url(endpoint.clone()).force_path_style(true);
    }

    S3Client::from_conf(builder.build())
}

/// 上傳到 `s3://{bucket}/{key}`；沒有 bucket 或上傳失敗都回傳 `Ok(false)`
#[derive(Debug, Clone)]
pub struct ObjectStoreSink {
    target: Option<(S3Client, String)>,
}

impl ObjectStoreSink {
    pub fn new(client: S3Client, bucket: Option<String>) -> Self {
        let target = bucket
            .filter(|b| !b.trim().is_empty())
            .map(|bucket| (client, bucket));
        Self { target }
    }

    /// 沒有 bucket 時不建立 S3 client，也不做任何網路呼叫
    pub fn without_bucket() -> Self {
        Self { target: None }
    }

    pub fn bucket(&self) -> Option<&str> {
        self.target.as_ref().map(|(_, bucket)| bucket.as_str())
    }
}

impl Sink for ObjectStoreSink {
    async fn persist(&self, data: &Value, key: &PartitionKey) -> Result<bool> {
        let Some((client, bucket)) = &self.target else {
            tracing::warn!("⚠️  No S3 bucket configured, skipping upload of {}", key);
            return Ok(false);
        };

        let body = serde_json::to_vec_pretty(data)?;
        let result = client
            .put_object()
            .bucket(bucket)
            .key(key.as_str())
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!("  ☁️  Uploaded data to s3://{}/{}", bucket, key);
                Ok(true)
            }
            Err(err) => {
                let err = aws_sdk_s3::error::DisplayErrorContext(err);
                tracing::error!(
                    bucket = %bucket,
                    key = %key,
                    "❌ Failed to upload to S3: {}",
                    err
                );
                Ok(false)
            }
        }
    }
}
