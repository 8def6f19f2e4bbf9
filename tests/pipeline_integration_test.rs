use httpmock::prelude::*;
use piwik_etl::config::{ApiConfig, RunConfig, StorageConfig};
use piwik_etl::utils::validation::Validate;
use piwik_etl::{AppConfig, EtlEngine, EtlError, PiwikPipeline, StorageMode};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

const EMPTY_ROWS: &str = "{\n  \"rows\": []\n}";

fn day(d: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
}

fn local_config(server: &MockServer, output_root: &Path, from: u32, to: u32) -> AppConfig {
    let mut run = RunConfig::default();
    run.run.start_date = day(from);
    run.run.end_date = day(to);
    run.http.retry_attempts = 1;
    run.http.retry_delay_ms = 0;
    run.storage.output_root = output_root.to_string_lossy().to_string();

    AppConfig {
        api: ApiConfig {
            auth_url: server.url("/auth/token"),
            base_url: server.url("/api/"),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            website_id: "site-123".to_string(),
        },
        storage: StorageConfig::default(),
        run,
        mode: StorageMode::Local,
    }
}

async fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/token")
                .json_body_partial(r#"{"grant_type": "client_credentials", "client_id": "client"}"#);
            then.status(200).json_body(json!({"access_token": "tok"}));
        })
        .await
}

async fn run(config: &AppConfig) -> piwik_etl::Result<piwik_etl::domain::model::RunSummary> {
    let pipeline = PiwikPipeline::from_config(config).await?;
    EtlEngine::new(pipeline, config.plan()?).run().await
}

#[tokio::test]
async fn test_local_run_writes_one_file_per_endpoint() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;
    let token_mock = mock_token(&server).await;

    let mut endpoint_mocks = Vec::new();
    for endpoint in ["sessions", "events", "query"] {
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(format!("/api/{}/", endpoint))
                    .header("authorization", "Bearer tok")
                    .header("content-type", "application/json")
                    .json_body_partial(
                        r#"{"website_id": "site-123", "date_from": "2021-01-01", "date_to": "2021-01-01"}"#,
                    );
                then.status(200).json_body(json!({"rows": []}));
            })
            .await;
        endpoint_mocks.push(mock);
    }

    let config = local_config(&server, temp_dir.path(), 1, 1);
    config.validate()?;
    let summary = run(&config).await?;

    token_mock.assert_hits_async(1).await;
    for mock in &endpoint_mocks {
        mock.assert_hits_async(1).await;
    }
    assert_eq!(summary.dates_processed, 1);
    assert_eq!(summary.partitions_written(), 3);
    assert_eq!(summary.partitions_skipped(), 0);

    for endpoint in ["sessions", "events", "query"] {
        let path = temp_dir
            .path()
            .join(format!("piwik-data/2021/01/01/{}.json", endpoint));
        assert_eq!(std::fs::read_to_string(path)?, EMPTY_ROWS);
    }
    Ok(())
}

#[tokio::test]
async fn test_token_failure_aborts_without_extraction() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/token");
            then.status(401).body("invalid_client");
        })
        .await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(POST).path_contains("/api/");
            then.status(200).json_body(json!({"rows": []}));
        })
        .await;

    let config = local_config(&server, temp_dir.path(), 1, 31);
    let err = run(&config).await.unwrap_err();

    assert!(matches!(err, EtlError::AuthenticationError { .. }));
    assert_eq!(err.exit_code(), 3);
    api_mock.assert_hits_async(0).await;
    assert!(!temp_dir.path().join("piwik-data").exists());
    Ok(())
}

#[tokio::test]
async fn test_extraction_failure_keeps_earlier_dates() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;
    mock_token(&server).await;

    let day_one = server
        .mock_async(|when, then| {
            when.method(POST)
                .path_contains("/api/")
                .json_body_partial(r#"{"date_from": "2021-01-01"}"#);
            then.status(200).json_body(json!({"rows": []}));
        })
        .await;
    let day_two = server
        .mock_async(|when, then| {
            when.method(POST)
                .path_contains("/api/")
                .json_body_partial(r#"{"date_from": "2021-01-02"}"#);
            then.status(500).body("upstream unavailable");
        })
        .await;
    let day_three = server
        .mock_async(|when, then| {
            when.method(POST)
                .path_contains("/api/")
                .json_body_partial(r#"{"date_from": "2021-01-03"}"#);
            then.status(200).json_body(json!({"rows": []}));
        })
        .await;

    let config = local_config(&server, temp_dir.path(), 1, 3);
    let err = run(&config).await.unwrap_err();

    match &err {
        EtlError::ExtractionError {
            endpoint,
            date,
            status,
            ..
        } => {
            assert_eq!(endpoint, "sessions");
            assert_eq!(date, "2021-01-02");
            assert_eq!(*status, Some(500));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    day_one.assert_hits_async(3).await;
    day_two.assert_hits_async(1).await;
    day_three.assert_hits_async(0).await;

    let root = temp_dir.path().join("piwik-data/2021/01");
    for endpoint in ["sessions", "events", "query"] {
        assert!(root.join(format!("01/{}.json", endpoint)).exists());
    }
    assert!(!root.join("02").exists());
    assert!(!root.join("03").exists());
    Ok(())
}

#[tokio::test]
async fn test_rerun_produces_identical_files() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;
    mock_token(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/events/");
            then.status(200)
                .json_body(json!({"data": [["2021-01-02", "page_view", 3]], "meta": {"count": 1}}));
        })
        .await;
    for endpoint in ["sessions", "query"] {
        server
            .mock_async(|when, then| {
                when.method(POST).path(format!("/api/{}/", endpoint));
                then.status(200).json_body(json!({"rows": []}));
            })
            .await;
    }

    let config = local_config(&server, temp_dir.path(), 2, 2);
    let events = temp_dir.path().join("piwik-data/2021/01/02/events.json");

    run(&config).await?;
    let first = std::fs::read_to_string(&events)?;
    run(&config).await?;
    let second = std::fs::read_to_string(&events)?;

    assert_eq!(first, second);
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&second)?["meta"]["count"],
        1
    );
    Ok(())
}
