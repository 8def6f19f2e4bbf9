use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use piwik_etl::config::lambda::{LambdaRequest, LambdaResponse};
use piwik_etl::utils::{logger, validation::Validate};
use piwik_etl::{EtlEngine, EtlError, PiwikPipeline};

fn into_lambda_error(e: EtlError) -> Error {
    tracing::error!(
        "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    Box::new(e)
}

async fn run_etl(request: LambdaRequest) -> piwik_etl::Result<LambdaResponse> {
    let config = request.into_app_config()?;
    config.validate()?;

    let plan = config.plan()?;
    let pipeline = PiwikPipeline::from_config(&config).await?;
    let summary = EtlEngine::new(pipeline, plan).run().await?;

    Ok(LambdaResponse::from(&summary))
}

async fn function_handler(event: LambdaEvent<LambdaRequest>) -> Result<LambdaResponse, Error> {
    tracing::info!("Starting Piwik ETL Lambda function");

    let response = run_etl(event.payload).await.map_err(into_lambda_error)?;

    tracing::info!(
        dates_processed = response.dates_processed,
        partitions_written = response.partitions_written,
        partitions_skipped = response.partitions_skipped,
        "ETL Lambda function completed successfully"
    );
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
