use clap::Parser;
use piwik_etl::config::load_dotenv;
use piwik_etl::utils::error::EtlError;
use piwik_etl::utils::{logger, validation::Validate};
use piwik_etl::{CliConfig, EtlEngine, PiwikPipeline};

fn exit_with(e: &EtlError) -> ! {
    tracing::error!(
        "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() {
    // .env 不存在時直接使用行程環境變數
    let dotenv = load_dotenv();

    let cli = CliConfig::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting piwik-etl CLI");
    match &dotenv {
        Ok(Some(path)) => tracing::debug!("Loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(e) => tracing::warn!("⚠️  {}", e),
    }
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let monitor_enabled = cli.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let config = match cli.into_app_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let plan = match config.plan() {
        Ok(plan) => plan,
        Err(e) => exit_with(&e),
    };

    let pipeline = match PiwikPipeline::from_config(&config).await {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(&e),
    };

    let engine = EtlEngine::new_with_monitoring(pipeline, plan, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            println!("✅ ETL process completed successfully!");
            println!(
                "📁 {} date(s) processed, {} partition(s) written",
                summary.dates_processed,
                summary.partitions_written()
            );
            if !summary.skipped.is_empty() {
                println!("⚠️  {} partition(s) skipped:", summary.partitions_skipped());
                for skipped in &summary.skipped {
                    println!("   - {}", skipped.key);
                }
            }
        }
        Err(e) => exit_with(&e),
    }
}
