use anyhow::Context;
use clap::Parser;
use position_groups::core::EntrySource;
use position_groups::utils::logger;
use position_groups::web::{router, AppState};
use position_groups::{CsvEntrySource, ForestLoader, LocalStorage, PredictionEngine, RandomForest, WebConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = WebConfig::parse();
    let settings = cli.settings()?;

    if settings.json_logs {
        logger::init_json_logger(settings.verbose);
    } else {
        logger::init_cli_logger(settings.verbose);
    }

    let records = CsvEntrySource::new(LocalStorage::new("."), settings.data_path.clone())
        .with_delimiter(settings.delimiter)
        .load()
        .await
        .with_context(|| format!("failed to load race entries from {}", settings.data_path))?;

    // Fail fast on a broken artifact; requests still reload it per prediction.
    RandomForest::from_file(&settings.model_path)
        .with_context(|| format!("failed to load model {}", settings.model_path))?;
    tracing::info!("Model {} is readable", settings.model_path);

    let engine = PredictionEngine::new(ForestLoader, settings.model_path.clone());
    let app = router(AppState::new(records, engine));

    let addr = settings.bind_address();
    tracing::info!("🚀 Prediction form listening on http://{}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
