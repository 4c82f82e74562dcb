use loan_fraud_predictor::{
    api::{build_router, AppState},
    config::Config,
    ml::FraudPredictor,
    observability::init_tracing,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config.observability);

    tracing::info!(
        "Starting {} v{}",
        config.observability.service_name,
        env!("CARGO_PKG_VERSION")
    );

    // Artifacts are loaded once; any failure here aborts before serving.
    let predictor = match FraudPredictor::load(&config.artifacts) {
        Ok(predictor) => Arc::new(predictor),
        Err(e) => {
            tracing::error!(error_code = e.error_code(), "Failed to load model artifacts: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("✅ Predictor initialized");

    let app = build_router(AppState::new(predictor));

    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("🚀 HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Predict: POST http://{}/v1/predict", http_addr);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
