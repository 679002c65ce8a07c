use std::io;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{error, info, warn};

use wage_backend::{routes, AppConfig, PredictionService};

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("🚀 Starting wage prediction API");

    let config = AppConfig::from_env().map_err(|e| {
        error!("{}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    if config.google_api_key.is_some() {
        info!("🔑 GOOGLE_API_KEY is set (not used for scoring)");
    } else {
        warn!("⚠️  GOOGLE_API_KEY is not set");
    }

    // Loaded once; every worker shares the same read-only artifact.
    let service = PredictionService::from_config(&config).map_err(|e| {
        error!("❌ Cannot load model {}: {:#}", config.model_path.display(), e);
        io::Error::other(format!("{e:#}"))
    })?;
    info!(
        "✅ Model loaded: {} (schema={}, log_target={})",
        config.model_path.display(),
        config.schema,
        config.log_target
    );

    let service = web::Data::new(service);
    let bind_address = config.bind_address();

    info!("🌐 Server listening on: http://{}", bind_address);
    info!("👷 Workers: {}", config.workers);
    info!("🔧 API endpoints:");
    info!("   GET  /               - liveness");
    info!("   GET  /model-info     - loaded artifact");
    info!("   POST /predict        - single prediction");
    info!("   POST /predict/batch  - batch prediction");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(service.clone())
            .configure(routes::configure)
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await
}
