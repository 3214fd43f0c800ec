//! Single binary web server: REST API for uploading screenshots and reading EXP leaderboards.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! The OCR extraction backend is reached at BACKEND_URL (default http://localhost:5000).

use actix_web::{web::Data, App, HttpServer};
use exp_ledger::api::{self, AppData};
use exp_ledger::{AppConfig, HttpExtractionBackend};
use std::sync::Arc;
use std::time::Duration;

/// How often idle sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    let backend = HttpExtractionBackend::new(&config.backend_url, config.backend_timeout)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    log::info!("Extraction backend at {}", backend.process_url());

    let state = Data::new(AppData::new(Arc::new(backend)));

    // Background task: drop sessions that saw no activity for `session_idle`
    let state_cleanup = state.clone();
    let idle = config.session_idle;
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = state_cleanup.sweep_idle(idle);
            if removed > 0 {
                log::info!(
                    "Cleaned up {} inactive session(s) (no activity for {}h)",
                    removed,
                    idle.as_secs() / 3600
                );
            }
        }
    });

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await
}
