/// Actix-web HTTP server for the Synchronization API
///
/// Endpoints:
/// - GET /health - Health check
/// - /api/v1/{watchlist|favorites} - Title collections
/// - /api/v1/favorite-actors - Favorite actors
/// - /api/v1/history - Watch history
use crate::auth::JwtVerifier;
use crate::error::ApiError;
use crate::repository::CollectionRepository;
use crate::routes;
use actix_web::{error::JsonPayloadError, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use cinehub_core::ServiceConfig;
use std::sync::Arc;
use tracing::info;

/// Server state shared across handlers
pub struct AppState {
    pub repository: Arc<dyn CollectionRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn CollectionRepository>) -> Self {
        Self { repository }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let database = state.repository.is_healthy().await;
    let body = serde_json::json!({
        "status": if database { "healthy" } else { "degraded" },
        "service": "cinehub-api",
        "version": env!("CARGO_PKG_VERSION")
    });

    if database {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// Malformed bodies are reported in the same JSON shape as validation failures
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}

/// Register shared state and all routes on an `App`
pub fn configure(
    state: web::Data<AppState>,
    verifier: web::Data<JwtVerifier>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(state)
            .app_data(verifier)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/health", web::get().to(health_check))
            .configure(routes::configure);
    }
}

/// Start the HTTP server
pub async fn start_server(
    config: &ServiceConfig,
    repository: Arc<dyn CollectionRepository>,
    verifier: JwtVerifier,
) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(repository));
    let verifier = web::Data::new(verifier);

    info!(
        "Starting CineHub API on {}:{} with {} workers",
        config.host, config.port, config.workers
    );

    HttpServer::new(move || {
        App::new().configure(configure(state.clone(), verifier.clone()))
    })
    .workers(config.workers)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
