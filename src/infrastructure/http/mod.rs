pub mod request_id;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{health, session::SessionController, voices::VoiceController};
use crate::domain::session::ProviderStatus;
use crate::infrastructure::config::Config;

/// Build the application router with all routes configured
pub fn build_router(
    provider_status: ProviderStatus,
    session_controller: Arc<SessionController>,
    voice_controller: Arc<VoiceController>,
    config: &Config,
) -> Router {
    // Session actions, one route per button
    let session_routes = Router::new()
        .route("/api/session", get(SessionController::get_session))
        .route(
            "/api/session/credential",
            put(SessionController::set_credential),
        )
        .route("/api/session/generate", post(SessionController::generate))
        .route(
            "/api/session/regenerate",
            post(SessionController::regenerate),
        )
        .route("/api/session/reject", post(SessionController::reject))
        .route(
            "/api/session/clear-text",
            post(SessionController::clear_text),
        )
        .route("/api/session/save", post(SessionController::save))
        .route("/api/session/audio", get(SessionController::download))
        .route("/api/session/history", get(SessionController::history))
        .with_state(session_controller);

    // Provider catalogue
    let voice_routes = Router::new()
        .route("/api/voices", get(VoiceController::list_voices))
        .route("/api/models", get(VoiceController::list_models))
        .with_state(voice_controller);

    let app = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(provider_status)
        .merge(session_routes)
        .merge(voice_routes);

    // A browser front-end served from elsewhere needs CORS while developing
    let app = if config.is_development() {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(request_id_middleware)),
    )
}

/// Start the HTTP server
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
