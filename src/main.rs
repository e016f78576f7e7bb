use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use speechdesk::controllers::{session::SessionController, voices::VoiceController};
use speechdesk::domain::session::SessionService;
use speechdesk::infrastructure::config::{Config, LogFormat};
use speechdesk::infrastructure::http::{build_router, start_http_server};
use speechdesk::infrastructure::repositories::{ClipRepository, ElevenLabsProviderFactory};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!("Starting speechdesk on {}:{}", config.host, config.port);

    if config.elevenlabs_api_key.is_none() {
        tracing::warn!("No ElevenLabs API key in ELEVENLABS_API_KEY or the secrets file. Set one through PUT /api/session/credential.");
    }

    tracing::info!(
        base_url = %config.elevenlabs_base_url,
        model = %config.default_model,
        output_format = %config.output_format,
        outputs_dir = %config.outputs_dir.display(),
        "Speech provider configuration loaded"
    );

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories
    let provider_factory = Arc::new(ElevenLabsProviderFactory::new(
        config.elevenlabs_base_url.clone(),
    ));
    let clip_repo = Arc::new(ClipRepository::new(config.outputs_dir.clone()));

    // 2. Instantiate the session
    let session = SessionService::new(
        provider_factory,
        clip_repo,
        config.output_format.clone(),
        config.elevenlabs_api_key.clone(),
    );
    let provider_status = session.provider_status();
    let session = Arc::new(Mutex::new(session));

    // 3. Instantiate controllers
    let session_controller = Arc::new(SessionController::new(
        session.clone(),
        config.default_model,
        config.pronunciation_dictionary_path.clone(),
        config.pronunciation_dictionary_name.clone(),
        config.history_display_limit,
    ));
    let voice_controller = Arc::new(VoiceController::new(session.clone(), config.default_model));

    // Start HTTP server with all routes
    let app = build_router(provider_status, session_controller, voice_controller, &config);
    start_http_server(config, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "speechdesk=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "speechdesk=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
