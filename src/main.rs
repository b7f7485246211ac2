use std::sync::Arc;

use sahayak_api::config::AppConfig;
use sahayak_api::database::connection::get_db_client;
use sahayak_api::database::user_repository::{MongoUserRepository, UserRepository};
use sahayak_api::routes::build_router;
use sahayak_api::services::otp_service::{OTPService, RandomOtpGenerator};
use sahayak_api::services::sms_service::{HttpSmsSender, LogSmsSender, SmsSender};
use sahayak_api::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let app_state = initialize_app_state(&config).await?;

    let app = build_router(app_state);
    start_server(app, &config).await
}

async fn initialize_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let db = get_db_client(config).await?;

    let repository = MongoUserRepository::new(db);
    if let Err(e) = repository.ensure_indexes().await {
        // Duplicate legacy documents block the unique index; keep serving.
        tracing::warn!("Failed to create users index: {}", e);
    }
    let users: Arc<dyn UserRepository> = Arc::new(repository);

    let sms: Arc<dyn SmsSender> = match &config.sms {
        Some(sms_config) => {
            tracing::info!("📨 SMS gateway enabled: {}", sms_config.gateway_url);
            Arc::new(HttpSmsSender::new(sms_config.clone(), config.otp_ttl_minutes))
        }
        None => {
            tracing::warn!("SMS_API_KEY not set, OTP delivery is stubbed");
            Arc::new(LogSmsSender)
        }
    };

    if config.expose_otp_in_response {
        tracing::warn!("⚠️ OTP codes are returned in API responses (demo mode)");
    }

    let otp_service = Arc::new(OTPService::new(
        users.clone(),
        Arc::new(RandomOtpGenerator),
        sms,
        config.otp_ttl(),
    ));

    Ok(AppState::new(users, otp_service).with_otp_exposure(config.expose_otp_in_response))
}

async fn start_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 Server starting on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
