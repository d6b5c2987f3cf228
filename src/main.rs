// Main entry point - Dependency injection and bot startup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use crate::application::consumption_service::ConsumptionService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::stromnetz_portal::StromNetzPortal;
use crate::infrastructure::telegram_client::TelegramClient;
use crate::presentation::app_state::AppState;
use crate::presentation::bot::run_polling;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meter_bot=info".into()),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create adapters (infrastructure layer)
    let portal = Arc::new(StromNetzPortal::new(
        config.portal.base_url.clone(),
        config.portal.email.clone(),
        config.portal.password.clone(),
        config.portal.history_days,
    ));
    let telegram = Arc::new(TelegramClient::new(
        &config.telegram.api_url,
        &config.telegram.bot_token,
    ));

    // Create services (application layer)
    let consumption_service = ConsumptionService::new(portal, config.timezone);

    // Create application state
    let state = AppState {
        consumption_service,
        chat: telegram.clone(),
        authorized_chat_id: config.telegram.authorized_chat_id,
        admin_chat_id: config.telegram.admin_chat_id,
        chart_width: config.chart_width,
        chart_height: config.chart_height,
    };

    tracing::info!(
        "Starting meter-bot for chat {} (timezone {})",
        config.telegram.authorized_chat_id,
        config.timezone
    );

    run_polling(&state, &telegram, config.telegram.poll_timeout_secs).await
}
