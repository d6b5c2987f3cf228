// Telegram update polling and command dispatch
use crate::infrastructure::telegram_client::{TelegramClient, Update};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers;
use std::time::Duration;

/// Pause after a failed poll before asking Telegram again
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    GetConsumption,
}

/// Recognize `/get_consumption` without arguments, optionally addressed as
/// `/get_consumption@botname`
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let mut words = text.split_whitespace();
    let command = words.next()?.strip_prefix('/')?;
    if words.next().is_some() {
        return None;
    }
    let name = command.split('@').next()?;
    match name {
        "get_consumption" => Some(BotCommand::GetConsumption),
        _ => None,
    }
}

/// Handle one update to completion
pub async fn dispatch(state: &AppState, update: Update) {
    let Some(message) = update.message else {
        return;
    };
    let Some(command) = message.text.as_deref().and_then(parse_command) else {
        tracing::debug!("Ignoring update {} without a known command", update.update_id);
        return;
    };

    match command {
        BotCommand::GetConsumption => {
            if let Err(e) = handlers::get_consumption(state, message.chat.id).await {
                tracing::warn!(
                    "get_consumption for chat {} ended early: {}",
                    message.chat.id,
                    e
                );
            }
        }
    }
}

/// Poll Telegram until Ctrl-C, processing updates strictly one after another
pub async fn run_polling(
    state: &AppState,
    telegram: &TelegramClient,
    poll_timeout_secs: u64,
) -> anyhow::Result<()> {
    let mut offset: Option<i64> = None;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let polled = tokio::select! {
            result = &mut shutdown => {
                result?;
                tracing::info!("Shutdown signal received, stopping bot");
                return Ok(());
            }
            polled = telegram.get_updates(offset, poll_timeout_secs) => polled,
        };

        match polled {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    dispatch(state, update).await;
                }
            }
            Err(e) => {
                tracing::warn!("Polling Telegram failed: {:#}", e);
                tokio::time::sleep(POLL_ERROR_PAUSE).await;
            }
        }
    }
}
