// Shared state handed to the bot command handlers
use crate::application::chat_client::ChatClient;
use crate::application::consumption_service::ConsumptionService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub consumption_service: ConsumptionService,
    pub chat: Arc<dyn ChatClient>,
    pub authorized_chat_id: i64,
    pub admin_chat_id: i64,
    pub chart_width: u32,
    pub chart_height: u32,
}
