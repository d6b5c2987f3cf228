// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod stromnetz_portal;
pub mod telegram_client;
