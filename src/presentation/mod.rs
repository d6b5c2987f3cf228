// Presentation layer - Bot commands, chat texts and charts
pub mod app_state;
pub mod bot;
pub mod charts;
pub mod handlers;
pub mod report;
