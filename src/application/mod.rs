// Application layer - Ports and use cases
pub mod chat_client;
pub mod consumption_service;
pub mod meter_portal;

#[cfg(test)]
pub mod fakes;
