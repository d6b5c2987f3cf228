// Telegram Bot API client
use crate::application::chat_client::{ChartImage, ChatClient};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    bot_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Chat {
    pub id: i64,
}

impl TelegramClient {
    pub fn new(api_url: &str, bot_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_url: format!("{}/bot{}", api_url.trim_end_matches('/'), bot_token),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.bot_url, method)
    }

    async fn parse<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response
            .json::<ApiResponse<T>>()
            .await
            .with_context(|| format!("Failed to parse Telegram {} response ({})", method, status))?;

        if !body.ok {
            anyhow::bail!(
                "Telegram {} failed with status {}: {}",
                method,
                status,
                body.description.unwrap_or_default()
            );
        }

        body.result
            .with_context(|| format!("Telegram {} returned no result", method))
    }

    /// Long-poll for updates newer than `offset`
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let mut query = vec![("timeout", timeout_secs.to_string())];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&query)
            .send()
            .await
            .context("Failed to poll Telegram for updates")?;

        Self::parse("getUpdates", response).await
    }
}

#[async_trait]
impl ChatClient for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .context("Failed to send Telegram message")?;

        Self::parse::<serde_json::Value>("sendMessage", response).await?;
        Ok(())
    }

    async fn send_image(&self, chat_id: i64, image: ChartImage) -> Result<()> {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(image.content_type)
            .context("Invalid chart content type")?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await
            .context("Failed to upload chart to Telegram")?;

        Self::parse::<serde_json::Value>("sendDocument", response).await?;
        Ok(())
    }
}
