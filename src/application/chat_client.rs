// Port for the chat platform the bot talks through
use async_trait::async_trait;

/// A rendered chart ready to be uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ChartImage {
    pub fn svg(file_name: impl Into<String>, svg: String) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: "image/svg+xml",
            bytes: svg.into_bytes(),
        }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;

    async fn send_image(&self, chat_id: i64, image: ChartImage) -> anyhow::Result<()>;
}
