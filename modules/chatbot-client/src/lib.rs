//! HTTP client for the chat-platform push API.
//!
//! Delivery is best-effort from the pipeline's point of view; this crate
//! only reports what happened, and [`ChatError::is_transient`] tells the
//! caller whether a retry makes sense.

pub mod error;

pub use error::{ChatError, Result};

use serde::Serialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.line.me";

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: Vec<TextMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    message_type: &'static str,
    text: &'a str,
}

pub struct ChatClient {
    http: reqwest::Client,
    channel_token: String,
    base_url: String,
}

impl ChatClient {
    pub fn new(channel_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            channel_token: channel_token.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Push one text message to a recipient.
    pub async fn push(&self, recipient: &str, text: &str) -> Result<()> {
        let request = PushRequest {
            to: recipient,
            messages: vec![TextMessage {
                message_type: "text",
                text,
            }],
        };

        let url = format!("{}/v2/bot/message/push", self.base_url);
        debug!(recipient, chars = text.chars().count(), "chat push");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.channel_token)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }
}
