//! HTTP client for the generative vision-language evaluator.
//!
//! [`GenAiClient::describe_image`] sends an image plus a prompt and returns
//! the model's raw text. Interpretation of that text (fence stripping, JSON
//! parsing, fallbacks) is the caller's concern; [`util::strip_code_blocks`]
//! helps with the common fenced-JSON case.

pub mod error;
pub mod types;
pub mod util;

pub use error::{GenAiError, Result};

use base64::Engine;
use tracing::debug;

use types::{Content, GenerateRequest, GenerateResponse, InlineData, Part};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GenAiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Send an image and a prompt, return the first candidate's text.
    pub async fn describe_image(&self, image: &[u8], prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData(InlineData {
                        mime_type: "image/jpeg",
                        data: base64::engine::general_purpose::STANDARD.encode(image),
                    }),
                    Part::Text(prompt.to_string()),
                ],
            }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        debug!(model = %self.model, image_bytes = image.len(), "generate request");

        let resp = self.http.post(&url).json(&request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenAiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let generated: GenerateResponse = resp.json().await?;
        let text: String = generated
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenAiError::EmptyResponse);
        }
        Ok(text)
    }
}
