use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Face/expression detection service
    pub vision_api_url: String,
    pub vision_api_key: String,

    // Generative theme evaluator
    pub genai_api_url: String,
    pub genai_api_key: String,
    pub genai_model: String,

    // Chat-bot push API
    pub chat_api_url: String,
    pub chat_channel_token: String,

    // Event currently accepting submissions
    pub current_event_id: String,

    // Web server
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            vision_api_url: env::var("VISION_API_URL")
                .unwrap_or_else(|_| "https://vision.googleapis.com".to_string()),
            vision_api_key: required_env("VISION_API_KEY"),
            genai_api_url: env::var("GENAI_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            genai_api_key: required_env("GENAI_API_KEY"),
            genai_model: env::var("GENAI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            chat_api_url: env::var("CHAT_API_URL")
                .unwrap_or_else(|_| "https://api.line.me".to_string()),
            chat_channel_token: required_env("CHAT_CHANNEL_TOKEN"),
            current_event_id: required_env("CURRENT_EVENT_ID"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
