//! Text-improvement assist: sends the post description to a remote
//! text-generation endpoint and returns the rewritten copy.
//!
//! Failures are sorted into a few user-facing classes (bad key, rate limit,
//! network, other). Nothing here touches the renderer.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const MAX_TOKENS: u32 = 1024;
/// Required prefix for API keys.
pub const API_KEY_PREFIX: &str = "sk-ant-";

const PROMPT: &str = "You are a social media copywriting expert. Improve this before/after \
transformation post to make it engaging, compelling, and shareable for Facebook. Keep it \
authentic and conversational. Make it concise but impactful. Return ONLY the improved text, \
no explanations or commentary.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImproveError {
    EmptyDescription,
    MissingApiKey,
    InvalidApiKey,
    /// HTTP 401 or an authentication error message.
    Unauthorized,
    /// HTTP 429.
    RateLimited,
    /// Request never got a response (connect failure, timeout, …).
    Network(String),
    Other(String),
}

impl std::fmt::Display for ImproveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImproveError::EmptyDescription => write!(f, "Description is empty"),
            ImproveError::MissingApiKey => write!(f, "No API key configured"),
            ImproveError::InvalidApiKey => {
                write!(f, "Invalid API key format (expected prefix '{}')", API_KEY_PREFIX)
            }
            ImproveError::Unauthorized => write!(f, "API key rejected (401)"),
            ImproveError::RateLimited => write!(f, "Rate limited (429)"),
            ImproveError::Network(e) => write!(f, "Network error: {}", e),
            ImproveError::Other(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ImproveError {}

impl ImproveError {
    /// Message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ImproveError::EmptyDescription => "Please enter some text first!".to_string(),
            ImproveError::MissingApiKey => "Please set up your API key first!".to_string(),
            ImproveError::InvalidApiKey => {
                format!("Invalid API key format. Should start with \"{}\"", API_KEY_PREFIX)
            }
            ImproveError::Unauthorized => {
                "Your API key appears to be invalid. Please check it and try again.".to_string()
            }
            ImproveError::RateLimited => {
                "Rate limit reached. Please wait a moment and try again.".to_string()
            }
            ImproveError::Network(_) => {
                "Network error. Please check your internet connection.".to_string()
            }
            ImproveError::Other(e) => format!("Error improving text: {}", e),
        }
    }

    /// Classify a non-success HTTP response.
    fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| "Unknown error".to_string());
        match status {
            401 => ImproveError::Unauthorized,
            429 => ImproveError::RateLimited,
            _ if message.to_lowercase().contains("authentication") => ImproveError::Unauthorized,
            _ => ImproveError::Other(format!("API Error {}: {}", status, message)),
        }
    }
}

impl From<reqwest::Error> for ImproveError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            ImproveError::Network(e.to_string())
        } else {
            ImproveError::Other(e.to_string())
        }
    }
}

/// Check that a key is present and looks like an API key.
pub fn validate_api_key(key: &str) -> Result<(), ImproveError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(ImproveError::MissingApiKey);
    }
    if !key.starts_with(API_KEY_PREFIX) {
        return Err(ImproveError::InvalidApiKey);
    }
    Ok(())
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Settings for [`TextImprover`].
#[derive(Clone, Debug)]
pub struct ImproveConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for ImproveConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: 60_000,
        }
    }
}

/// Blocking client for the text-generation endpoint.
pub struct TextImprover {
    client: Client,
    config: ImproveConfig,
    api_key: String,
}

impl TextImprover {
    pub fn new(api_key: &str, config: ImproveConfig) -> Result<Self, ImproveError> {
        validate_api_key(api_key)?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ImproveError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config, api_key: api_key.trim().to_string() })
    }

    /// Rewrite `description`. Returns the first text block of the reply.
    pub fn improve(&self, description: &str) -> Result<String, ImproveError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ImproveError::EmptyDescription);
        }

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: format!("{}\n\nOriginal text: {}", PROMPT, description),
            }],
        };

        crate::log_info!("Requesting text improvement from {}", self.config.endpoint);
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()?;

        let status = response.status();
        crate::log_info!("Text improvement response status: {}", status.as_u16());
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message);
            let err = ImproveError::from_status(status.as_u16(), message);
            crate::log_err!("Text improvement failed: {}", err);
            return Err(err);
        }

        let parsed: MessagesResponse = response
            .json()
            .map_err(|e| ImproveError::Other(format!("Unexpected response: {}", e)))?;
        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ImproveError::Other("Response contained no text".to_string()))
    }
}
