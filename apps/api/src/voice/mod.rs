//! Text-to-speech through an ElevenLabs-compatible REST API.
//!
//! The feature is optional: without an API key `AppState::voice` is `None`
//! and the speech endpoint answers 503 while everything else keeps working.

use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub mod handlers;

const VOICE_API_URL: &str = "https://api.elevenlabs.io/v1";
const MODEL_ID: &str = "eleven_monolingual_v1";
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const NOT_CONFIGURED: &str =
    "Text-to-speech is not available. Please configure your ElevenLabs API key.";

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid API key")]
    InvalidKey,

    #[error("quota exceeded")]
    QuotaExceeded,

    #[error("rate limited")]
    RateLimited,

    #[error("voice API error (status {status}): {body}")]
    Api { status: u16, body: String },
}

impl VoiceError {
    pub fn user_message(&self) -> String {
        match self {
            VoiceError::InvalidKey => {
                "Invalid ElevenLabs API key. Please check your API key and try again.".to_string()
            }
            VoiceError::QuotaExceeded => {
                "ElevenLabs API quota exceeded. Please check your account balance.".to_string()
            }
            VoiceError::RateLimited => {
                "ElevenLabs API rate limit exceeded. Please try again later.".to_string()
            }
            VoiceError::Api { status, body } => format!("ElevenLabs API error ({status}): {body}"),
            VoiceError::Http(_) => "Failed to play quote. Please try again.".to_string(),
        }
    }

    fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 => VoiceError::InvalidKey,
            402 => VoiceError::QuotaExceeded,
            429 => VoiceError::RateLimited,
            code => VoiceError::Api {
                status: code,
                body: if body.is_empty() {
                    "Unknown error".to_string()
                } else {
                    body
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceStatus {
    pub configured: bool,
    pub message: &'static str,
}

pub fn status(client: Option<&VoiceClient>) -> VoiceStatus {
    match client {
        Some(_) => VoiceStatus {
            configured: true,
            message: "Voice service is configured and ready.",
        },
        None => VoiceStatus {
            configured: false,
            message: NOT_CONFIGURED,
        },
    }
}

/// What gets spoken for a quote card.
pub fn speech_text(content: &str, author: &str) -> String {
    format!("{content} - {author}")
}

#[derive(Clone)]
pub struct VoiceClient {
    client: Client,
    api_key: String,
    voice_id: String,
}

impl VoiceClient {
    /// Returns `None` when there is no key to call the service with.
    pub fn from_key(api_key: Option<String>, voice_id: String) -> Result<Option<Self>, VoiceError> {
        let Some(api_key) = api_key.filter(|k| !k.trim().is_empty()) else {
            return Ok(None);
        };
        Ok(Some(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            voice_id,
        }))
    }

    /// Returns MPEG audio for `text` spoken by the configured voice.
    pub async fn text_to_speech(&self, text: &str) -> Result<Bytes, VoiceError> {
        let body = SpeechRequest {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.5,
            },
        };
        let response = self
            .client
            .post(format!("{VOICE_API_URL}/text-to-speech/{}", self.voice_id))
            .header("xi-api-key", &self.api_key)
            .header("accept", "audio/mpeg")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Voice API returned {}: {}", status, body);
            return Err(VoiceError::from_status(status, body));
        }

        let audio = response.bytes().await?;
        debug!(bytes = audio.len(), "Synthesized speech");
        Ok(audio)
    }
}
