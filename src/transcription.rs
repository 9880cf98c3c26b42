/*
 * @file transcription.rs
 * @brief Speech-to-text backend for spoken questions
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Speech transcription over an OpenAI-compatible `/audio/transcriptions`
//! endpoint (Groq Whisper by default).

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use crate::error::TranscriptionError;

/// Default transcription endpoint.
pub const DEFAULT_TRANSCRIPTION_URL: &str =
    "https://api.groq.com/openai/v1/audio/transcriptions";

/// Default Whisper model served by the endpoint.
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-large-v3-turbo";

/// Turns a WAV recording into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// # Errors
    /// [`TranscriptionError::Ambiguous`] when nothing intelligible was said,
    /// [`TranscriptionError::Backend`] when the request itself failed.
    async fn transcribe(&self, wav: Vec<u8>) -> Result<String, TranscriptionError>;
}

/// Whisper transcription via multipart upload.
pub struct WhisperApiTranscriber {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

impl WhisperApiTranscriber {
    /// Creates a transcriber for one endpoint.
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client.
    /// * `url` - Full `/audio/transcriptions` URL.
    /// * `model` - Whisper model name, e.g. [`DEFAULT_TRANSCRIPTION_MODEL`].
    /// * `api_key` - Bearer token for the endpoint.
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn form(&self, wav: Vec<u8>) -> Result<Form, TranscriptionError> {
        let file = Part::bytes(wav)
            .file_name("speech.wav")
            .mime_str("audio/wav")
            .map_err(|err| TranscriptionError::Backend(err.to_string()))?;
        Ok(Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .text("language", "en")
            .part("file", file))
    }
}

#[async_trait]
impl Transcriber for WhisperApiTranscriber {
    async fn transcribe(&self, wav: Vec<u8>) -> Result<String, TranscriptionError> {
        debug!(bytes = wav.len(), model = %self.model, "uploading recording");
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .multipart(self.form(wav)?)
            .send()
            .await
            .map_err(|err| TranscriptionError::Backend(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| TranscriptionError::Backend(err.to_string()))?;
        if !status.is_success() {
            return Err(TranscriptionError::Backend(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }
        parse_transcript(&body)
    }
}

/// Extracts the transcript, treating blank output as unrecognized speech.
fn parse_transcript(body: &str) -> Result<String, TranscriptionError> {
    let parsed: TranscriptionResponse = serde_json::from_str(body)
        .map_err(|err| TranscriptionError::Backend(format!("malformed response: {}", err)))?;
    let text = parsed.text.trim();
    if text.is_empty() {
        return Err(TranscriptionError::Ambiguous);
    }
    Ok(text.to_string())
}
