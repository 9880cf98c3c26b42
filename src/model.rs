/*
 * @file model.rs
 * @brief Generative model capability traits and the Gemini adapter
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

//! Hosted model access.
//!
//! The rest of the crate only sees [`TextGenerator`] and [`VisionGenerator`].
//! [`GeminiModel`] implements both against the Gemini `generateContent` REST
//! endpoint; when web search is enabled the provider may run its own search
//! calls before answering, which this module never inspects.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::vision::DecodedImage;

/// Default REST base for the Gemini API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Produces free text from a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends `prompt` and returns the model's answer.
    ///
    /// # Errors
    /// Any [`ModelError`]; callers render it rather than retrying.
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Produces free text from a prompt plus one image.
#[async_trait]
pub trait VisionGenerator: Send + Sync {
    /// Sends `prompt` with `image` attached inline.
    ///
    /// # Arguments
    /// * `prompt` - Instruction text placed before the image.
    /// * `image` - A decoded image whose bytes are sent base64 encoded.
    ///
    /// # Errors
    /// Any [`ModelError`].
    async fn generate_with_image(
        &self,
        prompt: &str,
        image: &DecodedImage,
    ) -> Result<String, ModelError>;
}

/// Gemini `generateContent` client for a single model identifier.
///
/// No timeout is configured here; requests use the HTTP client's defaults.
pub struct GeminiModel {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    web_search: bool,
}

impl GeminiModel {
    /// Creates a client for `model` authenticated with `api_key`.
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            web_search: false,
        }
    }

    /// Overrides the REST base URL (proxies, regional endpoints).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Lets the model ground its answer with the provider's web search tool.
    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    /// Model identifier used in the request path.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    /// Posts `request` and maps the HTTP outcome onto [`ModelError`].
    ///
    /// # Errors
    /// `Transport` for connection failures, `Api` for non-2xx statuses, and
    /// `Malformed` or `EmptyResponse` for unusable success bodies.
    async fn send(&self, request: &GenerateRequest) -> Result<String, ModelError> {
        debug!(model = %self.model, parts = request.contents[0].parts.len(), "sending generateContent request");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|err| ModelError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ModelError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        parse_generate_response(&body)
    }
}

#[async_trait]
impl TextGenerator for GeminiModel {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = GenerateRequest::new(vec![Part::Text(prompt.to_string())], self.web_search);
        self.send(&request).await
    }
}

#[async_trait]
impl VisionGenerator for GeminiModel {
    async fn generate_with_image(
        &self,
        prompt: &str,
        image: &DecodedImage,
    ) -> Result<String, ModelError> {
        let parts = vec![
            Part::Text(prompt.to_string()),
            Part::InlineData(InlineData {
                mime_type: image.mime_type.to_string(),
                data: image.to_base64(),
            }),
        ];
        self.send(&GenerateRequest::new(parts, false)).await
    }
}

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

impl GenerateRequest {
    fn new(parts: Vec<Part>, web_search: bool) -> Self {
        let tools = if web_search {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };
        Self {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            tools,
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Concatenates the text parts of the first candidate.
fn parse_generate_response(body: &str) -> Result<String, ModelError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|err| ModelError::Malformed(err.to_string()))?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ModelError::EmptyResponse);
    }
    Ok(text)
}

/// Extracts the provider's error message, falling back to the raw body.
fn api_error(status: u16, body: &str) -> ModelError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    ModelError::Api { status, message }
}
