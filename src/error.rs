/*
 * @file error.rs
 * @brief Stage-tagged error types for NutriGuide
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

//! Error types for every stage that can fail.
//!
//! Each variant renders as the user-facing message for its stage, so the
//! display layer can print an error verbatim without inspecting it.

use thiserror::Error;

/// Failure reported by a hosted model call.
///
/// The display form is the bare message; the stage prefix is added by
/// [`DispatchError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The request never produced an HTTP response (DNS, TLS, timeout...).
    #[error("{0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// The body could not be parsed as a generation response.
    #[error("malformed model response: {0}")]
    Malformed(String),

    /// The provider answered but produced no text (e.g. a safety block).
    #[error("model returned no text")]
    EmptyResponse,
}

/// Failure decoding an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("uploaded image is empty")]
    Empty,

    #[error("{0}")]
    Decode(String),

    #[error("unsupported image format {0}, expected JPEG or PNG")]
    Unsupported(String),
}

/// Failure produced by the query dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Text path: the model call failed.
    #[error("Error: {0}")]
    Model(ModelError),

    /// Image path: the blob could not be decoded.
    #[error("Image processing error: {0}")]
    ImageDecode(ImageError),

    /// Image path: the multimodal model call failed.
    #[error("Image processing error: {0}")]
    ImageModel(ModelError),
}

/// Failure writing the downloadable reply file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("File creation error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by the speech-to-text backend.
///
/// The two variants are distinguishable so the caller can tell the user
/// whether to repeat themselves or to check their connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptionError {
    /// Audio was captured but no words could be recognized.
    #[error("speech was not recognized")]
    Ambiguous,

    /// The backend request failed (network, auth, HTTP status).
    #[error("transcription request failed: {0}")]
    Backend(String),
}

/// Failure during a voice capture attempt.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("microphone error: {0}")]
    Device(String),

    #[error("audio encoding error: {0}")]
    Encoding(#[from] hound::Error),

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
}

/// Failure synthesizing speech.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("cannot speak empty text")]
    EmptyText,

    #[error("speech synthesizer `{program}` failed: {reason}")]
    Synthesizer { program: String, reason: String },
}
