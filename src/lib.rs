/*
 * @file lib.rs
 * @brief NutriGuide library root
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

//! NutriGuide - a conversational nutrition assistant.
//!
//! This library provides a chat assistant that uses:
//! - Google Gemini for text answers (optionally grounded with web search)
//! - Gemini multimodal models for meal photos and nutrition labels
//! - A Whisper transcription endpoint for spoken questions
//! - The platform speech synthesizer for audible feedback
//!
//! Every reply is also written to `nutrition_advice.txt` for download.
//!
//! # Example
//! ```no_run
//! use anyhow::Result;
//! use nutriguide::assistant::{Assistant, Session};
//! use nutriguide::config::{load_app_config, Credentials, CONFIG_PATH};
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     dotenv::dotenv().ok();
//!     let config = load_app_config(Path::new(CONFIG_PATH));
//!     let assistant = Assistant::from_config(&config, &Credentials::from_env()?);
//!     assistant.run(Session::new(config.profile.clone())).await
//! }
//! ```

pub mod assistant;
pub mod audio;
pub mod commands;
pub mod config;
pub mod console;
pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod export;
pub mod model;
pub mod prompt;
pub mod speech;
pub mod transcription;
pub mod vision;
pub mod voice;

pub use assistant::{Assistant, Session, TurnReport};
pub use conversation::{Conversation, Role, Turn};
pub use dispatcher::{Attachment, Dispatcher, Request, Submission};
pub use error::DispatchError;
pub use prompt::{build_image_prompt, build_text_prompt, Profile};
