/*
 * @file config.rs
 * @brief Runtime configuration loading for NutriGuide
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

//! Configuration.
//!
//! Defaults come from `config.json` when present; selected values can be
//! overridden through the environment. A missing or invalid file is not fatal.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::model::DEFAULT_API_BASE;
use crate::prompt::Profile;
use crate::transcription::{DEFAULT_TRANSCRIPTION_MODEL, DEFAULT_TRANSCRIPTION_URL};
use crate::voice::CaptureWindows;

/// Path to the JSON configuration file that holds runtime defaults.
pub const CONFIG_PATH: &str = "config.json";

/// Environment variable holding the Gemini API key.
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Environment variables checked, in order, for the transcription key.
pub const TRANSCRIPTION_KEY_VARS: [&str; 2] = ["TRANSCRIPTION_API_KEY", "GROQ_API_KEY"];

/// Gemini model used for both text and image requests unless overridden.
///
/// Must be a currently served model that accepts the `google_search` tool.
/// Deployments pin another model with `NUTRIGUIDE_TEXT_MODEL` and
/// `NUTRIGUIDE_VISION_MODEL`, or the matching keys in `config.json`.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Strongly typed representation of `config.json`.
///
/// # Details
/// Every key is optional; absent keys take the value from
/// [`AppConfig::default`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gemini model answering text questions.
    pub text_model: String,
    /// Gemini model analyzing meal images.
    pub vision_model: String,
    /// Base URL of the Gemini REST API, up to and including the version.
    pub api_base: String,
    /// Lets the text model ground answers with web search.
    pub web_search: bool,
    /// OpenAI-compatible transcription endpoint receiving WAV uploads.
    pub transcription_url: String,
    /// Whisper model name sent with each upload.
    pub transcription_model: String,
    /// Directory that receives `nutrition_advice.txt`.
    pub export_dir: PathBuf,
    /// Read every reply aloud, not just voice error notices.
    pub speak_replies: bool,
    /// Disables the microphone even when a transcription key is present.
    pub voice_enabled: bool,
    /// Ambient-noise calibration window in milliseconds.
    pub calibration_ms: u64,
    /// Listening window in seconds; values below one are raised to one.
    pub listen_seconds: u64,
    /// Profile fields applied at session start.
    pub profile: Profile,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_GEMINI_MODEL.to_string(),
            vision_model: DEFAULT_GEMINI_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            web_search: true,
            transcription_url: DEFAULT_TRANSCRIPTION_URL.to_string(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            export_dir: PathBuf::from("."),
            speak_replies: false,
            voice_enabled: true,
            calibration_ms: 1000,
            listen_seconds: 5,
            profile: Profile::default(),
        }
    }
}

impl AppConfig {
    /// Applies `NUTRIGUIDE_*` environment overrides.
    ///
    /// # Details
    /// Recognized variables are `NUTRIGUIDE_TEXT_MODEL`,
    /// `NUTRIGUIDE_VISION_MODEL`, `NUTRIGUIDE_EXPORT_DIR` and
    /// `NUTRIGUIDE_WEB_SEARCH`. An unparsable web search flag is ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup("NUTRIGUIDE_TEXT_MODEL") {
            self.text_model = model;
        }
        if let Some(model) = lookup("NUTRIGUIDE_VISION_MODEL") {
            self.vision_model = model;
        }
        if let Some(dir) = lookup("NUTRIGUIDE_EXPORT_DIR") {
            self.export_dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup("NUTRIGUIDE_WEB_SEARCH").and_then(|v| parse_flag(&v)) {
            self.web_search = flag;
        }
    }

    /// Converts the configured calibration and listening times.
    ///
    /// # Returns
    /// The windows handed to the voice adapter; the listening window is at
    /// least one second.
    pub fn capture_windows(&self) -> CaptureWindows {
        CaptureWindows {
            calibration: Duration::from_millis(self.calibration_ms),
            listen: Duration::from_secs(self.listen_seconds.max(1)),
        }
    }
}

/// API credentials read from the environment at startup.
#[derive(Clone)]
pub struct Credentials {
    /// Key sent as `x-goog-api-key` on every Gemini request.
    pub google_api_key: String,
    /// Bearer token for the transcription backend. Voice input is off
    /// without it.
    pub transcription_api_key: Option<String>,
}

impl Credentials {
    /// Reads credentials from the environment.
    ///
    /// # Errors
    /// Returns an error when `GOOGLE_API_KEY` is unset or blank.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let google_api_key = lookup(GOOGLE_API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .with_context(|| format!("{} is not set", GOOGLE_API_KEY_VAR))?;
        let transcription_api_key = TRANSCRIPTION_KEY_VARS
            .iter()
            .filter_map(|var| lookup(var))
            .find(|key| !key.trim().is_empty());
        Ok(Self {
            google_api_key,
            transcription_api_key,
        })
    }
}

/// Loads configuration from `path`, falling back to baked defaults when missing.
///
/// # Details
/// A missing file is silent; an unreadable or invalid one is logged and
/// replaced by [`AppConfig::default`].
pub fn load_app_config(path: &Path) -> AppConfig {
    match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "config parse error, using defaults");
                AppConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(err) => {
            warn!(path = %path.display(), %err, "config load error, using defaults");
            AppConfig::default()
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_use_one_search_capable_model() {
        let config = AppConfig::default();
        assert_eq!(config.text_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.vision_model, DEFAULT_GEMINI_MODEL);
        assert!(config.web_search);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_app_config(&dir.path().join("config.json"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn invalid_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_app_config(&path), AppConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"text_model": "gemini-2.5-pro", "speak_replies": true,
                "profile": {"preferences": "vegan"}}"#,
        )
        .unwrap();
        let config = load_app_config(&path);
        assert_eq!(config.text_model, "gemini-2.5-pro");
        assert!(config.speak_replies);
        assert_eq!(config.profile.preferences.as_deref(), Some("vegan"));
        assert_eq!(config.vision_model, AppConfig::default().vision_model);
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut config = AppConfig::default();
        config.apply_overrides(lookup(&[
            ("NUTRIGUIDE_TEXT_MODEL", "custom-text"),
            ("NUTRIGUIDE_EXPORT_DIR", "/tmp/advice"),
            ("NUTRIGUIDE_WEB_SEARCH", "off"),
        ]));
        assert_eq!(config.text_model, "custom-text");
        assert_eq!(config.export_dir, PathBuf::from("/tmp/advice"));
        assert!(!config.web_search);
        assert_eq!(config.vision_model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn credentials_require_google_key() {
        assert!(Credentials::from_lookup(lookup(&[])).is_err());
        assert!(Credentials::from_lookup(lookup(&[("GOOGLE_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn transcription_key_prefers_dedicated_variable() {
        let creds = Credentials::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "g"),
            ("TRANSCRIPTION_API_KEY", "t"),
            ("GROQ_API_KEY", "q"),
        ]))
        .unwrap();
        assert_eq!(creds.transcription_api_key.as_deref(), Some("t"));
        let creds = Credentials::from_lookup(lookup(&[("GOOGLE_API_KEY", "g"), ("GROQ_API_KEY", "q")]))
            .unwrap();
        assert_eq!(creds.transcription_api_key.as_deref(), Some("q"));
    }

    #[test]
    fn capture_windows_follow_config() {
        let config = AppConfig {
            calibration_ms: 250,
            listen_seconds: 0,
            ..AppConfig::default()
        };
        let windows = config.capture_windows();
        assert_eq!(windows.calibration, Duration::from_millis(250));
        assert_eq!(windows.listen, Duration::from_secs(1));
    }
}
