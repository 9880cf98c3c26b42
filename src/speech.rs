//! Text-to-speech functionality module.

use std::process::Command;

use crate::error::SpeechError;

/// Synthesizes speech and plays it on the local output device.
pub trait Speaker: Send + Sync {
    /// Blocks until playback completes.
    fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Speaks through the platform's command-line synthesizer
/// (`say` on macOS, `espeak` elsewhere).
#[derive(Clone, Debug)]
pub struct SystemSpeaker {
    program: String,
}

impl Default for SystemSpeaker {
    fn default() -> Self {
        Self::new(default_program())
    }
}

impl SystemSpeaker {
    /// Uses `program` as the synthesizer; it receives the text as its last
    /// argument.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Synthesizer command name.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Speaker for SystemSpeaker {
    /// Speaks the given text.
    ///
    /// # Errors
    /// Returns an error if the text is blank, or the synthesizer fails to
    /// spawn or exits unsuccessfully.
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }
        let status = Command::new(&self.program)
            .args(synthesizer_args(text))
            .status()
            .map_err(|err| self.failure(err.to_string()))?;
        if !status.success() {
            return Err(self.failure(format!("exited with {}", status)));
        }
        Ok(())
    }
}

impl SystemSpeaker {
    fn failure(&self, reason: String) -> SpeechError {
        SpeechError::Synthesizer {
            program: self.program.clone(),
            reason,
        }
    }
}

/// Arguments passed to the synthesizer.
///
/// `--` ends option parsing, so a reply starting with `-` is spoken rather
/// than read as a flag.
fn synthesizer_args(text: &str) -> [&str; 2] {
    ["--", text]
}

fn default_program() -> &'static str {
    if cfg!(target_os = "macos") {
        "say"
    } else {
        "espeak"
    }
}
