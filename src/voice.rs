/*
 * @file voice.rs
 * @brief Spoken input and audible feedback for NutriGuide
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

//! Voice I/O adapter.
//!
//! Only ever produces or consumes text: a captured question comes back as a
//! string, and any string can be spoken. Failures are announced audibly and
//! never reach the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::audio::{contains_speech, encode_wav, rms, speech_threshold, AudioInput};
use crate::error::{TranscriptionError, VoiceError};
use crate::speech::Speaker;
use crate::transcription::Transcriber;

/// Spoken when the recording held no recognizable words.
pub const COULD_NOT_UNDERSTAND: &str = "Sorry, I couldn't understand your message.";

/// Spoken when the transcription backend could not be reached.
pub const REQUEST_ERROR: &str = "Sorry, there was a request error.";

/// Recording windows for one capture attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureWindows {
    pub calibration: Duration,
    pub listen: Duration,
}

impl Default for CaptureWindows {
    fn default() -> Self {
        Self {
            calibration: Duration::from_millis(1000),
            listen: Duration::from_secs(5),
        }
    }
}

/// Microphone, transcription backend and synthesizer bundled together.
pub struct VoiceAdapter {
    input: Box<dyn AudioInput>,
    transcriber: Arc<dyn Transcriber>,
    speaker: Arc<dyn Speaker>,
    windows: CaptureWindows,
}

impl VoiceAdapter {
    /// Bundles the voice components.
    ///
    /// # Arguments
    /// * `input` - Microphone used for both calibration and listening.
    /// * `transcriber` - Backend that turns the WAV recording into text.
    /// * `speaker` - Synthesizer for replies and error notices.
    /// * `windows` - How long to calibrate and how long to listen.
    pub fn new(
        input: Box<dyn AudioInput>,
        transcriber: Arc<dyn Transcriber>,
        speaker: Arc<dyn Speaker>,
        windows: CaptureWindows,
    ) -> Self {
        Self {
            input,
            transcriber,
            speaker,
            windows,
        }
    }

    /// Makes one capture attempt: calibrate, listen, transcribe.
    ///
    /// # Returns
    /// * `Some(text)` - The transcribed question.
    /// * `None` - Nothing usable was captured; the user has already been told
    ///   why when the failure came from recognition or the backend.
    pub async fn capture(&self) -> Option<String> {
        match self.try_capture().await {
            Ok(text) => {
                info!(chars = text.len(), "voice input transcribed");
                Some(text)
            }
            Err(VoiceError::Transcription(TranscriptionError::Ambiguous)) => {
                info!("speech not recognized");
                self.speak(COULD_NOT_UNDERSTAND);
                None
            }
            Err(VoiceError::Transcription(TranscriptionError::Backend(reason))) => {
                error!(%reason, "transcription request failed");
                self.speak(REQUEST_ERROR);
                None
            }
            Err(err) => {
                warn!(%err, "voice capture failed");
                None
            }
        }
    }

    /// Speaks `text`, logging rather than returning any failure.
    pub fn speak(&self, text: &str) {
        if let Err(err) = self.speaker.speak(text) {
            warn!(%err, "TTS error");
        }
    }

    async fn try_capture(&self) -> Result<String, VoiceError> {
        let ambient = self.input.record(self.windows.calibration)?;
        let threshold = speech_threshold(rms(&ambient));
        info!(threshold, "listening");
        let samples = self.input.record(self.windows.listen)?;
        if !contains_speech(&samples, threshold) {
            return Err(TranscriptionError::Ambiguous.into());
        }
        let wav = encode_wav(&samples)?;
        Ok(self.transcriber.transcribe(wav).await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::SpeechError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Plays back queued recordings, one per `record` call.
    pub(crate) struct ScriptedInput {
        pub(crate) recordings: Mutex<VecDeque<Result<Vec<i16>, VoiceError>>>,
    }

    impl ScriptedInput {
        pub(crate) fn new(recordings: Vec<Result<Vec<i16>, VoiceError>>) -> Box<Self> {
            Box::new(Self {
                recordings: Mutex::new(recordings.into()),
            })
        }

        pub(crate) fn quiet_then_loud() -> Box<Self> {
            Self::new(vec![Ok(vec![10; 160]), Ok(vec![8000; 160])])
        }
    }

    impl AudioInput for ScriptedInput {
        fn record(&self, _duration: Duration) -> Result<Vec<i16>, VoiceError> {
            self.recordings
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(VoiceError::Device("script exhausted".into())))
        }
    }

    pub(crate) struct FixedTranscriber(pub(crate) Result<String, TranscriptionError>);

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, _wav: Vec<u8>) -> Result<String, TranscriptionError> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingSpeaker {
        pub(crate) spoken: Mutex<Vec<String>>,
    }

    impl Speaker for RecordingSpeaker {
        fn speak(&self, text: &str) -> Result<(), SpeechError> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn adapter(
        input: Box<ScriptedInput>,
        transcript: Result<String, TranscriptionError>,
        speaker: &Arc<RecordingSpeaker>,
    ) -> VoiceAdapter {
        VoiceAdapter::new(
            input,
            Arc::new(FixedTranscriber(transcript)),
            speaker.clone(),
            CaptureWindows::default(),
        )
    }

    #[tokio::test]
    async fn successful_capture_returns_transcript_silently() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let voice = adapter(
            ScriptedInput::quiet_then_loud(),
            Ok("What should I eat post-workout?".into()),
            &speaker,
        );
        assert_eq!(
            voice.capture().await.as_deref(),
            Some("What should I eat post-workout?")
        );
        assert!(speaker.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ambiguous_transcript_speaks_apology() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let voice = adapter(
            ScriptedInput::quiet_then_loud(),
            Err(TranscriptionError::Ambiguous),
            &speaker,
        );
        assert_eq!(voice.capture().await, None);
        assert_eq!(*speaker.spoken.lock().unwrap(), vec![COULD_NOT_UNDERSTAND]);
    }

    #[tokio::test]
    async fn silence_counts_as_ambiguous() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let voice = adapter(
            ScriptedInput::new(vec![Ok(vec![10; 160]), Ok(vec![0; 160])]),
            Ok("never reached".into()),
            &speaker,
        );
        assert_eq!(voice.capture().await, None);
        assert_eq!(*speaker.spoken.lock().unwrap(), vec![COULD_NOT_UNDERSTAND]);
    }

    #[tokio::test]
    async fn backend_failure_speaks_request_error() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let voice = adapter(
            ScriptedInput::quiet_then_loud(),
            Err(TranscriptionError::Backend("connection refused".into())),
            &speaker,
        );
        assert_eq!(voice.capture().await, None);
        assert_eq!(*speaker.spoken.lock().unwrap(), vec![REQUEST_ERROR]);
    }

    #[tokio::test]
    async fn missing_microphone_returns_none_without_speaking() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let voice = adapter(
            ScriptedInput::new(vec![Err(VoiceError::Device("no input device".into()))]),
            Ok("never reached".into()),
            &speaker,
        );
        assert_eq!(voice.capture().await, None);
        assert!(speaker.spoken.lock().unwrap().is_empty());
    }
}
