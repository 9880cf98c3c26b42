/*
 * @file assistant.rs
 * @brief Implementation of NutriGuide's interactive chat runtime
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

//! Chat assistant orchestration module.
//!
//! [`Session`] holds everything that survives between turns. It is owned by
//! the loop driver and moved through [`Assistant::process_submission`], which
//! hands it back updated; nothing lives in global state.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::audio::CpalInput;
use crate::commands::{is_quit_phrase, parse_input, ConsoleCommand, HELP};
use crate::config::{AppConfig, Credentials};
use crate::console::Console;
use crate::conversation::{Conversation, Turn};
use crate::dispatcher::{Attachment, Dispatcher, Submission};
use crate::error::ExportError;
use crate::export::{ExportWriter, ExportedFile};
use crate::model::GeminiModel;
use crate::prompt::{Profile, ProfileField};
use crate::speech::SystemSpeaker;
use crate::transcription::WhisperApiTranscriber;
use crate::voice::VoiceAdapter;

/// Per-session state carried from one turn to the next.
#[derive(Clone, Debug, Default)]
pub struct Session {
    conversation: Conversation,
    profile: Profile,
    attachment: Option<Attachment>,
    last_result: Option<String>,
}

impl Session {
    /// Starts a session with a greeting and the given profile.
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Transcript so far, greeting included.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Personalization sent with every request.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Mutable access for the profile commands.
    ///
    /// # Details
    /// Edits apply from the next submission on; earlier turns are untouched.
    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    /// Attaches an image to the next submission, replacing any pending one.
    pub fn attach(&mut self, attachment: Attachment) {
        self.attachment = Some(attachment);
    }

    /// Removes the pending attachment.
    ///
    /// # Returns
    /// The attachment that was pending, or `None` when there was none.
    pub fn detach(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }

    /// Image that the next submission will carry, if any.
    pub fn pending_attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Latest reply or error string produced in this session.
    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    /// Resets the transcript to the greeting. Profile and attachment stay.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.last_result = None;
    }
}

/// Outcome of one processed submission.
#[derive(Debug)]
pub struct TurnReport {
    /// Text shown to the user: the model's answer or the error string.
    pub reply: String,
    /// False when `reply` is an error string.
    pub succeeded: bool,
    /// Where the reply was written, or why it could not be.
    pub export: Result<ExportedFile, ExportError>,
}

/// Whether the loop keeps reading input after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Runtime container that owns the model clients and I/O adapters.
pub struct Assistant {
    dispatcher: Dispatcher,
    exporter: ExportWriter,
    voice: Option<VoiceAdapter>,
    speak_replies: bool,
}

impl Assistant {
    /// Creates an assistant with no voice adapter.
    ///
    /// # Arguments
    /// * `dispatcher` - Routes text and image requests to the models.
    /// * `exporter` - Receives every reply, errors included.
    ///
    /// # Returns
    /// An assistant that neither listens nor speaks until
    /// [`Assistant::with_voice`] is applied.
    pub fn new(dispatcher: Dispatcher, exporter: ExportWriter) -> Self {
        Self {
            dispatcher,
            exporter,
            voice: None,
            speak_replies: false,
        }
    }

    /// Enables `/mic` and spoken error notices.
    pub fn with_voice(mut self, voice: VoiceAdapter) -> Self {
        self.voice = Some(voice);
        self
    }

    /// Reads every reply aloud when a voice adapter is present.
    pub fn with_spoken_replies(mut self, enabled: bool) -> Self {
        self.speak_replies = enabled;
        self
    }

    /// Builds the Gemini-backed assistant described by `config`.
    ///
    /// Voice input is wired only when a transcription key is available and
    /// voice is not disabled in the config.
    pub fn from_config(config: &AppConfig, credentials: &Credentials) -> Self {
        let client = reqwest::Client::new();
        let text_model = GeminiModel::new(
            client.clone(),
            &credentials.google_api_key,
            &config.text_model,
        )
        .with_api_base(&config.api_base)
        .with_web_search(config.web_search);
        let vision_model = GeminiModel::new(
            client.clone(),
            &credentials.google_api_key,
            &config.vision_model,
        )
        .with_api_base(&config.api_base);
        info!(
            text_model = text_model.model(),
            vision_model = vision_model.model(),
            web_search = config.web_search,
            "models configured"
        );
        let dispatcher = Dispatcher::new(Arc::new(text_model), Arc::new(vision_model));
        let assistant = Self::new(dispatcher, ExportWriter::new(&config.export_dir))
            .with_spoken_replies(config.speak_replies);
        match (&credentials.transcription_api_key, config.voice_enabled) {
            (Some(key), true) => {
                let transcriber = WhisperApiTranscriber::new(
                    client,
                    &config.transcription_url,
                    &config.transcription_model,
                    key,
                );
                assistant.with_voice(VoiceAdapter::new(
                    Box::new(CpalInput),
                    Arc::new(transcriber),
                    Arc::new(SystemSpeaker::default()),
                    config.capture_windows(),
                ))
            }
            _ => {
                info!("voice input disabled");
                assistant
            }
        }
    }

    /// Runs one turn: dispatch, record, export and optionally speak.
    ///
    /// The pending attachment is consumed by this submission whether or not
    /// it succeeds, so it can never leak into a later text-only turn.
    ///
    /// # Returns
    /// The updated session, plus a report when a request was made. Blank
    /// text with no attachment makes no request and leaves the session as is.
    pub async fn process_submission(
        &self,
        mut session: Session,
        text: Option<String>,
    ) -> (Session, Option<TurnReport>) {
        let submission = Submission {
            text,
            image: session.attachment.take(),
        };
        let Some(user_text) = submission.user_turn_text() else {
            return (session, None);
        };
        let Some(request) = submission.into_request() else {
            return (session, None);
        };
        session.conversation.append(Turn::user(user_text));

        let result = self.dispatcher.dispatch(&request, &session.profile).await;
        let succeeded = result.is_ok();
        let reply = result.unwrap_or_else(|err| {
            warn!(%err, "request failed");
            err.to_string()
        });
        session.conversation.append(Turn::assistant(reply.clone()));
        session.last_result = Some(reply.clone());

        let export = self.exporter.write(&reply);
        if let Err(err) = &export {
            warn!(%err, "export failed");
        }
        if self.speak_replies {
            if let Some(voice) = &self.voice {
                voice.speak(&reply);
            }
        }
        (
            session,
            Some(TurnReport {
                reply,
                succeeded,
                export,
            }),
        )
    }

    /// Reads console input until `/quit`, a spoken quit phrase, or end of input.
    ///
    /// # Errors
    /// Returns an error only if reading stdin fails.
    pub async fn run(&self, mut session: Session) -> Result<()> {
        let mut console = Console::stdin();
        console.show_transcript(session.conversation());
        console.notice("Type /help for commands.");
        while let Some(line) = console.read_line().await? {
            let (next, flow) = self
                .handle_command(session, parse_input(&line), &console)
                .await;
            session = next;
            if flow == Flow::Quit {
                break;
            }
        }
        info!(turns = session.conversation().len(), "session ended");
        Ok(())
    }

    /// Applies one parsed console command to `session`.
    ///
    /// # Returns
    /// The updated session and whether the loop should keep going.
    async fn handle_command(
        &self,
        mut session: Session,
        command: ConsoleCommand,
        console: &Console,
    ) -> (Session, Flow) {
        match command {
            ConsoleCommand::Chat(text) => {
                return (self.respond(session, text, console).await, Flow::Continue)
            }
            ConsoleCommand::Microphone => return self.listen(session, console).await,
            ConsoleCommand::Attach(path) => match Attachment::from_path(&path) {
                Ok(attachment) => {
                    console.notice(&format!(
                        "Attached {}. It will be analyzed with your next message.",
                        attachment.name
                    ));
                    session.attach(attachment);
                }
                Err(err) => console.notice(&format!("Could not attach image: {}", err)),
            },
            ConsoleCommand::Detach => match session.detach() {
                Some(attachment) => console.notice(&format!("Removed {}.", attachment.name)),
                None => console.notice("No image is attached."),
            },
            ConsoleCommand::Clear => {
                session.clear();
                console.show_transcript(session.conversation());
            }
            ConsoleCommand::SetProfile(field, value) => {
                session.profile_mut().set(field, &value);
                console.notice(&format!(
                    "{}: {}",
                    field.label(),
                    session.profile().rendered(field)
                ));
            }
            ConsoleCommand::ShowProfile => show_profile(session.profile(), console),
            ConsoleCommand::History => console.show_transcript(session.conversation()),
            ConsoleCommand::Help => println!("{}", HELP),
            ConsoleCommand::Quit => return (session, Flow::Quit),
            ConsoleCommand::Invalid(message) => console.notice(&message),
            ConsoleCommand::Empty => {}
        }
        (session, Flow::Continue)
    }

    /// Submits `text` with any pending attachment and prints the outcome.
    async fn respond(&self, session: Session, text: String, console: &Console) -> Session {
        let (session, report) = self.process_submission(session, Some(text)).await;
        if let Some(report) = report {
            console.show_turn(&Turn::assistant(report.reply.as_str()));
            match &report.export {
                Ok(file) => console.notice(&format!(
                    "Download: {} ({})",
                    file.path.display(),
                    file.mime_type
                )),
                Err(err) => console.notice(&err.to_string()),
            }
        }
        session
    }

    /// Captures one spoken question.
    ///
    /// # Details
    /// An utterance that is only a quit phrase ends the session; anything
    /// else, including a failed capture, keeps it going.
    async fn listen(&self, session: Session, console: &Console) -> (Session, Flow) {
        let Some(voice) = &self.voice else {
            console.notice("Voice input is unavailable: set TRANSCRIPTION_API_KEY or GROQ_API_KEY.");
            return (session, Flow::Continue);
        };
        console.notice("Listening.....");
        let Some(text) = voice.capture().await else {
            return (session, Flow::Continue);
        };
        if is_quit_phrase(&text) {
            return (session, Flow::Quit);
        }
        console.show_turn(&Turn::user(text.as_str()));
        (self.respond(session, text, console).await, Flow::Continue)
    }
}

fn show_profile(profile: &Profile, console: &Console) {
    for field in [
        ProfileField::Health,
        ProfileField::Fitness,
        ProfileField::Preferences,
        ProfileField::Feedback,
    ] {
        console.notice(&format!("{}: {}", field.label(), profile.rendered(field)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Role, GREETING};
    use crate::dispatcher::tests::FakeModel;
    use crate::error::{ModelError, TranscriptionError};
    use crate::vision::tests::png_bytes;
    use crate::voice::tests::{FixedTranscriber, RecordingSpeaker, ScriptedInput};
    use crate::voice::CaptureWindows;
    use std::fs;

    struct Harness {
        assistant: Assistant,
        text: Arc<FakeModel>,
        vision: Arc<FakeModel>,
        dir: tempfile::TempDir,
    }

    fn harness(text: Arc<FakeModel>, vision: Arc<FakeModel>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = Dispatcher::new(text.clone(), vision.clone());
        let assistant = Assistant::new(dispatcher, ExportWriter::new(dir.path()));
        Harness {
            assistant,
            text,
            vision,
            dir,
        }
    }

    #[tokio::test]
    async fn text_turn_records_both_sides_and_exports() {
        let h = harness(
            FakeModel::replying("Eat more greens."),
            FakeModel::replying("unused"),
        );
        let (session, report) = h
            .assistant
            .process_submission(Session::default(), Some("What is healthy?".into()))
            .await;
        let report = report.expect("request made");
        assert!(report.succeeded);
        let turns = session.conversation().turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].content(), GREETING);
        assert_eq!(turns[1], Turn::user("What is healthy?"));
        assert_eq!(turns[2], Turn::assistant("Eat more greens."));
        assert_eq!(session.last_result(), Some("Eat more greens."));
        let exported = report.export.unwrap();
        assert_eq!(exported.path, h.dir.path().join("nutrition_advice.txt"));
        assert_eq!(fs::read_to_string(exported.path).unwrap(), "Eat more greens.");
    }

    #[tokio::test]
    async fn attachment_applies_to_one_submission_only() {
        let h = harness(
            FakeModel::replying("text answer"),
            FakeModel::replying("image answer"),
        );
        let mut session = Session::default();
        session.attach(Attachment::new("meal.png", png_bytes(2, 2)));

        let (session, first) = h
            .assistant
            .process_submission(session, Some("Is this healthy?".into()))
            .await;
        assert_eq!(first.unwrap().reply, "image answer");
        assert!(session.pending_attachment().is_none());

        let (session, second) = h
            .assistant
            .process_submission(session, Some("And for dinner?".into()))
            .await;
        assert_eq!(second.unwrap().reply, "text answer");
        assert_eq!(h.vision.calls(), 1);
        assert_eq!(h.text.calls(), 1);
        assert_eq!(session.conversation().len(), 5);
    }

    #[tokio::test]
    async fn failures_are_recorded_and_exported_as_text() {
        let h = harness(
            FakeModel::failing(ModelError::Transport("timeout".into())),
            FakeModel::replying("unused"),
        );
        let (session, report) = h
            .assistant
            .process_submission(Session::default(), Some("Low-carb lunch ideas".into()))
            .await;
        let report = report.unwrap();
        assert!(!report.succeeded);
        assert_eq!(report.reply, "Error: timeout");
        let last = session.conversation().turns().last().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(last.content(), "Error: timeout");
        assert_eq!(
            fs::read_to_string(report.export.unwrap().path).unwrap(),
            "Error: timeout"
        );
    }

    #[tokio::test]
    async fn blank_submission_makes_no_request() {
        let h = harness(FakeModel::replying("x"), FakeModel::replying("y"));
        let (session, report) = h
            .assistant
            .process_submission(Session::default(), Some("   ".into()))
            .await;
        assert!(report.is_none());
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(h.text.calls(), 0);
    }

    #[tokio::test]
    async fn profile_reaches_the_prompt() {
        let h = harness(FakeModel::replying("ok"), FakeModel::replying("unused"));
        let mut session = Session::new(Profile::default());
        session
            .profile_mut()
            .set(ProfileField::Preferences, "dairy-free");
        h.assistant
            .process_submission(session, Some("Breakfast ideas?".into()))
            .await;
        let prompts = h.text.prompts.lock().unwrap();
        assert!(prompts[0].contains("dairy-free"));
    }

    #[tokio::test]
    async fn spoken_replies_use_the_voice_adapter() {
        let speaker = Arc::new(RecordingSpeaker::default());
        let voice = VoiceAdapter::new(
            ScriptedInput::new(Vec::new()),
            Arc::new(FixedTranscriber(Err(TranscriptionError::Ambiguous))),
            speaker.clone(),
            CaptureWindows::default(),
        );
        let h = harness(FakeModel::replying("Drink water."), FakeModel::replying("unused"));
        let assistant = h.assistant.with_voice(voice).with_spoken_replies(true);
        assistant
            .process_submission(Session::default(), Some("Hydration tips?".into()))
            .await;
        assert_eq!(*speaker.spoken.lock().unwrap(), vec!["Drink water."]);
    }

    fn listening(h: Harness, transcript: &str) -> Harness {
        let voice = VoiceAdapter::new(
            ScriptedInput::quiet_then_loud(),
            Arc::new(FixedTranscriber(Ok(transcript.to_string()))),
            Arc::new(RecordingSpeaker::default()),
            CaptureWindows::default(),
        );
        Harness {
            assistant: h.assistant.with_voice(voice),
            ..h
        }
    }

    #[tokio::test]
    async fn spoken_question_about_quitting_is_dispatched() {
        let h = harness(
            FakeModel::replying("Swap soda for water."),
            FakeModel::replying("unused"),
        );
        let h = listening(h, "How can I quit sugar?");
        let (session, flow) = h
            .assistant
            .handle_command(Session::default(), ConsoleCommand::Microphone, &Console::stdin())
            .await;
        assert_eq!(flow, Flow::Continue);
        assert_eq!(h.text.calls(), 1);
        assert_eq!(session.last_result(), Some("Swap soda for water."));
    }

    #[tokio::test]
    async fn spoken_goodbye_ends_the_session() {
        let h = harness(FakeModel::replying("unused"), FakeModel::replying("unused"));
        let h = listening(h, "Goodbye!");
        let (session, flow) = h
            .assistant
            .handle_command(Session::default(), ConsoleCommand::Microphone, &Console::stdin())
            .await;
        assert_eq!(flow, Flow::Quit);
        assert_eq!(h.text.calls(), 0);
        assert_eq!(session.conversation().len(), 1);
    }

    #[test]
    fn clear_keeps_profile_and_resets_transcript() {
        let mut session = Session::default();
        session.profile_mut().set(ProfileField::Health, "anemia");
        session.conversation.append(Turn::user("hi"));
        session.last_result = Some("hello".into());
        session.clear();
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(session.last_result(), None);
        assert_eq!(session.profile().get(ProfileField::Health), Some("anemia"));
    }
}
