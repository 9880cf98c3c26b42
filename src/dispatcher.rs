/*
 * @file dispatcher.rs
 * @brief Routing of chat submissions to the text or image model
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

//! Query dispatch.
//!
//! A [`Submission`] is what the user handed in for one turn. It collapses into
//! exactly one [`Request`]: an attached image always wins over typed text.
//! [`Dispatcher::dispatch`] then makes a single model call and reports the
//! outcome as a tagged result rather than raising.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::DispatchError;
use crate::model::{TextGenerator, VisionGenerator};
use crate::prompt::{build_image_prompt, build_text_prompt, Profile};
use crate::vision::decode_image;

/// File extensions accepted for uploads.
pub const ACCEPTED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// An uploaded image, undecoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// Display name, usually the file name. Shown in the transcript only.
    pub name: String,
    /// Raw file contents; decoding happens at dispatch time.
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Wraps bytes that already came from an upload.
    ///
    /// # Arguments
    /// * `name` - Label recorded in the transcript.
    /// * `bytes` - Undecoded image contents. Not validated here.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Reads an image file from disk, checking its extension against
    /// [`ACCEPTED_IMAGE_EXTENSIONS`].
    ///
    /// # Errors
    /// Returns an I/O error when the file cannot be read or has an
    /// unsupported extension. Content is not decoded here.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !ACCEPTED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "{} is not a {} file",
                    path.display(),
                    ACCEPTED_IMAGE_EXTENSIONS.join("/")
                ),
            ));
        }
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }
}

/// The single request derived from a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Text { query: String },
    Image { image: Attachment },
}

/// Everything the user supplied for one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Submission {
    /// Typed or transcribed question, possibly blank.
    pub text: Option<String>,
    /// Image attached for this turn only.
    pub image: Option<Attachment>,
}

impl Submission {
    /// A text-only submission.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }

    /// Transcript entry for the user's side of the turn.
    ///
    /// Typed text is recorded even when the image path ignores it.
    pub fn user_turn_text(&self) -> Option<String> {
        let typed = self.typed_text();
        match (&self.image, typed) {
            (Some(image), Some(text)) => Some(format!("{} [image: {}]", text, image.name)),
            (Some(image), None) => Some(format!("[image: {}]", image.name)),
            (None, Some(text)) => Some(text.to_string()),
            (None, None) => None,
        }
    }

    /// Collapses the submission into one request.
    ///
    /// An attached image takes precedence unconditionally. Returns `None`
    /// when there is neither an image nor non-blank text.
    pub fn into_request(self) -> Option<Request> {
        if let Some(image) = self.image {
            return Some(Request::Image { image });
        }
        let query = self.text.filter(|text| !text.trim().is_empty())?;
        Some(Request::Text { query })
    }

    fn typed_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.trim().is_empty())
    }
}

/// Routes requests to the configured models.
#[derive(Clone)]
pub struct Dispatcher {
    text_model: Arc<dyn TextGenerator>,
    vision_model: Arc<dyn VisionGenerator>,
}

impl Dispatcher {
    pub fn new(text_model: Arc<dyn TextGenerator>, vision_model: Arc<dyn VisionGenerator>) -> Self {
        Self {
            text_model,
            vision_model,
        }
    }

    /// Runs one request against the matching model.
    ///
    /// Exactly one outbound call is made; there is no retry.
    ///
    /// # Returns
    /// The model's text, or a [`DispatchError`] whose display form is the
    /// user-facing error string.
    pub async fn dispatch(&self, request: &Request, profile: &Profile) -> Result<String, DispatchError> {
        match request {
            Request::Text { query } => self.dispatch_text(query, profile).await,
            Request::Image { image } => self.dispatch_image(&image.bytes, profile).await,
        }
    }

    async fn dispatch_text(&self, query: &str, profile: &Profile) -> Result<String, DispatchError> {
        info!(chars = query.len(), "dispatching text query");
        let prompt = build_text_prompt(query, profile);
        self.text_model
            .generate(&prompt)
            .await
            .map_err(DispatchError::Model)
    }

    async fn dispatch_image(&self, blob: &[u8], profile: &Profile) -> Result<String, DispatchError> {
        let image = decode_image(blob).map_err(DispatchError::ImageDecode)?;
        info!(
            mime = image.mime_type,
            width = image.width,
            height = image.height,
            "dispatching image query"
        );
        let prompt = build_image_prompt(profile);
        debug!(chars = prompt.len(), "image prompt rendered");
        self.vision_model
            .generate_with_image(&prompt, &image)
            .await
            .map_err(DispatchError::ImageModel)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::prompt::REFUSAL_MESSAGE;
    use crate::vision::tests::png_bytes;
    use crate::vision::DecodedImage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records prompts and answers with a canned result.
    pub(crate) struct FakeModel {
        pub(crate) reply: Result<String, ModelError>,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl FakeModel {
        pub(crate) fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing(err: ModelError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for FakeModel {
        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    #[async_trait]
    impl VisionGenerator for FakeModel {
        async fn generate_with_image(
            &self,
            prompt: &str,
            _image: &DecodedImage,
        ) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn dispatcher(text: &Arc<FakeModel>, vision: &Arc<FakeModel>) -> Dispatcher {
        Dispatcher::new(text.clone(), vision.clone())
    }

    #[test]
    fn image_wins_over_typed_text() {
        let submission = Submission {
            text: Some("What should I eat?".into()),
            image: Some(Attachment::new("meal.png", vec![1, 2, 3])),
        };
        assert_eq!(
            submission.into_request(),
            Some(Request::Image {
                image: Attachment::new("meal.png", vec![1, 2, 3])
            })
        );
    }

    #[test]
    fn blank_text_without_image_yields_no_request() {
        assert_eq!(Submission::text("   ").into_request(), None);
        assert_eq!(Submission::default().into_request(), None);
    }

    #[test]
    fn user_turn_records_text_and_image_name() {
        let submission = Submission {
            text: Some("Is this healthy?".into()),
            image: Some(Attachment::new("lunch.jpg", Vec::new())),
        };
        assert_eq!(
            submission.user_turn_text().as_deref(),
            Some("Is this healthy? [image: lunch.jpg]")
        );
        assert_eq!(Submission::text("hi").user_turn_text().as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn text_query_goes_to_text_model() {
        let text = FakeModel::replying("Have a protein shake.");
        let vision = FakeModel::replying("unused");
        let request = Submission::text("What should I eat post-workout?")
            .into_request()
            .unwrap();
        let result = dispatcher(&text, &vision)
            .dispatch(&request, &Profile::default())
            .await;
        assert_eq!(result.unwrap(), "Have a protein shake.");
        assert_eq!(vision.calls(), 0);
        let prompts = text.prompts.lock().unwrap();
        assert!(prompts[0].contains("What should I eat post-workout?"));
        assert!(prompts[0].contains(REFUSAL_MESSAGE));
    }

    #[tokio::test]
    async fn image_and_text_together_use_image_path_only() {
        let text = FakeModel::replying("text answer");
        let vision = FakeModel::replying("Grilled salmon, about 450 kcal.");
        let request = Submission {
            text: Some("ignore me".into()),
            image: Some(Attachment::new("meal.png", png_bytes(2, 2))),
        }
        .into_request()
        .unwrap();
        let result = dispatcher(&text, &vision)
            .dispatch(&request, &Profile::default())
            .await;
        assert_eq!(result.unwrap(), "Grilled salmon, about 450 kcal.");
        assert_eq!(text.calls(), 0);
        assert_eq!(vision.calls(), 1);
        assert!(!vision.prompts.lock().unwrap()[0].contains("ignore me"));
    }

    #[tokio::test]
    async fn model_timeout_becomes_plain_error_string() {
        let text = FakeModel::failing(ModelError::Transport("timeout".into()));
        let vision = FakeModel::replying("unused");
        let request = Request::Text {
            query: "Low-carb lunch ideas".into(),
        };
        let err = dispatcher(&text, &vision)
            .dispatch(&request, &Profile::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: timeout");
    }

    #[tokio::test]
    async fn undecodable_image_reports_image_processing_error() {
        let text = FakeModel::replying("unused");
        let vision = FakeModel::replying("unused");
        let request = Request::Image {
            image: Attachment::new("notes.png", b"plain text, not pixels".to_vec()),
        };
        let err = dispatcher(&text, &vision)
            .dispatch(&request, &Profile::default())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Image processing error:"));
        assert_eq!(vision.calls(), 0);
    }

    #[tokio::test]
    async fn vision_model_failure_reports_image_processing_error() {
        let text = FakeModel::replying("unused");
        let vision = FakeModel::failing(ModelError::Api {
            status: 429,
            message: "quota exceeded".into(),
        });
        let request = Request::Image {
            image: Attachment::new("meal.png", png_bytes(1, 1)),
        };
        let err = dispatcher(&text, &vision)
            .dispatch(&request, &Profile::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Image processing error: quota exceeded (HTTP 429)"
        );
    }

    #[test]
    fn from_path_rejects_unlisted_extension() {
        let err = Attachment::from_path(Path::new("meal.gif")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[test]
    fn from_path_reads_accepted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Label.PNG");
        std::fs::write(&path, png_bytes(1, 1)).unwrap();
        let attachment = Attachment::from_path(&path).unwrap();
        assert_eq!(attachment.name, "Label.PNG");
        assert_eq!(attachment.bytes, png_bytes(1, 1));
    }
}
