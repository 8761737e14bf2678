//! Image recognition and upload endpoints
//!
//! Uploads go through the upload transport (long timeout, multipart).

use super::{fetch, read, write};
use crate::auth::AuthContext;
use crate::client::NotebookClient;
use crate::envelope::{Envelope, Operation};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Difficulty, ImageUpload, RecognitionBatch, SaveQuestionsRequest, SaveQuestionsResult,
    SegmentationResult, SelectedQuestion,
};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::info;

const RECOGNIZE_IMAGES: Operation =
    Operation::read("recognize_images", "Recognition complete", "Recognition failed");
const SEGMENT_QUESTION: Operation = Operation::read(
    "segment_question",
    "Question segmentation complete",
    "Question segmentation failed",
);
const SAVE_SELECTED_QUESTIONS: Operation = Operation::write(
    "save_selected_questions",
    "Questions saved",
    "Failed to save questions",
);

fn part(image: &ImageUpload) -> ApiResult<Part> {
    image.validate()?;
    let part = Part::bytes(image.content.clone()).file_name(image.name.clone());
    match image.mime.as_deref() {
        Some(mime) => Ok(part.mime_str(mime)?),
        None => Ok(part),
    }
}

/// Recognition API interface
#[derive(Clone)]
pub struct RecognitionApi {
    client: NotebookClient,
    auth: AuthContext,
}

impl RecognitionApi {
    pub(crate) fn new(client: NotebookClient, auth: AuthContext) -> Self {
        Self { client, auth }
    }

    /// Recognize text, question type and category in a batch of images
    ///
    /// POST /recognition/images, multipart field `images` per file
    pub async fn recognize_images(
        &self,
        images: &[ImageUpload],
    ) -> ApiResult<Envelope<RecognitionBatch>> {
        if images.is_empty() {
            return Err(ApiError::invalid_input("no images to recognize"));
        }
        let mut form = Form::new();
        for image in images {
            form = form.part("images", part(image)?);
        }

        info!(count = images.len(), "Uploading images for recognition");
        let transport = self.client.upload_transport();
        let builder = transport
            .request(Method::POST, "recognition/images")
            .multipart(form);
        let outcome = fetch(transport, builder, &self.auth).await;
        read(
            &RECOGNIZE_IMAGES,
            outcome,
            self.client.config().mock_fallback,
            || self.client.mock().recognize(images),
        )
        .await
    }

    /// Split a photographed page into individual questions
    ///
    /// POST /upload/question-segment, multipart field `file`
    pub async fn segment_question(
        &self,
        image: &ImageUpload,
    ) -> ApiResult<Envelope<SegmentationResult>> {
        let form = Form::new().part("file", part(image)?);

        info!(image = %image.name, bytes = image.content.len(), "Uploading page for segmentation");
        let transport = self.client.upload_transport();
        let builder = transport
            .request(Method::POST, "upload/question-segment")
            .multipart(form);
        let outcome = fetch(transport, builder, &self.auth).await;
        read(
            &SEGMENT_QUESTION,
            outcome,
            self.client.config().mock_fallback,
            || self.client.mock().segment(image),
        )
        .await
    }

    /// Store the segmented questions the student selected
    ///
    /// POST /upload/save-questions
    pub async fn save_selected_questions(
        &self,
        questions: &[SelectedQuestion],
        category: &str,
        difficulty: Difficulty,
        image_url: Option<&str>,
    ) -> ApiResult<Envelope<SaveQuestionsResult>> {
        if questions.is_empty() {
            return Err(ApiError::invalid_input("no questions selected"));
        }
        if category.trim().is_empty() {
            return Err(ApiError::invalid_input("category cannot be empty"));
        }
        if let Some(q) = questions.iter().find(|q| q.text.trim().is_empty()) {
            return Err(ApiError::invalid_input(format!(
                "question text cannot be empty (confidence {})",
                q.confidence
            )));
        }
        if let Some(q) = questions.iter().find(|q| !(0.0..=1.0).contains(&q.confidence)) {
            return Err(ApiError::invalid_input(format!(
                "confidence must be within [0, 1], got {}",
                q.confidence
            )));
        }

        let body = SaveQuestionsRequest {
            questions,
            category: category.trim(),
            difficulty,
            image_url: image_url.filter(|u| !u.trim().is_empty()),
        };
        let transport = self.client.transport();
        let builder = transport
            .request(Method::POST, "upload/save-questions")
            .json(&body);
        write(
            &SAVE_SELECTED_QUESTIONS,
            fetch(transport, builder, &self.auth).await,
        )
    }
}
