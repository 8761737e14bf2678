//! Data model shared by the backend, the mock generators and callers
//!
//! Field names follow the backend's camelCase JSON. A few backend spellings
//! are accepted as aliases (`questionCount`, `content`, `ocrConfidence`).

use crate::error::{ApiError, ApiResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Backend sends `null` for unset strings and lists
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Question difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Easy
    #[serde(alias = "EASY")]
    Easy,
    /// Medium
    #[default]
    #[serde(alias = "MEDIUM")]
    Medium,
    /// Hard
    #[serde(alias = "HARD")]
    Hard,
}

impl Difficulty {
    /// Lowercase wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(ApiError::invalid_input(format!(
                "difficulty must be easy, medium or hard, got \"{other}\""
            ))),
        }
    }
}

// ============================================================================
// Categories
// ============================================================================

/// Question category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Backend identifier
    pub id: i64,
    /// Display name, e.g. "数学 - 二次函数"
    pub name: String,
    /// Free-text description
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Emoji icon
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
    /// Hex color used by the UI
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    /// Number of questions in the category
    #[serde(default, alias = "questionCount")]
    pub count: u64,
    /// Tags shown on the category card
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Last time a question was added or changed
    #[serde(default, alias = "updatedAt")]
    pub last_updated: Option<NaiveDateTime>,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Aggregate counters for the home screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    /// Questions across all categories
    #[serde(default)]
    pub total_questions: u64,
    /// Number of categories
    #[serde(default)]
    pub total_categories: u64,
    /// Questions added today
    #[serde(default)]
    pub today_added: u64,
}

/// Payload for creating or replacing a category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    /// Display name; must not be blank
    pub name: String,
    /// Free-text description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Emoji icon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Hex color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Tags; omitted when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl CategoryDraft {
    /// Draft with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the icon
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the color
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the tags
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub(crate) fn validate(&self) -> ApiResult<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::invalid_input("category name cannot be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Questions
// ============================================================================

/// A recognized question stored in the notebook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Backend identifier
    pub id: i64,
    /// Owning category
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Text recognized from the photo
    #[serde(alias = "content")]
    pub recognized_text: String,
    /// Where the source photo is served
    #[serde(default)]
    pub image_url: Option<String>,
    /// Knowledge-point tags
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Difficulty level
    #[serde(default, deserialize_with = "null_as_default")]
    pub difficulty: Difficulty,
    /// Recognition confidence in `[0, 1]`
    #[serde(default, alias = "ocrConfidence", deserialize_with = "null_as_default")]
    pub confidence: f64,
    /// When the question was saved
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Whether the last practice attempt was correct
    #[serde(default)]
    pub is_correct: bool,
    /// Number of practice attempts
    #[serde(default)]
    pub practice_count: u32,
    /// Time of the last practice attempt
    #[serde(default)]
    pub last_practiced: Option<NaiveDateTime>,
}

/// Filters for listing the questions of a category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionQuery {
    /// Only questions of this difficulty
    pub difficulty: Option<Difficulty>,
    /// Substring of the question text
    pub keyword: Option<String>,
    /// Only questions carrying this tag
    pub tag: Option<String>,
}

impl QuestionQuery {
    /// Query without filters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by difficulty
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Filter by keyword
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Filter by tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Query string pairs for the set filters
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(difficulty) = self.difficulty {
            pairs.push(("difficulty", difficulty.to_string()));
        }
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            pairs.push(("keyword", keyword.to_string()));
        }
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.trim().is_empty()) {
            pairs.push(("tag", tag.to_string()));
        }
        pairs
    }
}

// ============================================================================
// Recognition
// ============================================================================

/// An image to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name sent with the part
    pub name: String,
    /// Raw image bytes
    pub content: Vec<u8>,
    /// MIME type, guessed from the extension when unset
    pub mime: Option<String>,
}

impl ImageUpload {
    /// Image from bytes in memory
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        let name = name.into();
        let mime = guess_mime(&name).map(String::from);
        Self {
            name,
            content,
            mime,
        }
    }

    /// Read an image from disk
    pub async fn from_path(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await.map_err(|e| {
            ApiError::invalid_input(format!("cannot read image {}: {e}", path.display()))
        })?;
        let name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(name, content))
    }

    pub(crate) fn validate(&self) -> ApiResult<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::invalid_input("image name cannot be empty"));
        }
        if self.content.is_empty() {
            return Err(ApiError::invalid_input(format!(
                "image {} has no content",
                self.name
            )));
        }
        Ok(())
    }
}

fn guess_mime(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Question type guessed from an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCandidate {
    /// Question type, e.g. "math"
    #[serde(rename = "type")]
    pub kind: String,
    /// School subject
    pub subject: String,
    /// Estimated difficulty
    #[serde(default, deserialize_with = "null_as_default")]
    pub difficulty: Difficulty,
    /// Knowledge points
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
}

/// Category guessed from an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGuess {
    /// Suggested category key, e.g. "math_quadratic"
    pub id: String,
    /// Suggested category name
    pub name: String,
    /// Subject the category belongs to
    #[serde(default, deserialize_with = "null_as_default")]
    pub parent_category: String,
    /// Classifier confidence in `[0, 1]`
    #[serde(default)]
    pub confidence: f64,
}

/// Recognition output for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    /// Identifier assigned to the uploaded image
    pub image_id: String,
    /// Original file name
    pub image_name: String,
    /// Full recognized text
    #[serde(default, deserialize_with = "null_as_default")]
    pub recognized_text: String,
    /// Question types found on the image
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<QuestionCandidate>,
    /// Suggested category
    pub category: CategoryGuess,
    /// Recognition confidence in `[0, 1]`
    #[serde(default)]
    pub confidence: f64,
}

/// Recognition output for a batch of images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionBatch {
    /// One result per uploaded image
    pub results: Vec<RecognitionResult>,
    /// Images processed
    #[serde(default)]
    pub total_processed: usize,
    /// Distinct categories suggested
    #[serde(default)]
    pub categories_found: usize,
}

/// Position of a question on the photo, in percent of the image
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuestionBounds {
    /// Distance from the top edge
    pub top: f64,
    /// Distance from the left edge
    pub left: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

/// One question cut out of a photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentedQuestion {
    /// Position of the question on the photo, starting at 1
    pub id: u32,
    /// Recognized question text
    pub text: String,
    /// Bounding box on the photo
    #[serde(default)]
    pub bounds: QuestionBounds,
    /// Recognition confidence in `[0, 1]`
    #[serde(default)]
    pub confidence: f64,
    /// Flagged as likely hard for the student
    #[serde(default, alias = "difficult")]
    pub is_difficult: bool,
}

/// Segmentation output for one photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationResult {
    /// Where the uploaded photo is served
    #[serde(default)]
    pub image_url: Option<String>,
    /// Number of questions found
    #[serde(default)]
    pub questions_count: usize,
    /// Mean confidence over all questions
    #[serde(default)]
    pub overall_confidence: f64,
    /// Questions cut out of the photo
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<SegmentedQuestion>,
}

/// A segmented question the student chose to keep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedQuestion {
    /// Question text; must not be blank
    pub text: String,
    /// Recognition confidence in `[0, 1]`
    pub confidence: f64,
}

impl SelectedQuestion {
    /// Keep a question with its recognition confidence
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

impl From<&SegmentedQuestion> for SelectedQuestion {
    fn from(segment: &SegmentedQuestion) -> Self {
        Self::new(segment.text.clone(), segment.confidence)
    }
}

/// Body of `POST /upload/save-questions`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveQuestionsRequest<'a> {
    pub questions: &'a [SelectedQuestion],
    pub category: &'a str,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<&'a str>,
}

/// Outcome of saving selected questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuestionsResult {
    /// Number of questions stored
    #[serde(default)]
    pub saved_count: usize,
    /// The stored questions with their new ids
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<Question>,
}

// ============================================================================
// Test papers
// ============================================================================

/// Which document to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestPaperKind {
    /// Questions only
    #[default]
    Questions,
    /// Answer sheet
    Answers,
}

impl TestPaperKind {
    pub(crate) fn path(self) -> &'static str {
        match self {
            Self::Questions => "test-paper/generate",
            Self::Answers => "test-paper/generate-answers",
        }
    }
}

/// Body of the test paper endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPaperRequest {
    /// Questions to include, in order
    pub question_ids: Vec<i64>,
    /// Paper title; also used for the file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Total score printed on the paper
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<u32>,
}

impl TestPaperRequest {
    /// Paper for the given question ids
    #[must_use]
    pub fn new(question_ids: Vec<i64>) -> Self {
        Self {
            question_ids,
            ..Self::default()
        }
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set duration (minutes) and total score
    #[must_use]
    pub fn with_limits(mut self, duration: u32, total_score: u32) -> Self {
        self.duration = Some(duration);
        self.total_score = Some(total_score);
        self
    }
}

/// Rendered PDF
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPaper {
    /// Suggested file name, e.g. "期中复习.pdf"
    pub file_name: String,
    /// PDF bytes
    #[serde(skip)]
    pub content: Vec<u8>,
    /// Size of `content` in bytes
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_backend_shape() {
        let json = r##"{
            "id": 1,
            "name": "数学",
            "description": null,
            "color": "#E8A855",
            "questionCount": 12,
            "icon": "📐"
        }"##;

        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.id, 1);
        assert_eq!(category.count, 12);
        assert_eq!(category.description, "");
        assert!(category.tags.is_empty());
        assert!(category.created_at.is_none());
    }

    #[test]
    fn test_question_from_backend_dto() {
        let json = r#"{
            "id": 42,
            "content": "已知函数f(x) = x² - 2x + 1，求f(x)的最小值。",
            "imageUrl": "/uploads/a.png",
            "category": "数学",
            "difficulty": "medium",
            "tags": null,
            "ocrConfidence": 0.93,
            "aiConfidence": null,
            "createdAt": "2024-09-01T10:30:00"
        }"#;

        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.id, 42);
        assert!(question.recognized_text.starts_with("已知函数"));
        assert_eq!(question.difficulty, Difficulty::Medium);
        assert!((question.confidence - 0.93).abs() < f64::EPSILON);
        assert!(question.created_at.is_some());
        assert_eq!(question.practice_count, 0);
    }

    #[test]
    fn test_segment_accepts_jackson_boolean_name() {
        let json = r#"{"id":1,"text":"1. 计算","bounds":{"top":5.0,"left":0.0,"width":100.0,"height":20.0},"confidence":0.8,"difficult":true}"#;
        let segment: SegmentedQuestion = serde_json::from_str(json).unwrap();
        assert!(segment.is_difficult);
        assert!((segment.bounds.height - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());

        let parsed: Difficulty = serde_json::from_str("\"EASY\"").unwrap();
        assert_eq!(parsed, Difficulty::Easy);
    }

    #[test]
    fn test_query_pairs_skip_blank() {
        let query = QuestionQuery::new()
            .with_difficulty(Difficulty::Hard)
            .with_keyword(" ");
        assert_eq!(query.pairs(), vec![("difficulty", "hard".to_string())]);
    }

    #[test]
    fn test_draft_serialization_and_validation() {
        let draft = CategoryDraft::new("X");
        assert_eq!(serde_json::to_value(&draft).unwrap(), serde_json::json!({"name": "X"}));
        assert!(draft.validate().is_ok());
        assert!(CategoryDraft::new("  ").validate().is_err());
    }

    #[test]
    fn test_image_upload_validation() {
        let image = ImageUpload::new("page.JPG", vec![0xFF, 0xD8]);
        assert_eq!(image.mime.as_deref(), Some("image/jpeg"));
        assert!(image.validate().is_ok());

        assert!(ImageUpload::new("empty.png", Vec::new()).validate().is_err());
        assert!(ImageUpload::new("", vec![1]).validate().is_err());
    }

    #[test]
    fn test_image_upload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.PNG");
        std::fs::write(&path, [0x89, 0x50, 0x4E, 0x47]).unwrap();

        let image = tokio_test::block_on(ImageUpload::from_path(&path)).unwrap();
        assert_eq!(image.name, "photo.PNG");
        assert_eq!(image.mime.as_deref(), Some("image/png"));
        assert_eq!(image.content.len(), 4);

        let missing = tokio_test::block_on(ImageUpload::from_path(dir.path().join("none.png")));
        assert!(matches!(missing, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_save_request_shape() {
        let questions = [SelectedQuestion::new("1. 计算 2+3", 0.9)];
        let body = SaveQuestionsRequest {
            questions: &questions,
            category: "数学",
            difficulty: Difficulty::Easy,
            image_url: Some("/uploads/p.png"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["imageUrl"], "/uploads/p.png");
        assert_eq!(json["difficulty"], "easy");
        assert_eq!(json["questions"][0]["text"], "1. 计算 2+3");
    }
}
