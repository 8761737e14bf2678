//! Deterministic mock data used as read fallback
//!
//! Generators are pure functions of an index or identifier and use a fixed
//! base timestamp, so repeated calls return identical data. [`MockBackend`]
//! wraps them with an artificial, non-blocking delay.

use crate::models::{
    Category, CategoryGuess, CategoryStats, Difficulty, ImageUpload, Question, QuestionBounds,
    QuestionCandidate, RecognitionBatch, RecognitionResult, SegmentationResult, SegmentedQuestion,
};
use chrono::{DateTime, NaiveDateTime};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::debug;

/// 2024-09-01T08:00:00Z
const BASE_TIMESTAMP: i64 = 1_725_177_600;

/// Delay for category reads
pub const CATEGORY_LATENCY: Duration = Duration::from_millis(300);
/// Delay for image recognition
pub const RECOGNITION_LATENCY: Duration = Duration::from_millis(2000);
/// Delay for question segmentation
pub const SEGMENTATION_LATENCY: Duration = Duration::from_millis(2500);

fn at(minutes: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(BASE_TIMESTAMP + minutes * 60, 0).map(|t| t.naive_utc())
}

struct CategorySeed {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    color: &'static str,
    count: u64,
    tags: &'static [&'static str],
    questions: &'static [(&'static str, Difficulty)],
}

const CATEGORY_SEEDS: &[CategorySeed] = &[
    CategorySeed {
        name: "数学 - 二次函数",
        description: "二次函数的图像、性质与最值问题",
        icon: "📐",
        color: "#E8A855",
        count: 12,
        tags: &["函数", "最值", "配方法"],
        questions: &[
            ("已知函数f(x) = x² - 2x + 1，求f(x)的最小值。", Difficulty::Medium),
            ("求二次函数y = -x² + 4x - 3的顶点坐标。", Difficulty::Easy),
            ("若抛物线y = ax² + bx + c经过点(1, 0)和(3, 0)，且最大值为2，求a, b, c。", Difficulty::Hard),
        ],
    },
    CategorySeed {
        name: "物理 - 力学",
        description: "牛顿运动定律与受力分析",
        icon: "⚡",
        color: "#5B8FF9",
        count: 8,
        tags: &["牛顿第二定律", "受力分析"],
        questions: &[
            ("一质量为2kg的物体在水平面上受到10N的水平推力，求物体的加速度。", Difficulty::Easy),
            ("斜面倾角为30°，物体沿光滑斜面下滑，求其加速度。", Difficulty::Medium),
            ("两物体用轻绳连接跨过定滑轮，质量分别为3kg和5kg，求绳的拉力。", Difficulty::Hard),
        ],
    },
    CategorySeed {
        name: "化学 - 计算题",
        description: "摩尔质量与化学方程式计算",
        icon: "🧪",
        color: "#5AD8A6",
        count: 6,
        tags: &["摩尔质量", "化学反应"],
        questions: &[
            ("化学反应CH₄ + 2O₂ → CO₂ + 2H₂O中，CH₄的摩尔质量是多少？", Difficulty::Easy),
            ("完全燃烧16g甲烷需要标准状况下多少升氧气？", Difficulty::Medium),
            ("将10g碳酸钙与足量盐酸反应，生成二氧化碳的质量是多少？", Difficulty::Medium),
        ],
    },
    CategorySeed {
        name: "英语 - 语法",
        description: "时态、介词与从句",
        icon: "🇬🇧",
        color: "#F6BD16",
        count: 10,
        tags: &["时态", "介词"],
        questions: &[
            ("Complete the sentence: I have been living here _____ five years.", Difficulty::Medium),
            ("Choose the correct form: She _____ (go) to school by bus every day.", Difficulty::Easy),
            ("Combine the sentences with a relative clause: This is the book. I bought it yesterday.", Difficulty::Medium),
        ],
    },
    CategorySeed {
        name: "语文 - 阅读理解",
        description: "现代文阅读与主旨概括",
        icon: "📚",
        color: "#E86452",
        count: 5,
        tags: &["阅读", "概括"],
        questions: &[
            ("阅读短文，概括作者在第二段中表达的主要观点。", Difficulty::Medium),
            ("文中画线句子运用了什么修辞手法？有什么表达效果？", Difficulty::Easy),
            ("结合全文，分析题目“远方”的深层含义。", Difficulty::Hard),
        ],
    },
    CategorySeed {
        name: "生物 - 细胞",
        description: "细胞结构与细胞分裂",
        icon: "🌱",
        color: "#6DC8EC",
        count: 4,
        tags: &["细胞结构", "有丝分裂"],
        questions: &[
            ("植物细胞与动物细胞在结构上有哪些主要区别？", Difficulty::Easy),
            ("简述有丝分裂各时期染色体的行为变化。", Difficulty::Medium),
            ("线粒体和叶绿体在能量转换中分别起什么作用？", Difficulty::Medium),
        ],
    },
];

fn build_category(index: usize, id: i64) -> Category {
    let seed = &CATEGORY_SEEDS[index % CATEGORY_SEEDS.len()];
    let offset = i64::try_from(index % CATEGORY_SEEDS.len()).unwrap_or_default();
    Category {
        id,
        name: seed.name.to_string(),
        description: seed.description.to_string(),
        icon: seed.icon.to_string(),
        color: seed.color.to_string(),
        count: seed.count,
        tags: seed.tags.iter().map(|t| (*t).to_string()).collect(),
        last_updated: at(24 * 60 + offset * 90),
        created_at: at(offset * 30),
    }
}

/// Category at `index`, wrapping around the seed list
#[must_use]
pub fn category(index: usize) -> Category {
    let id = i64::try_from(index % CATEGORY_SEEDS.len()).unwrap_or_default() + 1;
    build_category(index, id)
}

/// All mock categories
#[must_use]
pub fn categories() -> Vec<Category> {
    (0..CATEGORY_SEEDS.len()).map(category).collect()
}

fn seed_index(category_id: &str) -> (usize, Option<i64>) {
    let len = CATEGORY_SEEDS.len();
    match category_id.trim().parse::<i64>() {
        Ok(n) => {
            let index = usize::try_from(n.unsigned_abs().saturating_sub(1) % len as u64)
                .unwrap_or_default();
            (index, Some(n))
        }
        Err(_) => {
            let hash = category_id
                .bytes()
                .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(usize::from(b)));
            (hash % len, None)
        }
    }
}

/// Category for an identifier
///
/// Numeric ids map onto the seed list in order and keep the requested id.
/// Other identifiers are hashed onto a seed.
#[must_use]
pub fn category_for_id(category_id: &str) -> Category {
    match seed_index(category_id) {
        (index, Some(id)) => build_category(index, id),
        (index, None) => category(index),
    }
}

/// Counters matching [`categories`]
#[must_use]
pub fn category_stats() -> CategoryStats {
    CategoryStats {
        total_questions: CATEGORY_SEEDS.iter().map(|s| s.count).sum(),
        total_categories: CATEGORY_SEEDS.len() as u64,
        today_added: 3,
    }
}

/// Questions belonging to a category
#[must_use]
pub fn category_questions(category_id: &str) -> Vec<Question> {
    let category = category_for_id(category_id);
    let (index, _) = seed_index(category_id);
    let seed = &CATEGORY_SEEDS[index];
    // Ids too large to scale fall back to seed-based question ids
    let base = category
        .id
        .checked_mul(100)
        .filter(|b| b.checked_add(100).is_some())
        .unwrap_or((index as i64 + 1) * 100);

    seed.questions
        .iter()
        .zip(0i64..)
        .map(|((text, difficulty), i)| Question {
            id: base + i + 1,
            category_id: Some(category.id),
            recognized_text: (*text).to_string(),
            image_url: Some(format!("/uploads/mock/category-{}-{}.png", category.id, i + 1)),
            tags: seed.tags.iter().take(2).map(|t| (*t).to_string()).collect(),
            difficulty: *difficulty,
            confidence: 0.95 - 0.05 * i as f64,
            created_at: at(2 * 24 * 60 + i * 45),
            is_correct: i == 0,
            practice_count: u32::try_from(i).unwrap_or_default() * 2,
            last_practiced: if i == 0 { None } else { at(3 * 24 * 60 + i * 60) },
        })
        .collect()
}

const RECOGNITION_TEXTS: [&str; 4] = [
    "已知函数f(x) = x² - 2x + 1，求f(x)的最小值。",
    "一质量为2kg的物体在水平面上受到10N的水平推力，求物体的加速度。",
    "化学反应CH₄ + 2O₂ → CO₂ + 2H₂O中，CH₄的摩尔质量是多少？",
    "Complete the sentence: I have been living here _____ five years.",
];

const RECOGNITION_CONFIDENCE: [f64; 4] = [0.92, 0.87, 0.81, 0.89];

fn question_candidate(index: usize) -> QuestionCandidate {
    let (kind, subject, difficulty, keywords): (&str, &str, Difficulty, [&str; 3]) =
        match index % 4 {
            0 => ("math", "数学", Difficulty::Medium, ["二次函数", "最值", "配方法"]),
            1 => ("physics", "物理", Difficulty::Easy, ["牛顿第二定律", "力与运动", "加速度"]),
            2 => ("chemistry", "化学", Difficulty::Easy, ["摩尔质量", "化学反应", "计算"]),
            _ => ("english", "英语", Difficulty::Medium, ["现在完成进行时", "介词", "for"]),
        };
    QuestionCandidate {
        kind: kind.to_string(),
        subject: subject.to_string(),
        difficulty,
        keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
    }
}

fn category_guess(index: usize) -> CategoryGuess {
    let (id, name, parent, confidence) = match index % 4 {
        0 => ("math_quadratic", "数学-二次函数", "数学", 0.95),
        1 => ("physics_mechanics", "物理-力学", "物理", 0.88),
        2 => ("chemistry_calculation", "化学-计算题", "化学", 0.82),
        _ => ("english_grammar", "英语-语法", "英语", 0.90),
    };
    CategoryGuess {
        id: id.to_string(),
        name: name.to_string(),
        parent_category: parent.to_string(),
        confidence,
    }
}

/// Recognition result for the image at `index`
#[must_use]
pub fn recognition_result(index: usize, image_name: &str) -> RecognitionResult {
    RecognitionResult {
        image_id: format!("img_{BASE_TIMESTAMP}_{index}"),
        image_name: image_name.to_string(),
        recognized_text: RECOGNITION_TEXTS[index % RECOGNITION_TEXTS.len()].to_string(),
        questions: vec![question_candidate(index)],
        category: category_guess(index),
        confidence: RECOGNITION_CONFIDENCE[index % RECOGNITION_CONFIDENCE.len()],
    }
}

/// Recognition batch for a list of image names
#[must_use]
pub fn recognition_batch<S: AsRef<str>>(image_names: &[S]) -> RecognitionBatch {
    let results: Vec<_> = image_names
        .iter()
        .enumerate()
        .map(|(i, name)| recognition_result(i, name.as_ref()))
        .collect();
    let categories_found = results
        .iter()
        .map(|r| r.category.name.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    RecognitionBatch {
        total_processed: results.len(),
        categories_found,
        results,
    }
}

/// Segmentation of one photo into questions
#[must_use]
pub fn segmentation(image_name: &str) -> SegmentationResult {
    let segments = [
        ("1. 已知函数f(x) = x² - 2x + 1，求f(x)的最小值。", 0.94, false),
        ("2. 解方程组：x + y = 5，2x - y = 1。", 0.91, false),
        ("3. 若抛物线y = ax² + bx + c经过点(1, 0)和(3, 0)，且最大值为2，求a, b, c。", 0.78, true),
    ];
    let questions: Vec<_> = segments
        .iter()
        .zip(0u32..)
        .map(|((text, confidence, is_difficult), i)| SegmentedQuestion {
            id: i + 1,
            text: (*text).to_string(),
            bounds: QuestionBounds {
                top: 5.0 + f64::from(i) * 30.0,
                left: 4.0,
                width: 92.0,
                height: 26.0,
            },
            confidence: *confidence,
            is_difficult: *is_difficult,
        })
        .collect();
    let overall_confidence =
        questions.iter().map(|q| q.confidence).sum::<f64>() / questions.len() as f64;

    SegmentationResult {
        image_url: Some(format!("/uploads/mock/{image_name}")),
        questions_count: questions.len(),
        overall_confidence,
        questions,
    }
}

/// Mock generators with artificial latency
#[derive(Debug, Clone, Copy, Default)]
pub struct MockBackend {
    latency: Option<Duration>,
}

impl MockBackend {
    /// Use `latency` for every call instead of the per-operation defaults
    #[must_use]
    pub fn new(latency: Option<Duration>) -> Self {
        Self { latency }
    }

    async fn delay(&self, default: Duration) {
        let latency = self.latency.unwrap_or(default);
        if !latency.is_zero() {
            debug!(latency_ms = latency.as_millis(), "Simulating backend latency");
            tokio::time::sleep(latency).await;
        }
    }

    /// Mock `GET /categories`
    pub async fn categories(&self) -> Vec<Category> {
        self.delay(CATEGORY_LATENCY).await;
        categories()
    }

    /// Mock `GET /categories/stats`
    pub async fn category_stats(&self) -> CategoryStats {
        self.delay(CATEGORY_LATENCY).await;
        category_stats()
    }

    /// Mock `GET /categories/{id}`
    pub async fn category_detail(&self, category_id: &str) -> Category {
        self.delay(CATEGORY_LATENCY).await;
        category_for_id(category_id)
    }

    /// Mock questions of a category
    pub async fn category_questions(&self, category_id: &str) -> Vec<Question> {
        self.delay(CATEGORY_LATENCY).await;
        category_questions(category_id)
    }

    /// Mock `POST /recognition/images`
    pub async fn recognize(&self, images: &[ImageUpload]) -> RecognitionBatch {
        self.delay(RECOGNITION_LATENCY).await;
        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        recognition_batch(&names)
    }

    /// Mock `POST /upload/question-segment`
    pub async fn segment(&self, image: &ImageUpload) -> SegmentationResult {
        self.delay(SEGMENTATION_LATENCY).await;
        segmentation(&image.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_categories_are_deterministic() {
        let first = categories();
        let second = categories();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
        assert!(first.iter().all(|c| !c.tags.is_empty()));
    }

    #[test]
    fn test_category_for_numeric_id() {
        let category = category_for_id("1");
        assert_eq!(category.id, 1);
        assert_eq!(category.name, "数学 - 二次函数");

        let wrapped = category_for_id("8");
        assert_eq!(wrapped.id, 8);
        assert_eq!(wrapped.name, "物理 - 力学");
    }

    #[test]
    fn test_category_for_text_id_is_stable() {
        assert_eq!(category_for_id("math"), category_for_id("math"));
    }

    #[test]
    fn test_stats_match_categories() {
        let stats = category_stats();
        let total: u64 = categories().iter().map(|c| c.count).sum();
        assert_eq!(stats.total_questions, total);
        assert_eq!(stats.total_categories, 6);
    }

    #[test]
    fn test_category_questions_with_huge_id() {
        let id = i64::MAX.to_string();
        let questions = category_questions(&id);
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| q.category_id == Some(i64::MAX)));

        let mut ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|&q| q > 0));

        assert_eq!(category_questions("100000000000000000").len(), 3);
        assert_eq!(category_questions(&i64::MIN.to_string()).len(), 3);
    }

    #[test]
    fn test_category_questions_belong_to_category() {
        let questions = category_questions("2");
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| q.category_id == Some(2)));
        assert!(questions.iter().all(|q| (0.0..=1.0).contains(&q.confidence)));
        assert!(questions[0].recognized_text.contains("2kg"));
    }

    #[test]
    fn test_recognition_batch_cycles_through_seeds() {
        let batch = recognition_batch(&["a.png", "b.png", "c.png", "d.png", "e.png"]);
        assert_eq!(batch.total_processed, 5);
        assert_eq!(batch.categories_found, 4);
        assert_eq!(batch.results[4].category.id, "math_quadratic");
        assert_eq!(batch.results[1].questions[0].kind, "physics");
        assert_eq!(batch.results[2].image_name, "c.png");
    }

    #[test]
    fn test_segmentation_counts() {
        let result = segmentation("page.jpg");
        assert_eq!(result.questions_count, result.questions.len());
        assert!(result.overall_confidence > 0.8 && result.overall_confidence < 0.9);
        assert_eq!(result.image_url.as_deref(), Some("/uploads/mock/page.jpg"));
    }

    #[test]
    fn test_mock_shape_matches_backend_json() {
        let json = serde_json::to_string(&category(0)).unwrap();
        let parsed: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, category(0));
    }

    #[tokio::test]
    async fn test_zero_latency_override() {
        let backend = MockBackend::new(Some(Duration::ZERO));
        let start = Instant::now();
        let image = ImageUpload::new("p.png", vec![1]);
        let result = backend.segment(&image).await;
        assert!(start.elapsed() < SEGMENTATION_LATENCY);
        assert_eq!(result.questions_count, 3);
    }

    #[tokio::test]
    async fn test_latency_applies() {
        let latency = Duration::from_millis(20);
        let backend = MockBackend::new(Some(latency));
        let start = Instant::now();
        backend.categories().await;
        assert!(start.elapsed() >= latency);
    }
}
