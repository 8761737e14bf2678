//! Recognition, segmentation and saving

use crate::context::Context;
use crate::output::{Status, emit, percent};
use anyhow::{Context as _, Result, bail};
use notebook_api_client::models::{Difficulty, ImageUpload, SelectedQuestion};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// Parse `TEXT:CONFIDENCE`; a missing confidence means 1.0
fn parse_selected(raw: &str) -> Result<SelectedQuestion> {
    match raw.rsplit_once(':') {
        Some((text, confidence)) if confidence.trim().parse::<f64>().is_ok() => {
            let confidence: f64 = confidence.trim().parse()?;
            Ok(SelectedQuestion::new(text.trim(), confidence))
        }
        _ if raw.trim().is_empty() => bail!("question text cannot be empty"),
        _ => Ok(SelectedQuestion::new(raw.trim(), 1.0)),
    }
}

/// `recognize <files...>`
pub async fn images(ctx: &Context, files: &[PathBuf]) -> Result<()> {
    let mut uploads = Vec::with_capacity(files.len());
    for file in files {
        uploads.push(ImageUpload::from_path(file).await?);
    }

    let envelope = ctx
        .client
        .recognition(&ctx.auth)
        .recognize_images(&uploads)
        .await?;
    emit(ctx.is_json(), envelope, |batch| {
        Status::header("🔍 Recognition Results");
        for result in &batch.results {
            println!(
                "  {} {} {}",
                result.image_name.bold(),
                "→".dimmed(),
                result.category.name.cyan()
            );
            println!("    {}", result.recognized_text);
            for candidate in &result.questions {
                println!(
                    "    {} {} · {} · {}",
                    "└─".dimmed(),
                    candidate.subject,
                    candidate.difficulty,
                    candidate.keywords.join(", ").dimmed()
                );
            }
            println!("    confidence {}", percent(result.confidence).dimmed());
        }
        println!();
        println!(
            "  {} images, {} categories",
            batch.total_processed.cyan(),
            batch.categories_found.cyan()
        );
    })
}

/// `segment <file>`
pub async fn segment(ctx: &Context, file: &Path) -> Result<()> {
    let upload = ImageUpload::from_path(file).await?;
    let envelope = ctx
        .client
        .recognition(&ctx.auth)
        .segment_question(&upload)
        .await?;
    emit(ctx.is_json(), envelope, |result| {
        Status::header("✂️  Segmented Questions");
        for question in &result.questions {
            let marker = if question.is_difficult {
                "!".red().to_string()
            } else {
                " ".to_string()
            };
            println!(
                "  {}{:>2}. {} {}",
                marker,
                question.id,
                question.text,
                percent(question.confidence).dimmed()
            );
        }
        println!();
        println!(
            "  {} questions, overall confidence {}",
            result.questions_count.cyan(),
            percent(result.overall_confidence)
        );
        if let Some(url) = &result.image_url {
            println!("  image url: {}", url.dimmed());
        }
    })
}

/// `save --category <c> --question TEXT:CONFIDENCE...`
pub async fn save(
    ctx: &Context,
    raw_questions: &[String],
    category: &str,
    difficulty: &str,
    image_url: Option<&str>,
) -> Result<()> {
    let difficulty: Difficulty = difficulty.parse()?;
    let questions = raw_questions
        .iter()
        .map(|raw| parse_selected(raw).with_context(|| format!("invalid --question \"{raw}\"")))
        .collect::<Result<Vec<_>>>()?;

    let envelope = ctx
        .client
        .recognition(&ctx.auth)
        .save_selected_questions(&questions, category, difficulty, image_url)
        .await?;
    emit(ctx.is_json(), envelope, |result| {
        println!("  Saved {} questions", result.saved_count.cyan());
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selected() {
        let q = parse_selected("1. 计算 2:3 的比值:0.8").unwrap();
        assert_eq!(q.text, "1. 计算 2:3 的比值");
        assert!((q.confidence - 0.8).abs() < f64::EPSILON);

        let q = parse_selected("Why: explain").unwrap();
        assert_eq!(q.text, "Why: explain");
        assert!((q.confidence - 1.0).abs() < f64::EPSILON);

        assert!(parse_selected("  ").is_err());
    }
}
