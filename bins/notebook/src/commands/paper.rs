//! Practice paper export

use crate::context::Context;
use crate::output::{Status, format_size};
use anyhow::{Context as _, Result};
use notebook_api_client::models::{TestPaperKind, TestPaperRequest};
use std::path::PathBuf;
use tracing::debug;

/// Options for `paper export`
pub struct ExportOptions {
    pub title: Option<String>,
    pub duration: Option<u32>,
    pub total_score: Option<u32>,
    pub answers: bool,
    pub output: Option<PathBuf>,
}

/// `paper export <ids...>`
pub async fn export(ctx: &Context, ids: Vec<i64>, options: ExportOptions) -> Result<()> {
    let request = TestPaperRequest {
        question_ids: ids,
        title: options.title,
        duration: options.duration,
        total_score: options.total_score,
    };
    let kind = if options.answers {
        TestPaperKind::Answers
    } else {
        TestPaperKind::Questions
    };

    let envelope = ctx
        .client
        .test_papers(&ctx.auth)
        .export_test_paper(&request, kind)
        .await?;
    let message = envelope.message.clone();
    let json = ctx.is_json();
    if json && !envelope.success {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    let Some(paper) = envelope.into_result()? else {
        return Ok(());
    };

    let path = options
        .output
        .unwrap_or_else(|| PathBuf::from(&paper.file_name));
    tokio::fs::write(&path, &paper.content)
        .await
        .with_context(|| format!("cannot write {}", path.display()))?;
    debug!(path = %path.display(), bytes = paper.size, "Wrote test paper");

    if json {
        let report = serde_json::json!({
            "success": true,
            "message": message,
            "data": { "path": path.display().to_string(), "fileName": paper.file_name, "size": paper.size },
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        Status::success(&format!(
            "{} → {} ({})",
            message.as_deref().unwrap_or("Test paper generated"),
            path.display(),
            format_size(paper.size)
        ));
    }
    Ok(())
}
