//! Category commands

use crate::context::Context;
use crate::output::{Status, emit, percent};
use anyhow::Result;
use clap::Args;
use notebook_api_client::models::{Category, CategoryDraft, Difficulty, Question, QuestionQuery};
use owo_colors::OwoColorize;

/// Optional category fields shared by `create` and `update`
#[derive(Debug, Args)]
pub struct DraftFields {
    /// Description
    #[arg(short, long)]
    description: Option<String>,

    /// Icon (an emoji works well)
    #[arg(short, long)]
    icon: Option<String>,

    /// Color, e.g. "#E8A855"
    #[arg(long)]
    color: Option<String>,

    /// Tag, repeatable
    #[arg(short, long = "tag")]
    tags: Vec<String>,
}

impl DraftFields {
    fn into_draft(self, name: String) -> CategoryDraft {
        let mut draft = CategoryDraft::new(name).with_tags(self.tags);
        draft.description = self.description;
        draft.icon = self.icon;
        draft.color = self.color;
        draft
    }
}

fn print_category_row(category: &Category) {
    let icon = if category.icon.is_empty() { "•" } else { category.icon.as_str() };
    println!(
        "  {:>4}  {} {:<24} {:>4} {}",
        category.id.dimmed(),
        icon,
        category.name,
        category.count.cyan(),
        "questions".dimmed()
    );
}

fn print_question(question: &Question) {
    let difficulty = match question.difficulty {
        Difficulty::Easy => "easy".green().to_string(),
        Difficulty::Medium => "medium".yellow().to_string(),
        Difficulty::Hard => "hard".red().to_string(),
    };
    println!(
        "  {:>6}  [{}] {} {}",
        question.id.dimmed(),
        difficulty,
        question.recognized_text,
        percent(question.confidence).dimmed()
    );
    if !question.tags.is_empty() {
        println!("          {}", question.tags.join(", ").dimmed());
    }
}

/// `categories list`
pub async fn list(ctx: &Context) -> Result<()> {
    let envelope = ctx.client.categories(&ctx.auth).get_categories().await?;
    emit(ctx.is_json(), envelope, |categories| {
        Status::header("📒 Categories");
        if categories.is_empty() {
            Status::info("No categories yet");
        }
        for category in categories {
            print_category_row(category);
        }
    })
}

/// `categories stats`
pub async fn stats(ctx: &Context) -> Result<()> {
    let envelope = ctx.client.categories(&ctx.auth).get_category_stats().await?;
    emit(ctx.is_json(), envelope, |stats| {
        Status::header("📊 Notebook Statistics");
        println!("  Questions:    {}", stats.total_questions.cyan());
        println!("  Categories:   {}", stats.total_categories.cyan());
        println!("  Added today:  {}", stats.today_added.cyan());
    })
}

/// `categories show <id>`
pub async fn show(ctx: &Context, id: &str) -> Result<()> {
    let envelope = ctx.client.categories(&ctx.auth).get_category_detail(id).await?;
    emit(ctx.is_json(), envelope, |category| {
        Status::header(&format!("{} {}", category.icon, category.name));
        if !category.description.is_empty() {
            println!("  {}", category.description);
        }
        println!("  Questions:  {}", category.count.cyan());
        if !category.tags.is_empty() {
            println!("  Tags:       {}", category.tags.join(", "));
        }
        if let Some(updated) = category.last_updated {
            println!("  Updated:    {}", updated.format("%Y-%m-%d %H:%M").dimmed());
        }
    })
}

/// `categories questions <id>`
pub async fn questions(
    ctx: &Context,
    id: &str,
    difficulty: Option<&str>,
    keyword: Option<String>,
    tag: Option<String>,
) -> Result<()> {
    let mut query = QuestionQuery::new();
    if let Some(difficulty) = difficulty {
        query = query.with_difficulty(difficulty.parse()?);
    }
    query.keyword = keyword;
    query.tag = tag;

    let envelope = ctx
        .client
        .categories(&ctx.auth)
        .get_category_questions(id, &query)
        .await?;
    emit(ctx.is_json(), envelope, |questions| {
        Status::header(&format!("📝 Questions in category {id}"));
        if questions.is_empty() {
            Status::info("No questions match");
        }
        for question in questions {
            print_question(question);
        }
    })
}

/// `categories create <name>`
pub async fn create(ctx: &Context, name: String, fields: DraftFields) -> Result<()> {
    let draft = fields.into_draft(name);
    let envelope = ctx.client.categories(&ctx.auth).create_category(&draft).await?;
    emit(ctx.is_json(), envelope, print_category_row)
}

/// `categories update <id> <name>`
pub async fn update(ctx: &Context, id: &str, name: String, fields: DraftFields) -> Result<()> {
    let draft = fields.into_draft(name);
    let envelope = ctx
        .client
        .categories(&ctx.auth)
        .update_category(id, &draft)
        .await?;
    emit(ctx.is_json(), envelope, print_category_row)
}

/// `categories delete <id>`
pub async fn delete(ctx: &Context, id: &str) -> Result<()> {
    let envelope = ctx.client.categories(&ctx.auth).delete_category(id).await?;
    emit(ctx.is_json(), envelope, |_| {})
}
