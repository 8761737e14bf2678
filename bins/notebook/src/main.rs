//! Mistake notebook CLI
//!
//! Browse categories, upload photographed questions and export practice
//! papers from the terminal.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod output;

use commands::{auth, categories, paper, questions, recognize};
use context::Context;
use output::OutputFormat;

/// Mistake notebook command-line client
#[derive(Parser)]
#[command(name = "notebook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Settings file (defaults to .notebook.toml, notebook.toml or .config/notebook.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Manage stored questions
    Questions {
        #[command(subcommand)]
        action: QuestionAction,
    },

    /// Recognize text and categories in photographed questions
    Recognize {
        /// Image files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Split a photographed page into individual questions
    Segment {
        /// Image file
        file: PathBuf,
    },

    /// Save segmented questions into the notebook
    Save {
        /// Image URL returned by `segment`
        #[arg(long)]
        image_url: Option<String>,

        /// Category name
        #[arg(long)]
        category: String,

        /// Difficulty (easy, medium, hard)
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// Question as TEXT:CONFIDENCE, repeatable
        #[arg(short, long = "question", required = true)]
        questions: Vec<String>,
    },

    /// Practice papers
    Paper {
        #[command(subcommand)]
        action: PaperAction,
    },

    /// Manage the stored session token
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List all categories
    List,

    /// Show totals
    Stats,

    /// Show one category
    Show {
        /// Category id
        id: String,
    },

    /// List questions of a category
    Questions {
        /// Category id
        id: String,

        /// Only this difficulty
        #[arg(short, long)]
        difficulty: Option<String>,

        /// Only questions containing this keyword
        #[arg(short, long)]
        keyword: Option<String>,

        /// Only questions with this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Create a category
    Create {
        /// Category name
        name: String,

        #[command(flatten)]
        fields: categories::DraftFields,
    },

    /// Replace a category
    Update {
        /// Category id
        id: String,

        /// New name
        name: String,

        #[command(flatten)]
        fields: categories::DraftFields,
    },

    /// Delete a category
    Delete {
        /// Category id
        id: String,
    },
}

#[derive(Subcommand)]
enum QuestionAction {
    /// Delete questions by id
    Delete {
        /// Question ids
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[derive(Subcommand)]
enum PaperAction {
    /// Render a PDF for the given questions
    Export {
        /// Question ids
        #[arg(required = true)]
        ids: Vec<i64>,

        /// Paper title
        #[arg(short, long)]
        title: Option<String>,

        /// Duration in minutes
        #[arg(short, long)]
        duration: Option<u32>,

        /// Total score
        #[arg(short = 's', long)]
        total_score: Option<u32>,

        /// Render the answer sheet instead
        #[arg(long)]
        answers: bool,

        /// Output file (defaults to the generated file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Store a session token
    Login {
        /// Bearer token
        #[arg(long, env = "NOTEBOOK_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Forget the session token
    Logout,

    /// Show whether a token is stored
    Status,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("notebook=debug,notebook_api_client=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = match Context::load(cli.config.as_deref(), cli.format) {
        Ok(ctx) => ctx,
        Err(e) => {
            output::report_error(cli.format == OutputFormat::Json, &e);
            return ExitCode::from(output::exit_code(&e));
        }
    };

    let result = match cli.command {
        Commands::Categories { action } => match action {
            CategoryAction::List => categories::list(&ctx).await,
            CategoryAction::Stats => categories::stats(&ctx).await,
            CategoryAction::Show { id } => categories::show(&ctx, &id).await,
            CategoryAction::Questions {
                id,
                difficulty,
                keyword,
                tag,
            } => categories::questions(&ctx, &id, difficulty.as_deref(), keyword, tag).await,
            CategoryAction::Create { name, fields } => {
                categories::create(&ctx, name, fields).await
            }
            CategoryAction::Update { id, name, fields } => {
                categories::update(&ctx, &id, name, fields).await
            }
            CategoryAction::Delete { id } => categories::delete(&ctx, &id).await,
        },

        Commands::Questions { action } => match action {
            QuestionAction::Delete { ids } => questions::delete(&ctx, &ids).await,
        },

        Commands::Recognize { files } => recognize::images(&ctx, &files).await,

        Commands::Segment { file } => recognize::segment(&ctx, &file).await,

        Commands::Save {
            image_url,
            category,
            difficulty,
            questions,
        } => {
            recognize::save(&ctx, &questions, &category, &difficulty, image_url.as_deref()).await
        }

        Commands::Paper { action } => match action {
            PaperAction::Export {
                ids,
                title,
                duration,
                total_score,
                answers,
                output,
            } => {
                let options = paper::ExportOptions {
                    title,
                    duration,
                    total_score,
                    answers,
                    output,
                };
                paper::export(&ctx, ids, options).await
            }
        },

        Commands::Auth { action } => match action {
            AuthAction::Login { token } => auth::login(&ctx, &token),
            AuthAction::Logout => auth::logout(&ctx),
            AuthAction::Status => auth::status(&ctx),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::report_error(ctx.is_json(), &e);
            ExitCode::from(output::exit_code(&e))
        }
    }
}
