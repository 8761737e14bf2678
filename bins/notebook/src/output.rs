//! Terminal output helpers
//!
//! Text output is human oriented. JSON output prints the envelope exactly as
//! the client returned it, so scripts see `{success, data, message}`.

use anyhow::Result;
use clap::ValueEnum;
use notebook_api_client::{ApiError, Envelope, ErrorKind, Failure};
use notebook_core::error::exit_codes;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("  {}", message.blue().bold());
        println!("  {}", "─".repeat(60).dimmed());
    }
}

/// Format a file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Format a confidence in `[0, 1]` as a percentage
pub fn percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

/// Print an envelope and turn a failed one into an error
///
/// `render` runs for successful text output that carries data.
pub fn emit<T: Serialize>(
    json: bool,
    envelope: Envelope<T>,
    render: impl FnOnce(&T),
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }

    let message = envelope.message.clone();
    let data = envelope.into_result()?;

    if !json {
        if let Some(data) = &data {
            render(data);
        }
        if let Some(message) = message {
            println!();
            Status::success(&message);
        }
    }
    Ok(())
}

/// JSON document describing an error that ended the command
///
/// Returns `None` for failed envelopes, which [`emit`] already printed.
pub fn error_report(error: &anyhow::Error) -> Option<serde_json::Value> {
    if error.chain().any(|cause| cause.is::<Failure>()) {
        return None;
    }

    let mut report = serde_json::json!({
        "success": false,
        "message": format!("{error:#}"),
    });
    if let Some(core) = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<notebook_core::Error>())
    {
        report["error"] = serde_json::to_value(core.to_report()).ok()?;
    }
    Some(report)
}

/// Print the error that ended the command
pub fn report_error(json: bool, error: &anyhow::Error) {
    if !json {
        eprintln!("{} {error:#}", "Error:".red().bold());
        return;
    }
    if let Some(report) = error_report(error) {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(_) => eprintln!("{} {error:#}", "Error:".red().bold()),
        }
    }
}

fn code_for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::ConnectionUnavailable | ErrorKind::NotFound => exit_codes::UNAVAILABLE,
        ErrorKind::ValidationRejected | ErrorKind::InvalidInput => exit_codes::REJECTED,
        ErrorKind::Unauthorized => exit_codes::UNAUTHORIZED,
        ErrorKind::Timeout => exit_codes::TIMEOUT,
        ErrorKind::ServerError | ErrorKind::Internal => exit_codes::FAILURE,
    }
}

/// Process exit code for an error
pub fn exit_code(error: &anyhow::Error) -> u8 {
    let code = error
        .chain()
        .find_map(|cause| {
            if let Some(failure) = cause.downcast_ref::<Failure>() {
                return Some(code_for_kind(failure.kind));
            }
            if let Some(api) = cause.downcast_ref::<ApiError>() {
                return Some(match api {
                    ApiError::Config(_) => exit_codes::CONFIG_ERROR,
                    other => code_for_kind(other.kind()),
                });
            }
            cause
                .downcast_ref::<notebook_core::Error>()
                .map(|core| match core.code.category() {
                    "Configuration" => exit_codes::CONFIG_ERROR,
                    _ => exit_codes::FAILURE,
                })
        })
        .unwrap_or(exit_codes::FAILURE);

    u8::try_from(code).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
    }

    #[test]
    fn test_exit_code_for_failure() {
        let err = anyhow::Error::new(Failure {
            kind: ErrorKind::ConnectionUnavailable,
            message: "backend unavailable".into(),
        });
        assert_eq!(exit_code(&err), 5);

        let err = anyhow::Error::new(ApiError::Unauthorized).context("listing categories");
        assert_eq!(exit_code(&err), 4);

        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn test_error_report_includes_core_code() {
        let err = anyhow::Error::new(notebook_core::Error::config_not_found("missing.toml"));
        let report = error_report(&err).unwrap();
        assert_eq!(report["success"], false);
        assert_eq!(report["error"]["code"], "CONFIG_NOT_FOUND");
        assert_eq!(report["error"]["category"], "Configuration");
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn test_error_report_keeps_causes() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume");
        let err = anyhow::Error::new(io).context("cannot write paper.pdf");
        let report = error_report(&err).unwrap();
        let message = report["message"].as_str().unwrap();
        assert!(message.contains("cannot write paper.pdf"));
        assert!(message.contains("read-only volume"));
        assert!(report.get("error").is_none());
    }

    #[test]
    fn test_failed_envelope_is_not_reported_twice() {
        let err = anyhow::Error::new(Failure {
            kind: ErrorKind::ValidationRejected,
            message: "name taken".into(),
        });
        assert!(error_report(&err).is_none());
    }
}
