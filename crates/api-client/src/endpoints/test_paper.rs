//! Test paper export

use super::write;
use crate::auth::AuthContext;
use crate::client::NotebookClient;
use crate::envelope::{Envelope, Operation};
use crate::error::{ApiError, ApiResult};
use crate::models::{TestPaper, TestPaperKind, TestPaperRequest};
use reqwest::Method;
use tracing::info;

const EXPORT_TEST_PAPER: Operation = Operation::write(
    "export_test_paper",
    "Test paper generated",
    "Failed to generate test paper",
);

const DEFAULT_TITLE: &str = "试卷";

fn file_name(request: &TestPaperRequest, kind: TestPaperKind) -> String {
    let title = request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE);
    let stem: String = title
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    match kind {
        TestPaperKind::Questions => format!("{stem}.pdf"),
        TestPaperKind::Answers => format!("{stem}-答案.pdf"),
    }
}

/// Test paper API interface
#[derive(Clone)]
pub struct TestPaperApi {
    client: NotebookClient,
    auth: AuthContext,
}

impl TestPaperApi {
    pub(crate) fn new(client: NotebookClient, auth: AuthContext) -> Self {
        Self { client, auth }
    }

    /// Render a PDF for the selected questions
    ///
    /// POST /test-paper/generate or /test-paper/generate-answers.
    /// Rendering is never mocked.
    pub async fn export_test_paper(
        &self,
        request: &TestPaperRequest,
        kind: TestPaperKind,
    ) -> ApiResult<Envelope<TestPaper>> {
        if request.question_ids.is_empty() {
            return Err(ApiError::invalid_input("a test paper needs at least one question"));
        }

        // PDF generation can take as long as an upload
        let transport = self.client.upload_transport();
        let builder = transport.request(Method::POST, kind.path()).json(request);
        let outcome = transport.send(builder, &self.auth).await.map(|raw| {
            let paper = TestPaper {
                file_name: file_name(request, kind),
                size: raw.body.len(),
                content: raw.body,
            };
            info!(file = %paper.file_name, bytes = paper.size, "Test paper received");
            Envelope::ok(paper)
        });
        write(&EXPORT_TEST_PAPER, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        let request = TestPaperRequest::new(vec![1]).with_title("期中/复习");
        assert_eq!(file_name(&request, TestPaperKind::Questions), "期中_复习.pdf");
        assert_eq!(
            file_name(&TestPaperRequest::new(vec![1]), TestPaperKind::Answers),
            "试卷-答案.pdf"
        );
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected() {
        let client = NotebookClient::with_config(crate::config::ClientConfig::development()).unwrap();
        let result = client
            .test_papers(&AuthContext::anonymous())
            .export_test_paper(&TestPaperRequest::default(), TestPaperKind::Questions)
            .await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }
}
