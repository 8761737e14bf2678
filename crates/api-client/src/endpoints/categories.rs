//! Category and question endpoints
//!
//! Reads fall back to mock data when the backend is unreachable or the
//! endpoint is missing; mutations report a failed envelope instead.

use super::{acknowledge, fetch, read, require_id, write};
use crate::auth::AuthContext;
use crate::client::NotebookClient;
use crate::envelope::{Envelope, Operation};
use crate::error::{ApiError, ApiResult};
use crate::models::{Category, CategoryDraft, CategoryStats, Question, QuestionQuery};
use reqwest::Method;
use tracing::debug;

const GET_CATEGORIES: Operation =
    Operation::read("get_categories", "Categories loaded", "Failed to load categories");
const GET_CATEGORY_STATS: Operation = Operation::read(
    "get_category_stats",
    "Statistics loaded",
    "Failed to load statistics",
);
const GET_CATEGORY_DETAIL: Operation = Operation::read(
    "get_category_detail",
    "Category loaded",
    "Failed to load category",
);
const GET_CATEGORY_QUESTIONS: Operation = Operation::read(
    "get_category_questions",
    "Questions loaded",
    "Failed to load questions",
);
const CREATE_CATEGORY: Operation =
    Operation::write("create_category", "Category created", "Failed to create category");
const UPDATE_CATEGORY: Operation =
    Operation::write("update_category", "Category updated", "Failed to update category");
const DELETE_CATEGORY: Operation =
    Operation::write("delete_category", "Category deleted", "Failed to delete category");
const BATCH_DELETE_QUESTIONS: Operation = Operation::write(
    "batch_delete_questions",
    "Questions deleted",
    "Failed to delete questions",
);

/// Category API interface
#[derive(Clone)]
pub struct CategoriesApi {
    client: NotebookClient,
    auth: AuthContext,
}

impl CategoriesApi {
    pub(crate) fn new(client: NotebookClient, auth: AuthContext) -> Self {
        Self { client, auth }
    }

    fn mock_fallback(&self) -> bool {
        self.client.config().mock_fallback
    }

    /// List all categories with their question counts
    ///
    /// GET /categories
    pub async fn get_categories(&self) -> ApiResult<Envelope<Vec<Category>>> {
        let transport = self.client.transport();
        let outcome = fetch(transport, transport.request(Method::GET, "categories"), &self.auth).await;
        read(&GET_CATEGORIES, outcome, self.mock_fallback(), || {
            self.client.mock().categories()
        })
        .await
    }

    /// Totals for the home screen
    ///
    /// GET /categories/stats
    pub async fn get_category_stats(&self) -> ApiResult<Envelope<CategoryStats>> {
        let transport = self.client.transport();
        let outcome = fetch(
            transport,
            transport.request(Method::GET, "categories/stats"),
            &self.auth,
        )
        .await;
        read(&GET_CATEGORY_STATS, outcome, self.mock_fallback(), || {
            self.client.mock().category_stats()
        })
        .await
    }

    /// One category
    ///
    /// GET /categories/{id}
    pub async fn get_category_detail(&self, category_id: &str) -> ApiResult<Envelope<Category>> {
        let id = require_id("category id", category_id)?;
        let transport = self.client.transport();
        let outcome = fetch(
            transport,
            transport.request(Method::GET, &format!("categories/{id}")),
            &self.auth,
        )
        .await;
        read(&GET_CATEGORY_DETAIL, outcome, self.mock_fallback(), || {
            self.client.mock().category_detail(id)
        })
        .await
    }

    /// Questions in a category, optionally filtered
    ///
    /// GET /questions/by-category/{id} or /categories/{id}/questions,
    /// depending on [`QuestionsPath`](crate::config::QuestionsPath)
    pub async fn get_category_questions(
        &self,
        category_id: &str,
        query: &QuestionQuery,
    ) -> ApiResult<Envelope<Vec<Question>>> {
        let id = require_id("category id", category_id)?;
        let path = self.client.config().questions_path.for_category(id);
        debug!(path = %path, filters = query.pairs().len(), "Listing category questions");

        let transport = self.client.transport();
        let builder = transport.request(Method::GET, &path).query(&query.pairs());
        let outcome = fetch(transport, builder, &self.auth).await;
        read(&GET_CATEGORY_QUESTIONS, outcome, self.mock_fallback(), || {
            self.client.mock().category_questions(id)
        })
        .await
    }

    /// Create a category
    ///
    /// POST /categories
    pub async fn create_category(&self, draft: &CategoryDraft) -> ApiResult<Envelope<Category>> {
        draft.validate()?;
        let transport = self.client.transport();
        let builder = transport.request(Method::POST, "categories").json(draft);
        write(&CREATE_CATEGORY, fetch(transport, builder, &self.auth).await)
    }

    /// Replace a category
    ///
    /// PUT /categories/{id}
    pub async fn update_category(
        &self,
        category_id: &str,
        draft: &CategoryDraft,
    ) -> ApiResult<Envelope<Category>> {
        let id = require_id("category id", category_id)?;
        draft.validate()?;
        let transport = self.client.transport();
        let builder = transport
            .request(Method::PUT, &format!("categories/{id}"))
            .json(draft);
        write(&UPDATE_CATEGORY, fetch(transport, builder, &self.auth).await)
    }

    /// Delete a category
    ///
    /// DELETE /categories/{id}
    pub async fn delete_category(&self, category_id: &str) -> ApiResult<Envelope<()>> {
        let id = require_id("category id", category_id)?;
        let transport = self.client.transport();
        let builder = transport.request(Method::DELETE, &format!("categories/{id}"));
        write(&DELETE_CATEGORY, acknowledge(transport, builder, &self.auth).await)
    }

    /// Delete several questions at once
    ///
    /// POST /questions/batch-delete with the id array as body
    pub async fn batch_delete_questions(&self, ids: &[i64]) -> ApiResult<Envelope<()>> {
        if ids.is_empty() {
            return Err(ApiError::invalid_input("no question ids to delete"));
        }
        let transport = self.client.transport();
        let builder = transport
            .request(Method::POST, "questions/batch-delete")
            .json(ids);
        write(
            &BATCH_DELETE_QUESTIONS,
            acknowledge(transport, builder, &self.auth).await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use std::time::Duration;

    fn offline() -> CategoriesApi {
        let config = ClientConfig::development()
            .with_base_url("http://127.0.0.1:1/api")
            .with_mock_latency(Duration::ZERO);
        NotebookClient::with_config(config)
            .unwrap()
            .categories(&AuthContext::anonymous())
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_sending() {
        let api = offline();
        assert!(matches!(
            api.get_category_detail(" ").await,
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            api.batch_delete_questions(&[]).await,
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            api.create_category(&CategoryDraft::new("")).await,
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_reads_fall_back_when_offline() {
        let api = offline();

        let categories = api.get_categories().await.unwrap();
        assert!(categories.success);
        assert_eq!(categories.data.unwrap().len(), 6);

        let detail = api.get_category_detail("1").await.unwrap();
        assert_eq!(detail.data.unwrap().name, "数学 - 二次函数");

        let stats = api.get_category_stats().await.unwrap();
        assert_eq!(stats.data.unwrap().total_categories, 6);
    }

    #[tokio::test]
    async fn test_questions_fall_back_for_large_ids() {
        let api = offline();
        let questions = api
            .get_category_questions("100000000000000000", &QuestionQuery::new())
            .await
            .unwrap();
        assert!(questions.success);
        assert_eq!(questions.data.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_writes_fail_softly_when_offline() {
        let api = offline();

        let created = api.create_category(&CategoryDraft::new("X")).await.unwrap();
        assert!(!created.success);
        assert!(!created.message.unwrap_or_default().is_empty());

        let deleted = api.delete_category("3").await.unwrap();
        assert!(!deleted.success);
    }
}
