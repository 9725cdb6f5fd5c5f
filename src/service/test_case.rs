use std::sync::Arc;

use crate::error::Result;
use crate::repository::TestSuiteRepository;
use crate::types::{GenerationReceipt, GenerationRequest, Id, TestSuite};

/// Test scenarios and cases of a user story, plus AI generation runs.
#[derive(Clone)]
pub struct TestCaseService {
    repo: Arc<dyn TestSuiteRepository>,
}

impl TestCaseService {
    pub fn new(repo: Arc<dyn TestSuiteRepository>) -> Self {
        Self { repo }
    }

    pub async fn suite(&self, user_story_id: Id) -> Result<TestSuite> {
        self.repo.list_by_user_story(user_story_id).await
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationReceipt> {
        let user_story_id = request.user_story_id;
        let receipt = self.repo.generate(request).await?;
        tracing::info!(
            "test case generation for user story {user_story_id}: {}",
            receipt.status
        );
        Ok(receipt)
    }
}
