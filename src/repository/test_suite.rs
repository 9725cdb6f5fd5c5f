use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::error::{ClientError, Result};
use crate::transport::TransportClient;
use crate::types::{
    GenerationReceipt, GenerationRequest, Id, TestCase, TestCaseDraft, TestCaseKind, TestScenario,
    TestScenarioDraft, TestSuite,
};

use super::memory::InMemoryRepository;
use super::resource::ResourceRepository;
use super::wire::{GENERATION_PATH, RawGenerationReceipt, RawTestSuite, test_suite_path};

/// Test scenarios and test cases, read per user story.
///
/// The service never lists test cases on their own: they arrive together
/// with the scenarios that group them, and new ones are produced by a
/// generation run rather than created one at a time.
#[async_trait]
pub trait TestSuiteRepository: Send + Sync {
    async fn list_by_user_story(&self, user_story_id: Id) -> Result<TestSuite>;

    /// Upload the database file and ask the service to generate test cases.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationReceipt>;
}

#[derive(Clone, Debug)]
pub struct RemoteTestSuites {
    client: TransportClient,
}

impl RemoteTestSuites {
    pub fn new(client: TransportClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TestSuiteRepository for RemoteTestSuites {
    async fn list_by_user_story(&self, user_story_id: Id) -> Result<TestSuite> {
        let resp = self
            .client
            .get(&test_suite_path(user_story_id))
            .await?
            .error_for_status("Failed to load test cases", None)?;
        let raw: RawTestSuite = resp.json()?;
        Ok(raw.into_domain(user_story_id))
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationReceipt> {
        let db_file = Part::bytes(request.db_file).file_name(request.db_file_name);
        let form = Form::new()
            .text("user_story_id", request.user_story_id.to_string())
            .text("prompt_extra", request.prompt_extra)
            .part("archivo_db", db_file);
        let resp = self
            .client
            .post_multipart(GENERATION_PATH, form)
            .await?
            .error_for_status("Failed to generate test cases", None)?;
        let raw: RawGenerationReceipt = resp.json()?;
        Ok(raw.into())
    }
}

/// Fixture-backed suites. Generation writes one scenario holding a happy,
/// an error and an alternative case, all pending.
#[derive(Default)]
pub struct InMemoryTestSuites {
    scenarios: InMemoryRepository<TestScenario>,
    cases: InMemoryRepository<TestCase>,
}

impl InMemoryTestSuites {
    pub fn new(scenarios: Vec<TestScenario>, cases: Vec<TestCase>) -> Self {
        Self {
            scenarios: InMemoryRepository::new(scenarios),
            cases: InMemoryRepository::new(cases),
        }
    }
}

#[async_trait]
impl TestSuiteRepository for InMemoryTestSuites {
    async fn list_by_user_story(&self, user_story_id: Id) -> Result<TestSuite> {
        let scenarios = self.scenarios.list(user_story_id).await?;
        let mut test_cases = Vec::new();
        for scenario in &scenarios {
            test_cases.extend(self.cases.list(scenario.id).await?);
        }
        Ok(TestSuite {
            scenarios,
            test_cases,
        })
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationReceipt> {
        if request.db_file.is_empty() {
            return Err(ClientError::Validation {
                status: 422,
                message: "archivo_db must not be empty".to_owned(),
            });
        }
        let description = match request.prompt_extra.trim() {
            "" => format!("Generated from {}", request.db_file_name),
            extra => extra.to_owned(),
        };
        let scenario = self
            .scenarios
            .create(TestScenarioDraft {
                user_story_id: request.user_story_id,
                description,
            })
            .await?;

        let kinds = [
            TestCaseKind::Happy,
            TestCaseKind::Error,
            TestCaseKind::Alternative,
        ];
        for (n, kind) in kinds.into_iter().enumerate() {
            self.cases
                .create(TestCaseDraft {
                    test_scenario_id: scenario.id,
                    code: format!("TC-{}-{}", scenario.id, n + 1),
                    kind,
                    input_data: String::new(),
                    steps: String::new(),
                    expected_result: String::new(),
                })
                .await?;
        }
        tracing::debug!(
            "memory: generated {} test cases for user story {}",
            kinds.len(),
            request.user_story_id
        );

        Ok(GenerationReceipt {
            message: format!("{} test cases generated", kinds.len()),
            user_story_id: request.user_story_id,
            status: "completed".to_owned(),
        })
    }
}
