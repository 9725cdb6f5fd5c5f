use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::Resource;
use crate::types::{Id, Summary, TestCase};

/// A group of generated test cases covering one aspect of a user story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestScenario {
    pub id: Id,
    pub user_story_id: Id,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestScenarioDraft {
    pub user_story_id: Id,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestScenarioChanges {
    pub description: String,
}

impl Resource for TestScenario {
    type Draft = TestScenarioDraft;
    type Changes = TestScenarioChanges;

    const KIND: &'static str = "test scenario";

    fn id(&self) -> Id {
        self.id
    }

    fn parent_id(&self) -> Id {
        self.user_story_id
    }

    fn summary(&self) -> Summary {
        Summary {
            id: self.id,
            code: String::new(),
            name: self.description.clone(),
        }
    }

    fn from_draft(id: Id, draft: TestScenarioDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_story_id: draft.user_story_id,
            description: draft.description,
        }
    }

    fn apply_changes(&mut self, changes: TestScenarioChanges, _now: DateTime<Utc>) {
        self.description = changes.description;
    }
}

/// Every scenario of a user story together with all of their test cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    pub scenarios: Vec<TestScenario>,
    pub test_cases: Vec<TestCase>,
}

impl TestSuite {
    /// Test cases of one scenario, in served order.
    pub fn cases_for(&self, scenario_id: Id) -> impl Iterator<Item = &TestCase> {
        self.test_cases
            .iter()
            .filter(move |tc| tc.test_scenario_id == scenario_id)
    }
}

/// Input of an AI test-case generation run for one user story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub user_story_id: Id,
    /// Free-form instructions appended to the generation prompt.
    pub prompt_extra: String,
    /// Database file the generated cases are written against.
    pub db_file_name: String,
    pub db_file: Vec<u8>,
}

/// What the service answers once a generation run is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReceipt {
    pub message: String,
    pub user_story_id: Id,
    pub status: String,
}
