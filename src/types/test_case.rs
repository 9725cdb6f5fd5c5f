use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::Resource;
use crate::types::{Id, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCaseKind {
    Happy,
    Error,
    Alternative,
}

/// One generated test case. Test cases hang off a test scenario, which in
/// turn belongs to a user story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: Id,
    pub test_scenario_id: Id,
    pub code: String,
    pub kind: TestCaseKind,
    pub input_data: String,
    pub steps: String,
    pub expected_result: String,
    #[serde(default)]
    pub actual_result: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseDraft {
    pub test_scenario_id: Id,
    pub code: String,
    pub kind: TestCaseKind,
    pub input_data: String,
    pub steps: String,
    pub expected_result: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseChanges {
    pub kind: TestCaseKind,
    pub input_data: String,
    pub steps: String,
    pub expected_result: String,
    pub actual_result: String,
    pub status: String,
}

/// Status given to a test case that has not been run yet.
pub const PENDING_STATUS: &str = "pending";

impl Resource for TestCase {
    type Draft = TestCaseDraft;
    type Changes = TestCaseChanges;

    const KIND: &'static str = "test case";

    fn id(&self) -> Id {
        self.id
    }

    fn parent_id(&self) -> Id {
        self.test_scenario_id
    }

    fn summary(&self) -> Summary {
        Summary {
            id: self.id,
            code: self.code.clone(),
            name: self.expected_result.clone(),
        }
    }

    fn from_draft(id: Id, draft: TestCaseDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            test_scenario_id: draft.test_scenario_id,
            code: draft.code,
            kind: draft.kind,
            input_data: draft.input_data,
            steps: draft.steps,
            expected_result: draft.expected_result,
            actual_result: String::new(),
            status: PENDING_STATUS.to_owned(),
        }
    }

    fn apply_changes(&mut self, changes: TestCaseChanges, _now: DateTime<Utc>) {
        self.kind = changes.kind;
        self.input_data = changes.input_data;
        self.steps = changes.steps;
        self.expected_result = changes.expected_result;
        self.actual_result = changes.actual_result;
        self.status = changes.status;
    }
}
