use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::Resource;
use crate::types::{Id, Summary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStory {
    pub id: Id,
    pub epic_id: Id,
    /// Server-assigned code such as `US-12`.
    pub code: String,
    #[serde(flatten)]
    pub fields: UserStoryFields,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The editable body of a user story, shared by create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStoryFields {
    pub name: String,
    pub role: String,
    pub description: String,
    pub acceptance_criteria: String,
    pub definition_of_done: String,
    pub priority: String,
    pub story_points: u32,
    pub dependencies: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStoryDraft {
    pub epic_id: Id,
    pub fields: UserStoryFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStoryChanges {
    pub fields: UserStoryFields,
    pub active: Option<bool>,
}

fn default_active() -> bool {
    true
}

impl Resource for UserStory {
    type Draft = UserStoryDraft;
    type Changes = UserStoryChanges;

    const KIND: &'static str = "user story";

    fn id(&self) -> Id {
        self.id
    }

    fn parent_id(&self) -> Id {
        self.epic_id
    }

    fn summary(&self) -> Summary {
        Summary {
            id: self.id,
            code: self.code.clone(),
            name: self.fields.name.clone(),
        }
    }

    fn from_draft(id: Id, draft: UserStoryDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            epic_id: draft.epic_id,
            code: format!("US-{id}"),
            fields: draft.fields,
            active: true,
            created_at: now,
            updated_at: None,
        }
    }

    fn apply_changes(&mut self, changes: UserStoryChanges, now: DateTime<Utc>) {
        self.fields = changes.fields;
        if let Some(active) = changes.active {
            self.active = active;
        }
        self.updated_at = Some(now);
    }
}
