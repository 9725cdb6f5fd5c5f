use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::Resource;
use crate::types::{Id, Summary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    pub id: Id,
    pub project_id: Id,
    /// Short human-facing code such as `EP-3`.
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicDraft {
    pub project_id: Id,
    pub code: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicChanges {
    pub name: String,
    pub description: String,
    pub active: Option<bool>,
}

fn default_active() -> bool {
    true
}

impl Resource for Epic {
    type Draft = EpicDraft;
    type Changes = EpicChanges;

    const KIND: &'static str = "epic";

    fn id(&self) -> Id {
        self.id
    }

    fn parent_id(&self) -> Id {
        self.project_id
    }

    fn summary(&self) -> Summary {
        Summary {
            id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }

    fn from_draft(id: Id, draft: EpicDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            project_id: draft.project_id,
            code: draft.code,
            name: draft.name,
            description: draft.description,
            active: true,
            created_at: now,
            updated_at: None,
        }
    }

    fn apply_changes(&mut self, changes: EpicChanges, now: DateTime<Utc>) {
        self.name = changes.name;
        self.description = changes.description;
        if let Some(active) = changes.active {
            self.active = active;
        }
        self.updated_at = Some(now);
    }
}
