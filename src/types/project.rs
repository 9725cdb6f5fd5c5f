use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::Resource;
use crate::types::{Id, Summary};

/// A top-level project owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub owner_id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Inactive projects stay listed and can be re-activated through `update`.
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub owner_id: Id,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectChanges {
    pub name: String,
    pub description: String,
    /// `None` leaves the flag untouched.
    pub active: Option<bool>,
}

fn default_active() -> bool {
    true
}

impl Resource for Project {
    type Draft = ProjectDraft;
    type Changes = ProjectChanges;

    const KIND: &'static str = "project";

    fn id(&self) -> Id {
        self.id
    }

    fn parent_id(&self) -> Id {
        self.owner_id
    }

    fn summary(&self) -> Summary {
        Summary {
            id: self.id,
            code: String::new(),
            name: self.name.clone(),
        }
    }

    fn from_draft(id: Id, draft: ProjectDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id: draft.owner_id,
            name: draft.name,
            description: draft.description,
            active: true,
            created_at: now,
            updated_at: None,
        }
    }

    fn apply_changes(&mut self, changes: ProjectChanges, now: DateTime<Utc>) {
        self.name = changes.name;
        self.description = changes.description;
        if let Some(active) = changes.active {
            self.active = active;
        }
        self.updated_at = Some(now);
    }
}
