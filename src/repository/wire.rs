//! Wire shapes exchanged with the tracker service and their mapping to the
//! domain types.
//!
//! Field names and representations differ from the domain (`nombre` vs
//! `name`, `status_project` vs `active`, flags that arrive as numbers,
//! timestamps without an offset). Every difference is resolved here; the rest
//! of the crate only sees `crate::types`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{
    Epic, EpicChanges, EpicDraft, GenerationReceipt, Id, Message, MessageChanges, MessageDraft,
    PageRequest, PageResult, Preferences, Project, ProjectChanges, ProjectDraft, Settings,
    SettingsDraft, Summary, TestCase, TestCaseKind, TestScenario, TestSuite, UserStory,
    UserStoryChanges, UserStoryDraft, UserStoryFields, page_count,
};

use super::resource::Resource;

// ---------------------------------------------------------------------------
// Endpoint templates
// ---------------------------------------------------------------------------

/// URL layout of one resource family.
///
/// - list:   `/{collection}/{parent}/{parent_id}` (optionally `?page=&size=`)
/// - short:  `/{collection}/{parent}/{parent_id}/short`
/// - item:   `/{collection}/{id}`
/// - create: `POST /{collection}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub collection: &'static str,
    pub parent: &'static str,
    /// The service has a dedicated `/short` listing for this resource.
    pub short: bool,
}

impl Endpoint {
    pub fn list_path(&self, parent_id: Id) -> String {
        format!("/{}/{}/{parent_id}", self.collection, self.parent)
    }

    pub fn page_path(&self, parent_id: Id, page: PageRequest) -> String {
        format!(
            "{}?page={}&size={}",
            self.list_path(parent_id),
            page.page,
            page.size
        )
    }

    /// `/{collection}/{parent}/{parent_id}/short`, when the service has one.
    pub fn short_path(&self, parent_id: Id) -> Option<String> {
        self.short
            .then(|| format!("{}/short", self.list_path(parent_id)))
    }

    pub fn item_path(&self, id: Id) -> String {
        format!("/{}/{id}", self.collection)
    }

    pub fn collection_path(&self) -> String {
        format!("/{}", self.collection)
    }
}

/// Binds a domain type to its endpoint and its pair of mapping functions.
pub trait RemoteResource: Resource {
    type Wire: DeserializeOwned + Send;
    type CreateWire: Serialize + Send + Sync;
    type UpdateWire: Serialize + Send + Sync;

    const ENDPOINT: Endpoint;

    fn from_wire(wire: Self::Wire) -> Self;
    fn draft_to_wire(draft: &Self::Draft) -> Self::CreateWire;
    fn changes_to_wire(changes: &Self::Changes) -> Self::UpdateWire;
}

// ---------------------------------------------------------------------------
// Pagination envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WirePage<W> {
    #[serde(default = "Vec::new")]
    items: Vec<W>,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    page: u32,
    #[serde(default)]
    size: u32,
}

impl<W> WirePage<W> {
    /// Convert to a domain page.
    ///
    /// `page` and `size` are the server's; `pages` is recomputed from `total`
    /// and `size` so an empty result always reports one page.
    pub(crate) fn into_domain<T>(
        self,
        requested: PageRequest,
        f: impl FnMut(W) -> T,
    ) -> PageResult<T> {
        let size = if self.size == 0 { requested.size } else { self.size };
        let page = if self.page == 0 { requested.page } else { self.page };
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page,
            size,
            pages: page_count(self.total, size),
        }
    }
}

/// One row of a `/short` listing. Each resource names its code and title
/// fields differently.
#[derive(Debug, Deserialize)]
pub(crate) struct RawSummary {
    id: Id,
    #[serde(default, alias = "second_id", alias = "fake_id")]
    code: String,
    #[serde(alias = "nombre")]
    name: String,
}

impl From<RawSummary> for Summary {
    fn from(w: RawSummary) -> Self {
        Self {
            id: w.id,
            code: w.code,
            name: w.name,
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoders
// ---------------------------------------------------------------------------

/// Accept `true`/`false`, `0`/`1`, or `null` for a status flag.
fn de_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => Some(b),
        Some(serde_json::Value::Number(n)) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        _ => None,
    })
}

/// Accept RFC 3339 timestamps and offset-less ones (taken as UTC).
fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}

fn created_or_epoch(ts: Option<DateTime<Utc>>) -> DateTime<Utc> {
    ts.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RawProject {
    id: Id,
    user_id: Id,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    status_project: Option<bool>,
    #[serde(default, deserialize_with = "de_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CreateProject {
    user_id: Id,
    name: String,
    description: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateProject {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_project: Option<bool>,
}

impl RemoteResource for Project {
    type Wire = RawProject;
    type CreateWire = CreateProject;
    type UpdateWire = UpdateProject;

    const ENDPOINT: Endpoint = Endpoint {
        collection: "projects",
        parent: "user",
        short: false,
    };

    fn from_wire(w: RawProject) -> Self {
        Self {
            id: w.id,
            owner_id: w.user_id,
            name: w.name,
            description: w.description.unwrap_or_default(),
            active: w.status_project.unwrap_or(true),
            created_at: created_or_epoch(w.created_at),
            updated_at: w.updated_at,
        }
    }

    fn draft_to_wire(d: &ProjectDraft) -> CreateProject {
        CreateProject {
            user_id: d.owner_id,
            name: d.name.clone(),
            description: d.description.clone(),
        }
    }

    fn changes_to_wire(c: &ProjectChanges) -> UpdateProject {
        UpdateProject {
            name: c.name.clone(),
            description: c.description.clone(),
            status_project: c.active,
        }
    }
}

// ---------------------------------------------------------------------------
// Epic
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RawEpic {
    id: Id,
    proyecto_id: Id,
    #[serde(default)]
    fake_id: String,
    nombre: String,
    #[serde(default)]
    descripcion: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    status_epic: Option<bool>,
    #[serde(default, deserialize_with = "de_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CreateEpic {
    fake_id: String,
    nombre: String,
    descripcion: String,
    proyecto_id: Id,
}

#[derive(Debug, Serialize)]
pub struct UpdateEpic {
    nombre: String,
    descripcion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_epic: Option<bool>,
}

impl RemoteResource for Epic {
    type Wire = RawEpic;
    type CreateWire = CreateEpic;
    type UpdateWire = UpdateEpic;

    const ENDPOINT: Endpoint = Endpoint {
        collection: "epics",
        parent: "proyecto",
        short: false,
    };

    fn from_wire(w: RawEpic) -> Self {
        Self {
            id: w.id,
            project_id: w.proyecto_id,
            code: w.fake_id,
            name: w.nombre,
            description: w.descripcion.unwrap_or_default(),
            active: w.status_epic.unwrap_or(true),
            created_at: created_or_epoch(w.created_at),
            updated_at: w.updated_at,
        }
    }

    fn draft_to_wire(d: &EpicDraft) -> CreateEpic {
        CreateEpic {
            fake_id: d.code.clone(),
            nombre: d.name.clone(),
            descripcion: d.description.clone(),
            proyecto_id: d.project_id,
        }
    }

    fn changes_to_wire(c: &EpicChanges) -> UpdateEpic {
        UpdateEpic {
            nombre: c.name.clone(),
            descripcion: c.description.clone(),
            status_epic: c.active,
        }
    }
}

// ---------------------------------------------------------------------------
// User story
// ---------------------------------------------------------------------------

/// The editable user-story fields under their wire names.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WireStoryFields {
    name: String,
    rol: String,
    description: String,
    acceptance_criteria: String,
    dod: String,
    priority: String,
    story_points: u32,
    dependencies: String,
    summary: String,
}

impl From<WireStoryFields> for UserStoryFields {
    fn from(w: WireStoryFields) -> Self {
        Self {
            name: w.name,
            role: w.rol,
            description: w.description,
            acceptance_criteria: w.acceptance_criteria,
            definition_of_done: w.dod,
            priority: w.priority,
            story_points: w.story_points,
            dependencies: w.dependencies,
            summary: w.summary,
        }
    }
}

impl From<&UserStoryFields> for WireStoryFields {
    fn from(f: &UserStoryFields) -> Self {
        Self {
            name: f.name.clone(),
            rol: f.role.clone(),
            description: f.description.clone(),
            acceptance_criteria: f.acceptance_criteria.clone(),
            dod: f.definition_of_done.clone(),
            priority: f.priority.clone(),
            story_points: f.story_points,
            dependencies: f.dependencies.clone(),
            summary: f.summary.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawUserStory {
    id: Id,
    epic_id: Id,
    #[serde(default)]
    second_id: String,
    #[serde(flatten)]
    fields: WireStoryFields,
    #[serde(default, deserialize_with = "de_flag")]
    status_user_stories: Option<bool>,
    #[serde(default, deserialize_with = "de_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CreateUserStory {
    epic_id: Id,
    #[serde(flatten)]
    fields: WireStoryFields,
}

#[derive(Debug, Serialize)]
pub struct UpdateUserStory {
    #[serde(flatten)]
    fields: WireStoryFields,
    /// Sent as `null` when unchanged; the service keeps the stored value.
    status_user_stories: Option<bool>,
}

impl RemoteResource for UserStory {
    type Wire = RawUserStory;
    type CreateWire = CreateUserStory;
    type UpdateWire = UpdateUserStory;

    const ENDPOINT: Endpoint = Endpoint {
        collection: "user_stories",
        parent: "epic",
        short: true,
    };

    fn from_wire(w: RawUserStory) -> Self {
        Self {
            id: w.id,
            epic_id: w.epic_id,
            code: w.second_id,
            fields: w.fields.into(),
            active: w.status_user_stories.unwrap_or(false),
            created_at: created_or_epoch(w.created_at),
            updated_at: w.updated_at,
        }
    }

    fn draft_to_wire(d: &UserStoryDraft) -> CreateUserStory {
        CreateUserStory {
            epic_id: d.epic_id,
            fields: (&d.fields).into(),
        }
    }

    fn changes_to_wire(c: &UserStoryChanges) -> UpdateUserStory {
        UpdateUserStory {
            fields: (&c.fields).into(),
            status_user_stories: c.active,
        }
    }
}

// ---------------------------------------------------------------------------
// Test scenarios and test cases
// ---------------------------------------------------------------------------

/// `GET /test-scenarios/user-story/{id}`: scenarios and their test cases.
pub fn test_suite_path(user_story_id: Id) -> String {
    format!("/test-scenarios/user-story/{user_story_id}")
}

/// `POST` target of the multipart test-case generation upload.
pub const GENERATION_PATH: &str = "/generar-testcases/";

#[derive(Debug, Deserialize)]
pub(crate) struct RawTestScenario {
    id: Id,
    #[serde(default)]
    user_story_id: Option<Id>,
    #[serde(default)]
    descripcion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTestCase {
    id: Id,
    test_scenario_id: Id,
    #[serde(default)]
    fake_id: String,
    tipo: TestCaseKind,
    #[serde(default)]
    datos_entrada: String,
    #[serde(default)]
    pasos: String,
    #[serde(default)]
    resultado_esperado: String,
    #[serde(default)]
    resultado_real: Option<String>,
    #[serde(default)]
    estado: Option<String>,
}

impl RawTestCase {
    fn into_domain(self) -> TestCase {
        TestCase {
            id: self.id,
            test_scenario_id: self.test_scenario_id,
            code: self.fake_id,
            kind: self.tipo,
            input_data: self.datos_entrada,
            steps: self.pasos,
            expected_result: self.resultado_esperado,
            actual_result: self.resultado_real.unwrap_or_default(),
            status: self.estado.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTestSuite {
    #[serde(default)]
    scenarios: Vec<RawTestScenario>,
    #[serde(default, rename = "testCases", alias = "test_cases")]
    test_cases: Vec<RawTestCase>,
}

impl RawTestSuite {
    /// Scenarios that omit their user story belong to the one requested.
    pub(crate) fn into_domain(self, user_story_id: Id) -> TestSuite {
        TestSuite {
            scenarios: self
                .scenarios
                .into_iter()
                .map(|s| TestScenario {
                    id: s.id,
                    user_story_id: s.user_story_id.unwrap_or(user_story_id),
                    description: s.descripcion.unwrap_or_default(),
                })
                .collect(),
            test_cases: self
                .test_cases
                .into_iter()
                .map(RawTestCase::into_domain)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGenerationReceipt {
    #[serde(default)]
    mensaje: String,
    us_id: Id,
    #[serde(default)]
    estado: String,
}

impl From<RawGenerationReceipt> for GenerationReceipt {
    fn from(w: RawGenerationReceipt) -> Self {
        Self {
            message: w.mensaje,
            user_story_id: w.us_id,
            status: w.estado,
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RawMessage {
    id: Id,
    user_id: Id,
    content: String,
    #[serde(default, deserialize_with = "de_timestamp")]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CreateMessage {
    user_id: Id,
    content: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateMessage {
    content: String,
}

impl RemoteResource for Message {
    type Wire = RawMessage;
    type CreateWire = CreateMessage;
    type UpdateWire = UpdateMessage;

    const ENDPOINT: Endpoint = Endpoint {
        collection: "messages",
        parent: "user",
        short: false,
    };

    fn from_wire(w: RawMessage) -> Self {
        Self {
            id: w.id,
            author_id: w.user_id,
            body: w.content,
            sent_at: created_or_epoch(w.created_at),
        }
    }

    fn draft_to_wire(d: &MessageDraft) -> CreateMessage {
        CreateMessage {
            user_id: d.author_id,
            content: d.body.clone(),
        }
    }

    fn changes_to_wire(c: &MessageChanges) -> UpdateMessage {
        UpdateMessage {
            content: c.body.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RawSettings {
    id: Id,
    user_id: Id,
    #[serde(default)]
    theme: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    email_notifications: Option<bool>,
    #[serde(default, deserialize_with = "de_timestamp")]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CreateSettings {
    user_id: Id,
    #[serde(flatten)]
    preferences: Preferences,
}

impl RemoteResource for Settings {
    type Wire = RawSettings;
    type CreateWire = CreateSettings;
    type UpdateWire = Preferences;

    const ENDPOINT: Endpoint = Endpoint {
        collection: "settings",
        parent: "user",
        short: false,
    };

    fn from_wire(w: RawSettings) -> Self {
        let defaults = Preferences::default();
        Self {
            id: w.id,
            user_id: w.user_id,
            preferences: Preferences {
                theme: w.theme.unwrap_or(defaults.theme),
                language: w.language.unwrap_or(defaults.language),
                email_notifications: w
                    .email_notifications
                    .unwrap_or(defaults.email_notifications),
            },
            updated_at: w.updated_at,
        }
    }

    fn draft_to_wire(d: &SettingsDraft) -> CreateSettings {
        CreateSettings {
            user_id: d.user_id,
            preferences: d.preferences.clone(),
        }
    }

    fn changes_to_wire(c: &Preferences) -> Preferences {
        c.clone()
    }
}
