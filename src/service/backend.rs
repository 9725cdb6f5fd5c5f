use std::sync::Arc;

use serde::Deserialize;

use crate::error::Result;
use crate::repository::{
    InMemoryRepository, InMemoryTestSuites, RemoteRepository, RemoteResource, RemoteTestSuites,
    Resource, ResourceRepository,
};
use crate::transport::TransportClient;
use crate::types::{Epic, Id, Message, Project, Settings, TestCase, TestScenario, UserStory};

use super::resource::ResourceService;
use super::test_case::TestCaseService;

/// Seed data for the in-memory backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub projects: Vec<Project>,
    pub epics: Vec<Epic>,
    pub user_stories: Vec<UserStory>,
    pub test_scenarios: Vec<TestScenario>,
    pub test_cases: Vec<TestCase>,
    pub messages: Vec<Message>,
    pub settings: Vec<Settings>,
}

impl Fixtures {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Queries that cross aggregate boundaries. The remote service answers
/// them in one call; the in-memory backend joins its own stores.
#[derive(Clone)]
enum Backend {
    Remote(RemoteRepository<Epic>),
    InMemory,
}

/// One service per aggregate, all over the same backend.
#[derive(Clone)]
pub struct Services {
    pub projects: ResourceService<Project>,
    pub epics: ResourceService<Epic>,
    pub user_stories: ResourceService<UserStory>,
    pub test_cases: TestCaseService,
    pub messages: ResourceService<Message>,
    pub settings: ResourceService<Settings>,
    backend: Backend,
}

impl Services {
    /// Every repository talks to the tracker service through `client`.
    pub fn remote(client: &TransportClient) -> Self {
        fn repo<T: RemoteResource>(client: &TransportClient) -> ResourceService<T> {
            let repo: Arc<dyn ResourceRepository<T>> =
                Arc::new(RemoteRepository::<T>::new(client.clone()));
            ResourceService::new(repo)
        }

        Self {
            projects: repo(client),
            epics: repo(client),
            user_stories: repo(client),
            test_cases: TestCaseService::new(Arc::new(RemoteTestSuites::new(client.clone()))),
            messages: repo(client),
            settings: repo(client),
            backend: Backend::Remote(RemoteRepository::new(client.clone())),
        }
    }

    /// Process-local stores seeded from `fixtures`; no network.
    pub fn in_memory(fixtures: Fixtures) -> Self {
        fn repo<T: Resource>(seed: Vec<T>) -> ResourceService<T> {
            let repo: Arc<dyn ResourceRepository<T>> = Arc::new(InMemoryRepository::new(seed));
            ResourceService::new(repo)
        }

        let suites = InMemoryTestSuites::new(fixtures.test_scenarios, fixtures.test_cases);
        Self {
            projects: repo(fixtures.projects),
            epics: repo(fixtures.epics),
            user_stories: repo(fixtures.user_stories),
            test_cases: TestCaseService::new(Arc::new(suites)),
            messages: repo(fixtures.messages),
            settings: repo(fixtures.settings),
            backend: Backend::InMemory,
        }
    }

    /// Every epic of every project `user_id` owns, project by project.
    pub async fn epics_for_user(&self, user_id: Id) -> Result<Vec<Epic>> {
        match &self.backend {
            Backend::Remote(epics) => epics.list_by_user(user_id).await,
            Backend::InMemory => {
                let mut epics = Vec::new();
                for project in self.projects.list(user_id).await? {
                    epics.extend(self.epics.list(project.id).await?);
                }
                Ok(epics)
            }
        }
    }
}
