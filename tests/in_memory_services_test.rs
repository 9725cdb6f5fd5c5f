use storyboard::ClientError;
use storyboard::pagination::{LoadState, PaginationController};
use storyboard::service::{Fixtures, Services};
use storyboard::types::{
    EpicDraft, GenerationRequest, MessageChanges, PENDING_STATUS, PageRequest, Preferences,
    ProjectChanges, ProjectDraft, TestCaseKind, UserStoryChanges, UserStoryDraft, UserStoryFields,
};

fn load_fixture_services() -> Services {
    let json = include_str!("fixtures/board.json");
    let fixtures = Fixtures::from_json(json).expect("valid board.json fixture");
    Services::in_memory(fixtures)
}

#[test]
fn fixtures_tolerate_missing_sections() {
    let fixtures = Fixtures::from_json(r#"{"projects": []}"#).unwrap();
    assert!(fixtures.epics.is_empty());
    assert!(fixtures.settings.is_empty());
}

#[tokio::test]
async fn projects_are_scoped_by_owner() {
    let services = load_fixture_services();

    let mine = services.projects.list(1).await.unwrap();
    let names: Vec<&str> = mine.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Storefront", "Back office"]);
    assert!(!mine[1].active);

    let theirs = services.projects.list(2).await.unwrap();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].description, "");
    assert!(theirs[0].active);

    assert!(services.projects.list(99).await.unwrap().is_empty());
}

#[tokio::test]
async fn created_ids_skip_past_seeded_and_deleted_ids() {
    let services = load_fixture_services();

    let created = services
        .projects
        .create(ProjectDraft {
            owner_id: 1,
            name: "Analytics".to_owned(),
            description: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, 5, "one past the highest seeded id");

    services.projects.delete(5).await.unwrap();
    let again = services
        .projects
        .create(ProjectDraft {
            owner_id: 1,
            name: "Analytics v2".to_owned(),
            description: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(again.id, 6, "a deleted id is never handed out again");
}

#[tokio::test]
async fn deactivate_then_reactivate_project() {
    let services = load_fixture_services();
    let changes = |active| ProjectChanges {
        name: "Storefront".to_owned(),
        description: "Web shop".to_owned(),
        active: Some(active),
    };

    let off = services.projects.update(1, changes(false)).await.unwrap();
    assert!(!off.active);
    assert!(off.updated_at.is_some());
    assert_eq!(services.projects.list(1).await.unwrap().len(), 2);

    let on = services.projects.update(1, changes(true)).await.unwrap();
    assert!(on.active);
    assert_eq!(on.created_at, off.created_at);
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let services = load_fixture_services();

    assert_eq!(
        services.epics.get(77).await.unwrap_err(),
        ClientError::NotFound {
            entity: "epic",
            id: 77
        }
    );
    assert!(matches!(
        services
            .messages
            .update(
                77,
                MessageChanges {
                    body: "edited".to_owned()
                }
            )
            .await,
        Err(ClientError::NotFound { id: 77, .. })
    ));
    assert!(matches!(
        services.user_stories.delete(77).await,
        Err(ClientError::NotFound { id: 77, .. })
    ));
}

#[tokio::test]
async fn hierarchy_can_be_built_top_down() {
    let services = load_fixture_services();

    let epic = services
        .epics
        .create(EpicDraft {
            project_id: 4,
            code: "EP-7".to_owned(),
            name: "Push notifications".to_owned(),
            description: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(epic.id, 7);
    assert!(epic.active);

    let story = services
        .user_stories
        .create(UserStoryDraft {
            epic_id: epic.id,
            fields: UserStoryFields {
                name: "Opt in".to_owned(),
                role: "mobile user".to_owned(),
                story_points: 2,
                ..UserStoryFields::default()
            },
        })
        .await
        .unwrap();
    assert_eq!(story.code, format!("US-{}", story.id));

    assert!(services.test_cases.suite(story.id).await.unwrap().scenarios.is_empty());
    services
        .test_cases
        .generate(GenerationRequest {
            user_story_id: story.id,
            prompt_extra: "Permission prompts".to_owned(),
            db_file_name: "mobile.db".to_owned(),
            db_file: b"SQLite format 3".to_vec(),
        })
        .await
        .unwrap();

    let suite = services.test_cases.suite(story.id).await.unwrap();
    assert_eq!(suite.scenarios.len(), 1);
    assert_eq!(suite.scenarios[0].description, "Permission prompts");
    assert_eq!(suite.test_cases.len(), 3);
    assert!(suite.test_cases.iter().all(|c| c.status == PENDING_STATUS));
    assert!(suite.test_cases.iter().all(|c| c.actual_result.is_empty()));
}

#[tokio::test]
async fn seeded_suite_groups_cases_under_scenarios() {
    let services = load_fixture_services();

    let suite = services.test_cases.suite(1).await.unwrap();
    assert_eq!(suite.scenarios.len(), 1);
    let cases: Vec<_> = suite.cases_for(suite.scenarios[0].id).collect();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].code, "TC-1");
    assert_eq!(cases[0].kind, TestCaseKind::Happy);

    assert!(services.test_cases.suite(2).await.unwrap().test_cases.is_empty());
}

#[tokio::test]
async fn short_listings_carry_code_and_name() {
    let services = load_fixture_services();

    let epics = services.epics.list_short(1).await.unwrap();
    assert_eq!(epics.len(), 5);
    assert_eq!((epics[2].id, epics[2].code.as_str()), (3, "EP-3"));
    assert_eq!(epics[2].name, "Checkout");

    let stories = services.user_stories.list_short(3).await.unwrap();
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].code, "US-1");
    assert_eq!(stories[0].name, "Pay by card");
}

#[tokio::test]
async fn epics_for_user_span_their_projects() {
    let services = load_fixture_services();

    let ids: Vec<u64> = services
        .epics_for_user(1)
        .await
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, [1, 2, 3, 4, 5]);

    let theirs = services.epics_for_user(2).await.unwrap();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].name, "Onboarding");
    assert!(services.epics_for_user(99).await.unwrap().is_empty());
}

#[tokio::test]
async fn story_update_replaces_fields() {
    let services = load_fixture_services();
    let mut fields = services.user_stories.get(1).await.unwrap().fields;
    fields.story_points = 8;
    fields.priority = "critical".to_owned();

    let updated = services
        .user_stories
        .update(
            1,
            UserStoryChanges {
                fields: fields.clone(),
                active: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.fields, fields);
    assert!(updated.active);
}

#[tokio::test]
async fn settings_update_in_place() {
    let services = load_fixture_services();
    let stored = services.settings.list(1).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].preferences.theme, "dark");

    let updated = services
        .settings
        .update(
            stored[0].id,
            Preferences {
                theme: "light".to_owned(),
                ..stored[0].preferences.clone()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.preferences.theme, "light");
    assert!(!updated.preferences.email_notifications);
}

#[tokio::test]
async fn paginated_epics_cover_the_scope_exactly_once() {
    let services = load_fixture_services();
    let mut seen = Vec::new();
    for page in 1..=3 {
        let result = services
            .epics
            .list_paginated(1, PageRequest::new(page, 2))
            .await
            .unwrap();
        assert_eq!(result.total, 5);
        assert_eq!(result.pages, 3);
        seen.extend(result.items.into_iter().map(|e| e.id));
    }
    assert_eq!(seen, [1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn controller_over_a_service_scope() {
    let services = load_fixture_services();
    let mut pager = PaginationController::for_scope(services.epics.clone(), 1, 2);

    pager.activate();
    pager.settle().await;
    assert_eq!(pager.state(), LoadState::Loaded);
    assert_eq!(pager.pages(), 3);

    pager.set_page(3);
    pager.settle().await;
    let codes: Vec<&str> = pager.items().iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, ["EP-5"]);

    // A deletion elsewhere shows up on refresh.
    services.epics.delete(5).await.unwrap();
    pager.refresh();
    pager.settle().await;
    assert_eq!(pager.total(), 4);
    assert_eq!(pager.pages(), 2);
    assert_eq!(pager.page(), 2, "served page is clamped to the last one");
}
