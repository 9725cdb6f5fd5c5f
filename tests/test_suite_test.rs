use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storyboard::ClientError;
use storyboard::config::types::ApiConfig;
use storyboard::repository::{RemoteTestSuites, TestSuiteRepository};
use storyboard::session::SessionHandle;
use storyboard::transport::TransportClient;
use storyboard::types::{GenerationRequest, TestCaseKind};

fn suites_for(base_url: &str) -> RemoteTestSuites {
    let config = ApiConfig {
        base_url: base_url.to_owned(),
        ..ApiConfig::default()
    };
    let client = TransportClient::new(&config, Arc::new(SessionHandle::ephemeral())).unwrap();
    RemoteTestSuites::new(client)
}

fn request() -> GenerationRequest {
    GenerationRequest {
        user_story_id: 5,
        prompt_extra: "cover refunds".to_owned(),
        db_file_name: "shop.db".to_owned(),
        db_file: b"SQLite format 3\0".to_vec(),
    }
}

#[tokio::test]
async fn suite_is_read_per_user_story() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test-scenarios/user-story/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "scenarios": [{"id": 2, "descripcion": "Refunds"}],
            "testCases": [
                {
                    "id": 11, "test_scenario_id": 2, "fake_id": "TC-11", "tipo": "alternative",
                    "datos_entrada": "partial refund", "pasos": "refund half",
                    "resultado_esperado": "half credited", "estado": "passed",
                    "resultado_real": "half credited"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let suite = suites_for(&server.uri()).list_by_user_story(5).await.unwrap();
    assert_eq!(suite.scenarios.len(), 1);
    assert_eq!(suite.scenarios[0].user_story_id, 5);
    assert_eq!(suite.scenarios[0].description, "Refunds");

    let cases: Vec<_> = suite.cases_for(2).collect();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].kind, TestCaseKind::Alternative);
    assert_eq!(cases[0].status, "passed");
    assert_eq!(cases[0].actual_result, "half credited");
}

#[tokio::test]
async fn generation_uploads_a_multipart_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generar-testcases/"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains(r#"name="user_story_id""#))
        .and(body_string_contains("cover refunds"))
        .and(body_string_contains(r#"name="archivo_db"; filename="shop.db""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mensaje": "Test cases generados",
            "us_id": 5,
            "estado": "completed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = suites_for(&server.uri()).generate(request()).await.unwrap();
    assert_eq!(receipt.user_story_id, 5);
    assert_eq!(receipt.message, "Test cases generados");
    assert_eq!(receipt.status, "completed");
}

#[tokio::test]
async fn generation_failure_without_detail_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generar-testcases/"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad upload"))
        .mount(&server)
        .await;

    let err = suites_for(&server.uri()).generate(request()).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Validation {
            status: 400,
            message: "Failed to generate test cases".to_owned(),
        }
    );
}
