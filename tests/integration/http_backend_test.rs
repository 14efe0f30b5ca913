//! HttpBackend against a wiremock server

use crate::common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use studycache::client::api_client::HttpBackend;
use studycache::client::remote::{AttemptSink, StudySetSource};
use studycache::client::sync::{ReachabilityMonitor, SyncReport};
use studycache::client::OfflinePractice;
use studycache::shared::{AppConfig, AttemptBatch, SetKind, TransportError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer, token: Option<&str>) -> HttpBackend {
    let mut builder = AppConfig::builder().server_url(server.uri());
    if let Some(token) = token {
        builder = builder.token(token);
    }
    assert_ok!(HttpBackend::new(assert_ok!(builder.build())))
}

fn set_seven_body() -> serde_json::Value {
    json!({
        "id": 7,
        "title": "Times tables",
        "subject": "Mathematics",
        "type": "Problem set",
        "level": "Year 8",
        "description": null,
        "owner_id": 12,
        "is_offline": false
    })
}

fn set_seven_questions_body() -> serde_json::Value {
    json!([
        {"id": 101, "type": "multiple_choice", "content": "What is 6 x 7?",
         "correct_answer": "42", "options": ["36", "42", "48"], "position": 0},
        {"id": 102, "type": "multiple_choice", "content": "What is 9 x 8?",
         "correct_answer": "72", "options": ["63", "72", "81"], "position": 1}
    ])
}

async fn mount_set_seven(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/study-sets/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(set_seven_body()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/study-sets/7/questions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(set_seven_questions_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_set_and_questions_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/study-sets/7"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(set_seven_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/study-sets/7/questions"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(set_seven_questions_body()))
        .expect(1)
        .mount(&server)
        .await;
    let backend = backend_for(&server, Some("secret-token"));

    let meta = assert_ok!(backend.fetch_study_set(7).await);
    let questions = assert_ok!(backend.fetch_questions(7).await);

    assert_eq!(meta.kind, SetKind::ProblemSet);
    assert_eq!(meta.description, None);
    assert_eq!(questions, set_seven_questions());
}

#[tokio::test]
async fn test_error_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/study-sets/9"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"detail": "Not allowed to view this set"})),
        )
        .mount(&server)
        .await;
    let backend = backend_for(&server, None);

    let err = backend.fetch_study_set(9).await.unwrap_err();

    match &err {
        TransportError::Status { status, detail } => {
            assert_eq!(*status, 403);
            assert_eq!(detail, "Not allowed to view this set");
        }
        other => panic!("Expected status error, got {:?}", other),
    }
    assert_contains!(err.to_string(), "403");
}

#[tokio::test]
async fn test_error_without_body_uses_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/study-sets/attempts/batch"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let backend = backend_for(&server, None);

    let result = backend.submit_attempts(&AttemptBatch { attempts: vec![] }).await;

    assert_err!(result, TransportError::Status { status: 500, .. });
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/study-sets/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "type": "Essay"})))
        .mount(&server)
        .await;
    let backend = backend_for(&server, None);

    assert_err!(backend.fetch_study_set(7).await, TransportError::Decode(_));
}

#[tokio::test]
async fn test_unreachable_backend_is_http_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let config = assert_ok!(AppConfig::builder()
        .server_url(format!("http://{}", addr))
        .request_timeout(std::time::Duration::from_secs(2))
        .build());
    let backend = assert_ok!(HttpBackend::new(config));

    assert_err!(backend.fetch_questions(7).await, TransportError::Http(_));
}

#[tokio::test]
async fn test_offline_flag_verbs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/study-sets/7/offline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"is_offline": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/study-sets/7/offline"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let backend = backend_for(&server, None);

    assert_ok!(backend.set_offline_flag(7, true).await);
    assert_ok!(backend.set_offline_flag(7, false).await);
}

#[tokio::test]
async fn test_download_record_sync_over_http() {
    let server = MockServer::start().await;
    mount_set_seven(&server).await;
    Mock::given(method("POST"))
        .and(path("/study-sets/7/offline"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/study-sets/attempts/batch"))
        .and(body_partial_json(json!({
            "attempts": [
                {"set_id": 7, "question_id": 101, "is_correct": true, "answer": "42"},
                {"set_id": 7, "question_id": 102, "is_correct": false, "answer": "63"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"created": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = Arc::new(backend_for(&server, Some("token")));
    let practice = OfflinePractice::new(memory_store().await, backend, ReachabilityMonitor::default());

    // The offline flag failing must not fail the download
    let cached = assert_ok!(practice.download(7).await);
    assert_eq!(cached.question_count(), 2);

    assert_ok!(practice.record(1, 7, 101, "42", true).await);
    assert_ok!(practice.record(1, 7, 102, "63", false).await);
    assert_eq!(practice.sync().await, SyncReport::synced(2));

    let requests = server.received_requests().await.unwrap();
    let batch = requests
        .iter()
        .find(|r| r.url.path() == "/study-sets/attempts/batch")
        .expect("batch request should be sent");
    let body: serde_json::Value = serde_json::from_slice(&batch.body).unwrap();
    for attempt in body["attempts"].as_array().unwrap() {
        assert!(attempt["timestamp"].is_string());
        assert!(attempt["idempotency_key"].is_string());
    }
}

#[tokio::test]
async fn test_rejected_batch_stays_pending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/study-sets/attempts/batch"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})))
        .mount(&server)
        .await;
    let backend = Arc::new(backend_for(&server, None));
    let practice = OfflinePractice::new(memory_store().await, backend, ReachabilityMonitor::default());
    assert_ok!(practice.record(1, 7, 101, "42", true).await);

    let report = practice.sync().await;

    assert_eq!(report, SyncReport::failed(1));
    assert_eq!(assert_ok!(practice.pending_count().await), 1);
}
