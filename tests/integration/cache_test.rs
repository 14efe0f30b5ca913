//! Download, refresh and eviction of offline study sets

use crate::common::*;
use pretty_assertions::assert_eq;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use studycache::client::local_db::AttemptFilter;
use studycache::client::sync::{NetworkStatus, ReachabilityMonitor};
use studycache::client::OfflinePractice;
use studycache::shared::{PracticeError, SetKind, StudySetMeta, TransportError};

async fn practice_with(backend: Arc<StubBackend>) -> OfflinePractice {
    OfflinePractice::new(memory_store().await, backend, ReachabilityMonitor::default())
}

#[tokio::test]
async fn test_download_round_trip() {
    let backend = Arc::new(StubBackend::new());
    let meta = sample_meta(7, "Times tables");
    let questions = vec![
        multiple_choice(101, "What is 6 x 7?", "42", &["36", "42", "48"]),
        flashcard(103, "Product", "The result of multiplying"),
    ];
    backend.publish(meta.clone(), questions.clone());
    let practice = practice_with(backend.clone()).await;

    assert!(!assert_ok!(practice.is_downloaded(7).await));
    assert_ok!(practice.download(7).await);
    assert!(assert_ok!(practice.is_downloaded(7).await));

    let cached = assert_ok!(practice.get_downloaded(7).await).expect("set should be cached");
    assert_eq!(cached.set_id, meta.id);
    assert_eq!(cached.title, meta.title);
    assert_eq!(cached.subject, meta.subject);
    assert_eq!(cached.level, meta.level);
    assert_eq!(cached.description, meta.description);
    assert_eq!(cached.kind, meta.kind);
    assert_eq!(cached.questions, questions);
    assert_eq!(backend.offline_flags(), vec![(7, true)]);
}

#[tokio::test]
async fn test_redownload_replaces_snapshot() {
    let backend = Arc::new(StubBackend::new());
    backend.publish(sample_meta(7, "Times tables"), set_seven_questions());
    let practice = practice_with(backend.clone()).await;
    assert_ok!(practice.download(7).await);

    let revised = StudySetMeta {
        id: 7,
        title: "Times tables (revised)".to_string(),
        subject: None,
        kind: SetKind::Flashcards,
        level: None,
        description: None,
    };
    let revised_questions = vec![flashcard(110, "Factor", "A number that divides another")];
    backend.publish(revised.clone(), revised_questions.clone());
    assert_ok!(practice.download(7).await);

    let cached = assert_ok!(practice.get_downloaded(7).await).unwrap();
    assert_eq!(cached.title, revised.title);
    assert_eq!(cached.subject, None);
    assert_eq!(cached.level, None);
    assert_eq!(cached.description, None);
    assert_eq!(cached.kind, SetKind::Flashcards);
    assert_eq!(cached.questions, revised_questions);
    assert_eq!(assert_ok!(practice.list_downloaded().await).len(), 1);
}

#[tokio::test]
async fn test_download_offline_fails_without_writing() {
    let backend = Arc::new(StubBackend::new());
    backend.publish(sample_meta(7, "Times tables"), set_seven_questions());
    let practice = practice_with(backend).await;
    practice.monitor().report(NetworkStatus::Offline);

    let result = practice.download(7).await;

    assert_err!(result, PracticeError::Offline { action: "download" });
    assert!(!assert_ok!(practice.is_downloaded(7).await));
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let backend = Arc::new(StubBackend::new());
    backend.publish(sample_meta(7, "Times tables"), set_seven_questions());
    let practice = practice_with(backend.clone()).await;
    let original = assert_ok!(practice.download(7).await);

    backend.publish(sample_meta(7, "Should not land"), vec![]);
    backend.fail_questions.store(true, Ordering::SeqCst);
    let result = practice.download(7).await;

    assert_err!(result, PracticeError::Transport(TransportError::Status { status: 502, .. }));
    assert_eq!(assert_ok!(practice.get_downloaded(7).await), Some(original));
}

#[tokio::test]
async fn test_unknown_set_is_not_cached() {
    let practice = practice_with(Arc::new(StubBackend::new())).await;

    let result = practice.download(404).await;

    assert_err!(result, PracticeError::Transport(TransportError::Status { status: 404, .. }));
    assert!(assert_ok!(practice.list_downloaded().await).is_empty());
}

#[tokio::test]
async fn test_remove_leaves_attempts_queued() {
    let backend = Arc::new(StubBackend::new());
    backend.publish(sample_meta(5, "Fractions"), set_seven_questions());
    let practice = practice_with(backend).await;
    assert_ok!(practice.download(5).await);
    let first = assert_ok!(practice.record(1, 5, 101, "42", true).await);
    let second = assert_ok!(practice.record(1, 5, 102, "63", false).await);
    let before = assert_ok!(
        practice
            .store()
            .list_pending_attempts(&AttemptFilter::for_set(5))
            .await
    );

    assert_ok!(practice.remove(5).await);
    assert_ok!(practice.remove(5).await);

    assert!(!assert_ok!(practice.is_downloaded(5).await));
    let after = assert_ok!(
        practice
            .store()
            .list_pending_attempts(&AttemptFilter::for_set(5))
            .await
    );
    assert_eq!(after, before);
    assert_eq!(
        after.iter().map(|a| a.local_id).collect::<Vec<_>>(),
        vec![first, second]
    );
}

#[tokio::test]
async fn test_cached_sets_readable_offline() {
    let backend = Arc::new(StubBackend::new());
    backend.publish(sample_meta(1, "Addition"), set_seven_questions());
    backend.publish(sample_meta(2, "Subtraction"), set_seven_questions());
    let practice = practice_with(backend).await;
    assert_ok!(practice.download(1).await);
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_ok!(practice.download(2).await);

    practice.monitor().report(NetworkStatus::Offline);

    let listed: Vec<i64> = assert_ok!(practice.list_downloaded().await)
        .into_iter()
        .map(|set| set.set_id)
        .collect();
    assert_eq!(listed, vec![2, 1]);
    assert!(assert_ok!(practice.is_downloaded(1).await));
    let cached = assert_ok!(practice.get_downloaded(1).await).unwrap();
    assert_eq!(cached.question(101).map(|q| q.correct_answer.as_str()), Some("42"));
}
