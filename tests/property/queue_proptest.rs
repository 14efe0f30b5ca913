//! Property-based tests for the attempt queue
//!
//! Uses proptest to generate random practice sessions and verify that a
//! failed sync never loses or alters queued attempts.

use crate::common::*;
use proptest::prelude::*;
use std::sync::Arc;
use studycache::client::local_db::AttemptFilter;
use studycache::client::sync::{ReachabilityMonitor, SyncReport};
use studycache::client::OfflinePractice;
use studycache::shared::AnswerValue;

fn answer_strategy() -> impl Strategy<Value = AnswerValue> {
    prop_oneof![
        "[a-z0-9 ]{0,12}".prop_map(AnswerValue::Text),
        any::<bool>().prop_map(AnswerValue::Bool),
        (-1000i64..1000).prop_map(AnswerValue::from),
    ]
}

fn session_strategy() -> impl Strategy<Value = Vec<(i64, i64, AnswerValue, bool)>> {
    prop::collection::vec((1i64..20, 1i64..500, answer_strategy(), any::<bool>()), 1..15)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_failed_sync_preserves_queue(session in session_strategy()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let backend = Arc::new(StubBackend::new());
            let practice =
                OfflinePractice::new(memory_store().await, backend.clone(), ReachabilityMonitor::default());
            for (set_id, question_id, answer, is_correct) in &session {
                practice
                    .record(1, *set_id, *question_id, answer.clone(), *is_correct)
                    .await
                    .unwrap();
            }
            let before = practice
                .store()
                .list_pending_attempts(&AttemptFilter::default())
                .await
                .unwrap();

            backend.set_batches_failing(true);
            let failed = practice.sync().await;
            let after = practice
                .store()
                .list_pending_attempts(&AttemptFilter::default())
                .await
                .unwrap();

            prop_assert_eq!(failed, SyncReport::failed(session.len()));
            prop_assert_eq!(&after, &before);

            backend.set_batches_failing(false);
            let synced = practice.sync().await;
            let expected: Vec<_> = before.iter().map(|a| a.to_submission()).collect();

            prop_assert_eq!(synced, SyncReport::synced(session.len()));
            prop_assert_eq!(backend.received(), expected);
            prop_assert_eq!(practice.pending_count().await.unwrap(), 0);
            Ok(())
        })?;
    }
}
