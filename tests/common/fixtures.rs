//! Study set and store fixtures

use studycache::client::local_db::LocalStore;
use studycache::shared::{QuestionSnapshot, SetId, SetKind, StudySetMeta};

/// Fresh in-memory store
pub async fn memory_store() -> LocalStore {
    LocalStore::in_memory()
        .await
        .expect("in-memory store should open")
}

pub fn sample_meta(id: SetId, title: &str) -> StudySetMeta {
    StudySetMeta {
        id,
        title: title.to_string(),
        subject: Some("Mathematics".to_string()),
        kind: SetKind::Quiz,
        level: Some("Year 8".to_string()),
        description: Some("Mental arithmetic warm-up".to_string()),
    }
}

pub fn multiple_choice(id: i64, content: &str, answer: &str, options: &[&str]) -> QuestionSnapshot {
    QuestionSnapshot {
        id,
        question_type: "multiple_choice".to_string(),
        content: content.to_string(),
        correct_answer: answer.to_string(),
        options: Some(options.iter().map(|o| o.to_string()).collect()),
        term: None,
        definition: None,
    }
}

pub fn flashcard(id: i64, term: &str, definition: &str) -> QuestionSnapshot {
    QuestionSnapshot {
        id,
        question_type: "flashcard".to_string(),
        content: term.to_string(),
        correct_answer: definition.to_string(),
        options: None,
        term: Some(term.to_string()),
        definition: Some(definition.to_string()),
    }
}

/// Questions 101 and 102 of set 7
pub fn set_seven_questions() -> Vec<QuestionSnapshot> {
    vec![
        multiple_choice(101, "What is 6 x 7?", "42", &["36", "42", "48"]),
        multiple_choice(102, "What is 9 x 8?", "72", &["63", "72", "81"]),
    ]
}
