//! End-to-end tests for the detection flow:
//! - paged fetch over a seeded corpus, including failure degradation
//! - feature extraction and two-pass grouping
//! - report content and JSON export

mod helpers;

use anyhow::Result;
use helpers::{InMemoryQuestionStore, QuestionBuilder};
use std::time::Duration;
use trivia_dedup::dedup::error::DedupError;
use trivia_dedup::{
    run_detection, Difficulty, FetchConfig, GroupKind, GroupingConfig, Question,
};

fn fast_fetch(page_size: u64) -> FetchConfig {
    FetchConfig {
        page_size,
        page_delay: Duration::ZERO,
        max_records: None,
    }
}

/// A corpus with one answer-anchored duplicate pair, one text-anchored
/// pair, a pair blocked by the different-properties veto, and four
/// questions with low-information answers.
fn seeded_corpus() -> Vec<Question> {
    vec![
        QuestionBuilder::new("What is the capital of France?", "Paris")
            .difficulty(Difficulty::Medium)
            .build(),
        QuestionBuilder::new("What is the capital city of France?", "Paris")
            .difficulty(Difficulty::Easy)
            .created_days_later(1)
            .build(),
        QuestionBuilder::new("What is the tallest mountain in the world?", "Mount Everest")
            .difficulty(Difficulty::Medium)
            .created_days_later(2)
            .build(),
        QuestionBuilder::new(
            "Name the peak that rises highest above sea level.",
            "Mount Everest",
        )
        .difficulty(Difficulty::Hard)
        .created_days_later(3)
        .build(),
        QuestionBuilder::new("What is the tallest mountain of the world?", "Mt Everest")
            .difficulty(Difficulty::Easy)
            .created_days_later(4)
            .build(),
        QuestionBuilder::new(
            "Which artist is known for painting the 'Mona Lisa' in Italy?",
            "Leonardo da Vinci",
        )
        .difficulty(Difficulty::Medium)
        .created_days_later(5)
        .build(),
        QuestionBuilder::new(
            "What artist is known for painting royal portraits in Italy?",
            "Leonardo da Vinci",
        )
        .difficulty(Difficulty::Medium)
        .created_days_later(6)
        .build(),
        QuestionBuilder::new("Is the sky blue on a clear day?", "true")
            .difficulty(Difficulty::Easy)
            .created_days_later(7)
            .build(),
        QuestionBuilder::new("Can penguins fly south in winter?", "true")
            .difficulty(Difficulty::Easy)
            .created_days_later(8)
            .build(),
        QuestionBuilder::new("How many sides does a triangle have?", "3")
            .difficulty(Difficulty::Easy)
            .created_days_later(9)
            .build(),
        QuestionBuilder::new("How many primary colors are there?", "3")
            .difficulty(Difficulty::Easy)
            .created_days_later(10)
            .build(),
    ]
}

#[tokio::test]
async fn test_scan_reports_duplicate_groups() -> Result<()> {
    let corpus = seeded_corpus();
    let capital_keep = corpus[0].id;
    let capital_drop = corpus[1].id;
    let mountain_anchor = corpus[2].id;
    let mountain_reworded = corpus[3].id;
    let mountain_close = corpus[4].id;
    let store = InMemoryQuestionStore::new(corpus);

    let report = run_detection(&store, fast_fetch(4), GroupingConfig::default()).await?;

    assert_eq!(report.store_count, 11);
    assert_eq!(report.scanned, 11);
    assert!(report.failed_pages.is_empty());
    assert_eq!(report.groups.len(), 2);

    // Answer-anchored groups come first.
    assert_eq!(report.groups[0].kind, GroupKind::Answer("paris".to_string()));
    assert_eq!(
        report.groups[0].canonical().map(|q| q.id),
        Some(capital_keep)
    );
    assert_eq!(report.groups[0].removal_ids(), vec![capital_drop]);

    assert_eq!(report.groups[1].kind, GroupKind::Text);
    let text_members: Vec<_> = report.groups[1].members.iter().map(|q| q.id).collect();
    assert!(text_members.contains(&mountain_anchor));
    assert!(text_members.contains(&mountain_close));
    assert!(!text_members.contains(&mountain_reworded));

    // The veto pair and the low-information answers stay out of every group.
    let grouped: usize = report.groups.iter().map(|g| g.members.len()).sum();
    assert_eq!(grouped, 4);

    let classified: usize = report.intent_counts.values().sum();
    assert_eq!(classified, 11);
    assert!(report.intent_counts["location"] >= 1);

    let rendered = report.render_text();
    assert!(rendered.contains("Scanned 11 of 11 questions"));
    assert!(rendered.contains("Found 2 duplicate group(s)"));
    assert!(rendered.contains("shared answer: \"paris\""));
    Ok(())
}

#[tokio::test]
async fn test_scan_tolerates_failed_pages() -> Result<()> {
    let corpus = seeded_corpus();
    let store = InMemoryQuestionStore::new(corpus).with_failing_offsets(&[4]);

    let report = run_detection(&store, fast_fetch(4), GroupingConfig::default()).await?;

    assert_eq!(report.store_count, 11);
    assert_eq!(report.scanned, 7);
    assert_eq!(report.failed_pages, vec![4]);

    let rendered = report.render_text();
    assert!(rendered.contains("Scanned 7 of 11 questions"));
    assert!(rendered.contains("Warning: 1 page(s) failed to fetch"));
    Ok(())
}

#[tokio::test]
async fn test_scan_count_failure_is_fatal() {
    let store = InMemoryQuestionStore::new(seeded_corpus()).with_failing_count();

    let result = run_detection(&store, fast_fetch(4), GroupingConfig::default()).await;

    assert!(matches!(result, Err(DedupError::CountQuery { .. })));
    assert!(store.page_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_scan_limit_caps_records_considered() -> Result<()> {
    let store = InMemoryQuestionStore::new(seeded_corpus());
    let fetch = FetchConfig {
        page_size: 2,
        page_delay: Duration::ZERO,
        max_records: Some(3),
    };

    let report = run_detection(&store, fetch, GroupingConfig::default()).await?;

    assert_eq!(report.scanned, 3);
    assert_eq!(report.store_count, 11);
    let calls = store.page_calls.lock().unwrap().clone();
    assert_eq!(calls, vec![(0, 2), (2, 1)]);
    Ok(())
}

#[tokio::test]
async fn test_scan_json_export() -> Result<()> {
    let store = InMemoryQuestionStore::new(seeded_corpus());
    let report = run_detection(&store, fast_fetch(100), GroupingConfig::default()).await?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("report.json");
    report.write_json(&path)?;

    let raw = std::fs::read_to_string(&path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    assert_eq!(value["scanned"], 11);
    assert_eq!(value["groups"][0]["type"], "answer");
    assert_eq!(value["groups"][0]["answer"], "paris");
    assert_eq!(value["groups"][0]["members"].as_array().map(|m| m.len()), Some(2));
    assert_eq!(value["groups"][1]["type"], "text");
    Ok(())
}
