//! Shared test doubles for the end-to-end flows: an in-memory question
//! store with scriptable failures and a prompt that replays canned
//! operator answers.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use uuid::Uuid;

use trivia_dedup::dedup::error::{DedupError, Result};
use trivia_dedup::dedup::models::{Difficulty, Question};
use trivia_dedup::dedup::resolution::OperatorPrompt;
use trivia_dedup::dedup::store::QuestionStore;

/// Fluent builder for seeding corpus rows.
pub struct QuestionBuilder {
    question: Question,
}

impl QuestionBuilder {
    pub fn new(text: &str, answer: &str) -> Self {
        Self {
            question: Question {
                id: Uuid::new_v4(),
                question_text: text.to_string(),
                answer_choices: Vec::new(),
                correct_answer: answer.to_string(),
                topic: None,
                subtopic: None,
                tags: Vec::new(),
                difficulty: Difficulty::Unknown,
                language: "en".to_string(),
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            },
        }
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.question.difficulty = difficulty;
        self
    }

    /// Offset from the shared base timestamp, so ordering is deterministic.
    pub fn created_days_later(mut self, days: i64) -> Self {
        self.question.created_at = self.question.created_at + Duration::days(days);
        self
    }

    pub fn build(self) -> Question {
        self.question
    }
}

/// In-memory store backing both flows in tests. Failures are scripted per
/// offset (fetch) or per call index (delete).
pub struct InMemoryQuestionStore {
    questions: Mutex<Vec<Question>>,
    fail_count_query: bool,
    failing_offsets: HashSet<u64>,
    failing_batches: HashSet<usize>,
    pub page_calls: Mutex<Vec<(u64, u64)>>,
    pub delete_calls: Mutex<Vec<Vec<Uuid>>>,
}

impl InMemoryQuestionStore {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions: Mutex::new(questions),
            fail_count_query: false,
            failing_offsets: HashSet::new(),
            failing_batches: HashSet::new(),
            page_calls: Mutex::new(Vec::new()),
            delete_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_failing_count(mut self) -> Self {
        self.fail_count_query = true;
        self
    }

    pub fn with_failing_offsets(mut self, offsets: &[u64]) -> Self {
        self.failing_offsets = offsets.iter().copied().collect();
        self
    }

    /// Fail the nth delete call (zero-based).
    pub fn with_failing_batches(mut self, batches: &[usize]) -> Self {
        self.failing_batches = batches.iter().copied().collect();
        self
    }

    pub fn remaining(&self) -> Vec<Question> {
        self.questions.lock().unwrap().clone()
    }

    pub fn remaining_ids(&self) -> HashSet<Uuid> {
        self.questions.lock().unwrap().iter().map(|q| q.id).collect()
    }

    pub fn delete_call_sizes(&self) -> Vec<usize> {
        self.delete_calls
            .lock()
            .unwrap()
            .iter()
            .map(|batch| batch.len())
            .collect()
    }
}

#[async_trait]
impl QuestionStore for InMemoryQuestionStore {
    async fn count_questions(&self) -> Result<u64> {
        if self.fail_count_query {
            return Err(DedupError::CountQuery {
                message: "scripted count failure".to_string(),
            });
        }
        Ok(self.questions.lock().unwrap().len() as u64)
    }

    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<Question>> {
        self.page_calls.lock().unwrap().push((offset, limit));
        if self.failing_offsets.contains(&offset) {
            return Err(DedupError::Unknown(format!(
                "scripted page failure at offset {offset}"
            )));
        }
        let questions = self.questions.lock().unwrap();
        Ok(questions
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn delete_batch(&self, ids: &[Uuid]) -> Result<u64> {
        let call_index = {
            let mut calls = self.delete_calls.lock().unwrap();
            calls.push(ids.to_vec());
            calls.len() - 1
        };
        if self.failing_batches.contains(&call_index) {
            return Err(DedupError::Unknown(format!(
                "scripted delete failure on batch {call_index}"
            )));
        }
        let mut questions = self.questions.lock().unwrap();
        let before = questions.len();
        questions.retain(|q| !ids.contains(&q.id));
        Ok((before - questions.len()) as u64)
    }
}

/// Prompt that replays canned answers and records every question asked.
/// Running out of answers yields the empty string, which every parser
/// treats as the safe choice.
pub struct ScriptedPrompt {
    responses: VecDeque<String>,
    pub transcript: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|s| s.to_string()).collect(),
            transcript: Vec::new(),
        }
    }
}

#[async_trait]
impl OperatorPrompt for ScriptedPrompt {
    async fn ask(&mut self, prompt: &str) -> Result<String> {
        self.transcript.push(prompt.to_string());
        Ok(self.responses.pop_front().unwrap_or_default())
    }
}
