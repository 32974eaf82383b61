use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Editorial difficulty tier of a question. Stored in PostgreSQL as the
/// `question_difficulty` enum; rows predating the tiering rollout carry
/// `unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "question_difficulty", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Unknown,
}

impl Difficulty {
    /// Keep preference used when choosing the canonical member of a group.
    /// Lower ranks are kept: medium reads best in the product, hard is still
    /// curated content, easy is usually the throwaway paraphrase.
    pub fn keep_rank(&self) -> u8 {
        match self {
            Difficulty::Medium => 0,
            Difficulty::Hard => 1,
            Difficulty::Easy => 2,
            Difficulty::Unknown => 3,
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "unknown" => Ok(Difficulty::Unknown),
            _ => Err(format!("Invalid difficulty: {s}")),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// One row of the trivia question bank. The table is owned by the content
/// pipeline; this tool reads it and deletes from it but never inserts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: Uuid,
    pub question_text: String,
    pub answer_choices: Vec<String>,
    pub correct_answer: String,
    pub topic: Option<String>,
    pub subtopic: Option<String>,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

/// Structural signature of a question text, extracted once per record and
/// compared pairwise during grouping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fingerprint {
    /// Byte offset of the first "known/famous for" marker, if any.
    pub known_for_position: Option<usize>,
    /// The clause following that marker, up to the next punctuation.
    pub known_for_clause: Option<String>,
    /// Quoted titles or names, lowercased, longer than two characters.
    pub quoted_entities: Vec<String>,
    /// Attribution vocabulary present in the text (paint, wrote, actor, ...).
    pub property_words: Vec<String>,
}

impl Fingerprint {
    pub fn has_known_for(&self) -> bool {
        self.known_for_position.is_some()
    }
}

/// What a question is asking for, classified by an ordered rule cascade.
/// Specific phrasings win over generic question words.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Intent {
    YearOrDate,
    Location,
    Person,
    Quantity,
    Reason,
    Process,
    Definition,
    Characteristic,
    Example,
    Comparison,
    Category,
    /// "which <noun>" with the noun captured, e.g. which_actor.
    Which(String),
    KnownFor,
    Creation,
    WhatGeneral,
    WhichGeneral,
    WhereGeneral,
    WhenGeneral,
    WhoGeneral,
    WhyGeneral,
    HowGeneral,
    Unknown,
}

impl Intent {
    /// Snake-case label used in report histograms.
    pub fn label(&self) -> String {
        match self {
            Intent::YearOrDate => "year_or_date".to_string(),
            Intent::Location => "location".to_string(),
            Intent::Person => "person".to_string(),
            Intent::Quantity => "quantity".to_string(),
            Intent::Reason => "reason".to_string(),
            Intent::Process => "process".to_string(),
            Intent::Definition => "definition".to_string(),
            Intent::Characteristic => "characteristic".to_string(),
            Intent::Example => "example".to_string(),
            Intent::Comparison => "comparison".to_string(),
            Intent::Category => "category".to_string(),
            Intent::Which(noun) => format!("which_{noun}"),
            Intent::KnownFor => "known_for".to_string(),
            Intent::Creation => "creation".to_string(),
            Intent::WhatGeneral => "what_general".to_string(),
            Intent::WhichGeneral => "which_general".to_string(),
            Intent::WhereGeneral => "where_general".to_string(),
            Intent::WhenGeneral => "when_general".to_string(),
            Intent::WhoGeneral => "who_general".to_string(),
            Intent::WhyGeneral => "why_general".to_string(),
            Intent::HowGeneral => "how_general".to_string(),
            Intent::Unknown => "unknown".to_string(),
        }
    }
}

/// Per-question features computed by the extractor before grouping.
#[derive(Debug, Clone)]
pub struct QuestionFeatures {
    /// Trimmed, lowercased correct answer.
    pub normalized_answer: String,
    /// Content tokens with stop words and short tokens removed.
    pub keywords: Vec<String>,
    pub fingerprint: Fingerprint,
    pub intent: Intent,
}

/// Which grouping pass produced a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "answer", rename_all = "lowercase")]
pub enum GroupKind {
    /// Answer-anchored pass; carries the shared normalized answer.
    Answer(String),
    /// Text-anchored pass over the remaining records.
    Text,
}

impl GroupKind {
    pub fn label(&self) -> &'static str {
        match self {
            GroupKind::Answer(_) => "answer",
            GroupKind::Text => "text",
        }
    }
}

/// A set of questions judged to be semantic duplicates of one another.
/// Members are ordered by keep preference: the canonical question is at
/// index 0 and everything after it is a removal candidate.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    #[serde(flatten)]
    pub kind: GroupKind,
    pub members: Vec<Question>,
}

impl DuplicateGroup {
    pub fn canonical(&self) -> Option<&Question> {
        self.members.first()
    }

    pub fn removal_candidates(&self) -> &[Question] {
        self.members.get(1..).unwrap_or(&[])
    }

    pub fn removal_ids(&self) -> Vec<Uuid> {
        self.removal_candidates().iter().map(|q| q.id).collect()
    }

    /// True when every member stores exactly the same raw `correct_answer`.
    /// Groups that fail this are the risky ones: high text similarity with
    /// different answers usually means distinct facts, not duplicates.
    pub fn has_uniform_answer(&self) -> bool {
        let answers: HashSet<&str> = self
            .members
            .iter()
            .map(|q| q.correct_answer.as_str())
            .collect();
        answers.len() <= 1
    }
}
