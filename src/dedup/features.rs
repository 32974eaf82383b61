//! Per-question feature extraction: normalized answer, keywords, structural
//! fingerprint, and intent classification.

use regex::Regex;

use super::models::{Fingerprint, Intent, Question, QuestionFeatures};
use super::vocabulary::{property_words, PROPERTY_VERBS, STOP_WORDS};

/// Extracts comparison features from question texts. Holds its regexes
/// compiled, so build one per run and reuse it across the corpus.
pub struct FeatureExtractor {
    known_for: Regex,
    known_for_clause: Regex,
    quoted: Regex,
    which_noun: Regex,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            known_for: Regex::new(
                r"(?:known|famous|recognized|remembered|celebrated)\s+(?:for|as)",
            )
            .unwrap(),
            known_for_clause: Regex::new(
                r"(?:known|famous|recognized|remembered|celebrated)\s+(?:for|as)\s+([^?.!,;]+)",
            )
            .unwrap(),
            quoted: Regex::new(r#"'([^']{3,})'|"([^"]{3,})"|‘([^’]{3,})’|“([^”]{3,})”"#).unwrap(),
            which_noun: Regex::new(r"which\s+([a-z]{3,})").unwrap(),
        }
    }

    pub fn extract(&self, question: &Question) -> QuestionFeatures {
        QuestionFeatures {
            normalized_answer: normalize_answer(&question.correct_answer),
            keywords: self.keywords(&question.question_text),
            fingerprint: self.fingerprint(&question.question_text),
            intent: self.classify_intent(&question.question_text),
        }
    }

    /// Lowercased content tokens, deduplicated in order of first appearance.
    /// Tokens of one or two characters and stop words are dropped.
    pub fn keywords(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase();
        let mut keywords: Vec<String> = Vec::new();
        for token in text.split(|c: char| !c.is_alphanumeric()) {
            if token.len() <= 2 || STOP_WORDS.contains(&token) {
                continue;
            }
            if !keywords.iter().any(|k| k == token) {
                keywords.push(token.to_string());
            }
        }
        keywords
    }

    /// Structural fingerprint: known-for marker, quoted entities, and
    /// attribution vocabulary present in the text.
    pub fn fingerprint(&self, text: &str) -> Fingerprint {
        let text = text.to_lowercase();

        let known_for_position = self.known_for.find(&text).map(|m| m.start());
        let known_for_clause = self
            .known_for_clause
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string());

        let mut quoted_entities: Vec<String> = Vec::new();
        for caps in self.quoted.captures_iter(&text) {
            // One capture group per quote style; exactly one is populated.
            for group in 1..=4 {
                if let Some(m) = caps.get(group) {
                    let entity = m.as_str().trim().to_string();
                    if entity.len() > 2 && !quoted_entities.contains(&entity) {
                        quoted_entities.push(entity);
                    }
                }
            }
        }

        let property_words = property_words()
            .filter(|word| text.contains(word))
            .map(str::to_string)
            .collect();

        Fingerprint {
            known_for_position,
            known_for_clause,
            quoted_entities,
            property_words,
        }
    }

    /// Ordered rule cascade: the first matching rule decides the intent,
    /// so specific phrasings must stay above the generic question words.
    pub fn classify_intent(&self, text: &str) -> Intent {
        type Rule = fn(&FeatureExtractor, &str) -> Option<Intent>;
        const RULES: &[Rule] = &[
            FeatureExtractor::rule_year_or_date,
            FeatureExtractor::rule_location,
            FeatureExtractor::rule_person,
            FeatureExtractor::rule_quantity,
            FeatureExtractor::rule_reason,
            FeatureExtractor::rule_process,
            FeatureExtractor::rule_definition,
            FeatureExtractor::rule_characteristic,
            FeatureExtractor::rule_example,
            FeatureExtractor::rule_comparison,
            FeatureExtractor::rule_category,
            FeatureExtractor::rule_which_noun,
            FeatureExtractor::rule_known_for,
            FeatureExtractor::rule_creation,
            FeatureExtractor::rule_question_word,
        ];

        let text = text.to_lowercase();
        for rule in RULES {
            if let Some(intent) = rule(self, &text) {
                return intent;
            }
        }
        Intent::Unknown
    }

    fn rule_year_or_date(&self, text: &str) -> Option<Intent> {
        const MARKERS: &[&str] = &[
            "what year",
            "which year",
            "what date",
            "which date",
            "what century",
            "which century",
            "what decade",
            "which decade",
        ];
        contains_any(text, MARKERS).then_some(Intent::YearOrDate)
    }

    fn rule_location(&self, text: &str) -> Option<Intent> {
        const MARKERS: &[&str] = &[
            "what country",
            "which country",
            "what city",
            "which city",
            "what continent",
            "which continent",
            "what state",
            "which state",
            "what river",
            "which river",
            "capital of",
            "located in",
            "located at",
        ];
        contains_any(text, MARKERS).then_some(Intent::Location)
    }

    fn rule_person(&self, text: &str) -> Option<Intent> {
        const MARKERS: &[&str] = &[
            "who is",
            "who was",
            "who are",
            "who were",
            "what person",
            "which person",
        ];
        contains_any(text, MARKERS).then_some(Intent::Person)
    }

    fn rule_quantity(&self, text: &str) -> Option<Intent> {
        const MARKERS: &[&str] = &["how many", "how much", "number of", "count of"];
        contains_any(text, MARKERS).then_some(Intent::Quantity)
    }

    fn rule_reason(&self, text: &str) -> Option<Intent> {
        const MARKERS: &[&str] = &[
            "why did",
            "why does",
            "why do",
            "why is",
            "why are",
            "why was",
            "why were",
            "what causes",
            "what caused",
            "reason for",
        ];
        contains_any(text, MARKERS).then_some(Intent::Reason)
    }

    fn rule_process(&self, text: &str) -> Option<Intent> {
        const MARKERS: &[&str] = &[
            "how do",
            "how does",
            "how did",
            "how is",
            "how are",
            "how can",
            "how to",
            "what process",
            "what steps",
        ];
        contains_any(text, MARKERS).then_some(Intent::Process)
    }

    fn rule_definition(&self, text: &str) -> Option<Intent> {
        const MARKERS: &[&str] = &["what is a ", "what is an ", "definition of", "meaning of"];
        if contains_any(text, MARKERS) || (text.contains("what does") && text.contains("mean")) {
            Some(Intent::Definition)
        } else {
            None
        }
    }

    fn rule_characteristic(&self, text: &str) -> Option<Intent> {
        const MARKERS: &[&str] = &[
            "what color",
            "what colour",
            "what shape",
            "what size",
            "how tall",
            "how big",
            "how long",
            "how heavy",
            "how large",
            "how fast",
            "how old",
        ];
        contains_any(text, MARKERS).then_some(Intent::Characteristic)
    }

    fn rule_example(&self, text: &str) -> Option<Intent> {
        const MARKERS: &[&str] = &[
            "example of",
            "an example",
            "for example",
            "such as",
            "name one",
            "name a ",
        ];
        contains_any(text, MARKERS).then_some(Intent::Example)
    }

    fn rule_comparison(&self, text: &str) -> Option<Intent> {
        const MARKERS: &[&str] = &[
            "difference between",
            "differences between",
            "compare",
            "versus",
            " vs ",
            "similarities between",
            "in common",
        ];
        contains_any(text, MARKERS).then_some(Intent::Comparison)
    }

    fn rule_category(&self, text: &str) -> Option<Intent> {
        const MARKERS: &[&str] = &[
            "what category",
            "which category",
            "what genre",
            "which genre",
            "what family",
            "which family",
            "what group",
            "which group",
            "what kind of",
            "which kind of",
            "what type of",
            "which type of",
            "belongs to",
            "belong to",
            "classified as",
        ];
        contains_any(text, MARKERS).then_some(Intent::Category)
    }

    /// "which <noun>" keeps the noun so which_actor and which_planet stay
    /// distinct intents. Grammatical fillers fall through to the generic
    /// which bucket.
    fn rule_which_noun(&self, text: &str) -> Option<Intent> {
        const FILLERS: &[&str] = &["one", "the", "was", "were", "are"];
        let noun = self
            .which_noun
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())?;
        if FILLERS.contains(&noun.as_str()) {
            return None;
        }
        Some(Intent::Which(noun))
    }

    fn rule_known_for(&self, text: &str) -> Option<Intent> {
        self.known_for.is_match(text).then_some(Intent::KnownFor)
    }

    fn rule_creation(&self, text: &str) -> Option<Intent> {
        PROPERTY_VERBS
            .iter()
            .any(|verb| text.contains(verb))
            .then_some(Intent::Creation)
    }

    fn rule_question_word(&self, text: &str) -> Option<Intent> {
        const FALLBACKS: &[(&str, Intent)] = &[
            ("what", Intent::WhatGeneral),
            ("which", Intent::WhichGeneral),
            ("where", Intent::WhereGeneral),
            ("when", Intent::WhenGeneral),
            ("who", Intent::WhoGeneral),
            ("why", Intent::WhyGeneral),
            ("how", Intent::HowGeneral),
        ];
        for (word, intent) in FALLBACKS {
            if has_word(text, word) {
                return Some(intent.clone());
            }
        }
        None
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Trimmed, lowercased answer used for bucketing and answer comparison.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}
