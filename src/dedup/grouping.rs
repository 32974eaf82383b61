//! Two-pass duplicate grouping. The answer-anchored pass buckets records by
//! normalized answer and compares within buckets; the text-anchored pass
//! sweeps whatever is left for near-identical texts. Every record lands in
//! at most one group.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{DuplicateGroup, GroupKind, Question, QuestionFeatures};
use super::selector::order_by_keep_preference;
use super::similarity::{asking_different_properties, fingerprint_similarity, string_similarity};
use super::vocabulary::LOW_INFORMATION_ANSWERS;

#[derive(Debug, Clone)]
pub struct GroupingConfig {
    /// Text similarity a candidate must exceed in the answer-anchored pass.
    pub answer_pass_text_threshold: f64,
    /// Fingerprint similarity floor for the answer-anchored pass.
    pub answer_pass_fingerprint_threshold: f64,
    /// Text similarity a candidate must exceed in the text-anchored pass.
    pub text_pass_text_threshold: f64,
    /// Answer similarity a candidate must exceed in the text-anchored pass.
    pub text_pass_answer_threshold: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            answer_pass_text_threshold: 0.65,
            answer_pass_fingerprint_threshold: 0.5,
            text_pass_text_threshold: 0.8,
            text_pass_answer_threshold: 0.7,
        }
    }
}

pub struct GroupingEngine {
    config: GroupingConfig,
}

impl GroupingEngine {
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    /// Run both passes over the corpus. `features` must be index-aligned
    /// with `questions`.
    pub fn group(
        &self,
        questions: &[Question],
        features: &[QuestionFeatures],
    ) -> Vec<DuplicateGroup> {
        debug_assert_eq!(questions.len(), features.len());

        let mut processed: HashSet<Uuid> = HashSet::new();
        let mut groups: Vec<DuplicateGroup> = Vec::new();

        self.answer_anchored_pass(questions, features, &mut processed, &mut groups);
        self.text_anchored_pass(questions, features, &mut processed, &mut groups);

        let candidates: usize = groups
            .iter()
            .map(|g| g.removal_candidates().len())
            .sum();
        info!(
            questions = questions.len(),
            groups = groups.len(),
            candidates,
            "Grouping complete"
        );
        groups
    }

    fn answer_anchored_pass(
        &self,
        questions: &[Question],
        features: &[QuestionFeatures],
        processed: &mut HashSet<Uuid>,
        groups: &mut Vec<DuplicateGroup>,
    ) {
        // Bucket indexes by normalized answer; iteration follows first
        // appearance so output order is stable.
        let mut bucket_order: Vec<&str> = Vec::new();
        let mut buckets: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, feature) in features.iter().enumerate() {
            let answer = feature.normalized_answer.as_str();
            if answer.is_empty() || LOW_INFORMATION_ANSWERS.contains(&answer) {
                continue;
            }
            let bucket = buckets.entry(answer).or_default();
            if bucket.is_empty() {
                bucket_order.push(answer);
            }
            bucket.push(index);
        }

        for answer in bucket_order {
            let bucket = &buckets[answer];
            if bucket.len() < 2 {
                continue;
            }

            for (position, &anchor) in bucket.iter().enumerate() {
                if processed.contains(&questions[anchor].id) {
                    continue;
                }

                let mut member_indexes = vec![anchor];
                for &candidate in &bucket[position + 1..] {
                    if processed.contains(&questions[candidate].id) {
                        continue;
                    }
                    if self.answer_pass_match(
                        (&questions[anchor], &features[anchor]),
                        (&questions[candidate], &features[candidate]),
                    ) {
                        processed.insert(questions[candidate].id);
                        member_indexes.push(candidate);
                    }
                }

                // Anchors only get marked when a group forms, so a record
                // that matched nothing here is still free for the text pass.
                if member_indexes.len() > 1 {
                    processed.insert(questions[anchor].id);
                    groups.push(build_group(
                        GroupKind::Answer(answer.to_string()),
                        &member_indexes,
                        questions,
                    ));
                }
            }
        }
    }

    fn answer_pass_match(
        &self,
        (anchor, anchor_features): (&Question, &QuestionFeatures),
        (candidate, candidate_features): (&Question, &QuestionFeatures),
    ) -> bool {
        if anchor_features.intent != candidate_features.intent
            && asking_different_properties(
                &anchor_features.fingerprint,
                &candidate_features.fingerprint,
            )
        {
            return false;
        }

        let text = string_similarity(&anchor.question_text, &candidate.question_text);
        if text <= self.config.answer_pass_text_threshold {
            return false;
        }

        // The floor is inclusive: a neutral 0.5 from fingerprint-free
        // questions meets it, scores below it reject the candidate.
        fingerprint_similarity(&anchor_features.fingerprint, &candidate_features.fingerprint)
            >= self.config.answer_pass_fingerprint_threshold
    }

    fn text_anchored_pass(
        &self,
        questions: &[Question],
        features: &[QuestionFeatures],
        processed: &mut HashSet<Uuid>,
        groups: &mut Vec<DuplicateGroup>,
    ) {
        for anchor in 0..questions.len() {
            if processed.contains(&questions[anchor].id) {
                continue;
            }

            let mut member_indexes = vec![anchor];
            for candidate in anchor + 1..questions.len() {
                if processed.contains(&questions[candidate].id) {
                    continue;
                }

                let text = string_similarity(
                    &questions[anchor].question_text,
                    &questions[candidate].question_text,
                );
                if text <= self.config.text_pass_text_threshold {
                    continue;
                }

                let answer = string_similarity(
                    &features[anchor].normalized_answer,
                    &features[candidate].normalized_answer,
                );
                if answer <= self.config.text_pass_answer_threshold {
                    continue;
                }

                processed.insert(questions[candidate].id);
                member_indexes.push(candidate);
            }

            if member_indexes.len() > 1 {
                processed.insert(questions[anchor].id);
                groups.push(build_group(GroupKind::Text, &member_indexes, questions));
            }
        }
    }
}

impl Default for GroupingEngine {
    fn default() -> Self {
        Self::new(GroupingConfig::default())
    }
}

fn build_group(
    kind: GroupKind,
    member_indexes: &[usize],
    questions: &[Question],
) -> DuplicateGroup {
    let members = order_by_keep_preference(
        member_indexes
            .iter()
            .map(|&index| questions[index].clone())
            .collect(),
    );
    debug!(
        kind = kind.label(),
        members = members.len(),
        "Formed duplicate group"
    );
    DuplicateGroup { kind, members }
}
