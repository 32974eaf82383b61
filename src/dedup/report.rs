//! Scan reporting. A `DetectionReport` is the read-only product of a run:
//! printable for operators, exportable as JSON for downstream tooling.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use super::error::Result;
use super::fetcher::FetchOutcome;
use super::models::{DuplicateGroup, GroupKind, QuestionFeatures};

#[derive(Debug, Serialize)]
pub struct DetectionReport {
    pub generated_at: DateTime<Utc>,
    /// Rows actually fetched and scanned.
    pub scanned: usize,
    /// Rows the store reported in total.
    pub store_count: u64,
    /// Offsets of pages that failed during the fetch.
    pub failed_pages: Vec<u64>,
    /// Intent label to question count over the scanned corpus.
    pub intent_counts: BTreeMap<String, usize>,
    pub groups: Vec<DuplicateGroup>,
}

impl DetectionReport {
    pub fn build(
        outcome: &FetchOutcome,
        features: &[QuestionFeatures],
        groups: Vec<DuplicateGroup>,
    ) -> Self {
        let mut intent_counts: BTreeMap<String, usize> = BTreeMap::new();
        for feature in features {
            *intent_counts.entry(feature.intent.label()).or_insert(0) += 1;
        }

        Self {
            generated_at: Utc::now(),
            scanned: outcome.questions.len(),
            store_count: outcome.total_count,
            failed_pages: outcome.failed_pages.clone(),
            intent_counts,
            groups,
        }
    }

    /// Non-canonical members across all groups.
    pub fn removal_candidates(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.removal_candidates().len())
            .sum()
    }

    /// Groups whose members do not all share the same raw answer.
    pub fn mixed_answer_groups(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| !g.has_uniform_answer())
            .count()
    }

    /// Operator-facing summary printed after a scan.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "Scanned {} of {} questions\n",
            self.scanned, self.store_count
        ));
        if !self.failed_pages.is_empty() {
            out.push_str(&format!(
                "Warning: {} page(s) failed to fetch; duplicates may be under-reported\n",
                self.failed_pages.len()
            ));
        }

        if self.groups.is_empty() {
            out.push_str("No duplicate groups found.\n");
            return out;
        }

        out.push_str(&format!(
            "Found {} duplicate group(s): {} removal candidate(s), {} group(s) with mixed answers\n\n",
            self.groups.len(),
            self.removal_candidates(),
            self.mixed_answer_groups()
        ));

        for (index, group) in self.groups.iter().enumerate() {
            out.push_str(&format_group(index, group));
            out.push('\n');
        }

        let mut intents: Vec<(&String, &usize)> = self.intent_counts.iter().collect();
        intents.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        if !intents.is_empty() {
            out.push_str("Most common question intents:\n");
            for (label, count) in intents.iter().take(8) {
                out.push_str(&format!("  {label}: {count}\n"));
            }
        }

        out
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), groups = self.groups.len(), "Wrote detection report");
        Ok(())
    }
}

/// One group rendered for the console, used by both the scan summary and
/// the interactive review.
pub fn format_group(index: usize, group: &DuplicateGroup) -> String {
    let mut out = String::new();

    let header = match &group.kind {
        GroupKind::Answer(answer) => format!(
            "Group {} [shared answer: \"{}\"] - {} members",
            index + 1,
            answer,
            group.members.len()
        ),
        GroupKind::Text => format!(
            "Group {} [text match] - {} members",
            index + 1,
            group.members.len()
        ),
    };
    out.push_str(&header);
    out.push('\n');

    for (position, member) in group.members.iter().enumerate() {
        let marker = if position == 0 { "keep  " } else { "remove" };
        let id = member.id.to_string();
        out.push_str(&format!(
            "  {} {} ({}, {}) {}\n",
            marker,
            &id[..8],
            member.difficulty,
            member.created_at.format("%Y-%m-%d"),
            member.question_text
        ));
    }

    if !group.has_uniform_answer() {
        out.push_str("  note: answers differ across members\n");
    }

    out
}
