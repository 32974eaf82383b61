//! Duplicate resolution: policy selection, optional per-group review, a
//! final confirmation, then batched deletion. Every path that mutates the
//! store runs behind an explicit operator decision.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::error::Result;
use super::models::DuplicateGroup;
use super::report::format_group;
use super::store::QuestionStore;

/// How removal candidates are chosen once groups are on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Queue every removal candidate in every group.
    RemoveAll,
    /// Queue only groups whose members share the exact same answer.
    RemoveSafeSubset,
    /// Ask about each group in turn.
    ReviewPerGroup,
    Cancel,
}

impl ResolutionPolicy {
    /// Parse the operator's menu choice. Anything unrecognized cancels.
    pub fn from_menu_input(input: &str) -> Self {
        match input.trim() {
            "1" => ResolutionPolicy::RemoveAll,
            "2" => ResolutionPolicy::RemoveSafeSubset,
            "3" => ResolutionPolicy::ReviewPerGroup,
            _ => ResolutionPolicy::Cancel,
        }
    }
}

/// Per-group answer during interactive review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Yes,
    No,
    /// Accept this group and every remaining one without further prompts.
    All,
    Skip,
}

impl ReviewDecision {
    /// Unrecognized input declines the group rather than deleting anything.
    pub fn from_input(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "yes" | "y" => ReviewDecision::Yes,
            "all" => ReviewDecision::All,
            "skip" => ReviewDecision::Skip,
            _ => ReviewDecision::No,
        }
    }
}

fn is_affirmative(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "yes" | "y")
}

/// One line of operator input per question. Kept as a trait so review
/// flows can be scripted in tests.
#[async_trait]
pub trait OperatorPrompt: Send {
    async fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// Line-based prompt over the process stdin.
pub struct StdinPrompt {
    reader: BufReader<Stdin>,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
        }
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OperatorPrompt for StdinPrompt {
    async fn ask(&mut self, prompt: &str) -> Result<String> {
        use std::io::Write as _;

        print!("{prompt} ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 {
            // Closed stdin reads as an empty answer, which every parser
            // treats as the safe choice.
            return Ok(String::new());
        }
        Ok(line.trim().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct DeletionConfig {
    /// Ids per DELETE statement.
    pub batch_size: usize,
    /// Pause between consecutive batches.
    pub batch_delay: Duration,
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_delay: Duration::from_millis(500),
        }
    }
}

/// What a resolution run did, for logging and for the exit summary.
#[derive(Debug, Default)]
pub struct ResolutionReport {
    pub groups_considered: usize,
    pub groups_queued: usize,
    pub unsafe_groups_skipped: usize,
    pub queued: usize,
    pub removed: u64,
    pub failed_batches: usize,
    pub dry_run: bool,
    pub cancelled: bool,
}

pub struct ResolutionDriver<'a> {
    store: &'a dyn QuestionStore,
    prompt: &'a mut dyn OperatorPrompt,
    config: DeletionConfig,
    dry_run: bool,
    assume_yes: bool,
}

impl<'a> ResolutionDriver<'a> {
    pub fn new(
        store: &'a dyn QuestionStore,
        prompt: &'a mut dyn OperatorPrompt,
        config: DeletionConfig,
    ) -> Self {
        Self {
            store,
            prompt,
            config,
            dry_run: false,
            assume_yes: false,
        }
    }

    /// Walk the full flow without issuing any deletes.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Skip the final confirmation prompt. Policy selection and review
    /// still happen.
    pub fn assume_yes(mut self, enabled: bool) -> Self {
        self.assume_yes = enabled;
        self
    }

    /// Resolve the given groups. When `policy` is `None` the operator is
    /// asked to choose one. Cancellation at any prompt is a normal outcome,
    /// not an error.
    pub async fn resolve(
        &mut self,
        groups: &[DuplicateGroup],
        policy: Option<ResolutionPolicy>,
    ) -> Result<ResolutionReport> {
        let mut report = ResolutionReport {
            groups_considered: groups.len(),
            dry_run: self.dry_run,
            ..Default::default()
        };

        if groups.is_empty() {
            println!("No duplicate groups to resolve.");
            return Ok(report);
        }

        let policy = match policy {
            Some(policy) => policy,
            None => self.prompt_for_policy(groups).await?,
        };

        let queue: Vec<Uuid> = match policy {
            ResolutionPolicy::Cancel => {
                report.cancelled = true;
                info!("Resolution cancelled at policy selection");
                println!("Cancelled; nothing was deleted.");
                return Ok(report);
            }
            ResolutionPolicy::RemoveAll => self.queue_all(groups, &mut report),
            ResolutionPolicy::RemoveSafeSubset => self.queue_safe_subset(groups, &mut report),
            ResolutionPolicy::ReviewPerGroup => self.review_groups(groups, &mut report).await?,
        };

        report.queued = queue.len();
        if queue.is_empty() {
            println!("Nothing queued for removal.");
            return Ok(report);
        }

        if self.dry_run {
            info!(queued = report.queued, "Dry run, skipping deletion");
            println!(
                "Dry run: {} question(s) across {} group(s) would be removed.",
                report.queued, report.groups_queued
            );
            return Ok(report);
        }

        if !self.assume_yes {
            let answer = self
                .prompt
                .ask(&format!(
                    "Delete {} question(s)? This cannot be undone. (yes/no)",
                    queue.len()
                ))
                .await?;
            if !is_affirmative(&answer) {
                report.cancelled = true;
                info!("Resolution cancelled at final confirmation");
                println!("Cancelled; nothing was deleted.");
                return Ok(report);
            }
        }

        self.delete_queue(&queue, &mut report).await;
        println!(
            "Removed {} of {} queued question(s).",
            report.removed, report.queued
        );
        Ok(report)
    }

    async fn prompt_for_policy(&mut self, groups: &[DuplicateGroup]) -> Result<ResolutionPolicy> {
        let candidates: usize = groups.iter().map(|g| g.removal_candidates().len()).sum();
        println!(
            "\n{} duplicate group(s) with {} removal candidate(s).",
            groups.len(),
            candidates
        );
        println!("  1) Remove all duplicates, keeping one canonical question per group");
        println!("  2) Remove only groups whose members share the exact same answer");
        println!("  3) Review each group interactively");
        println!("  4) Cancel");

        let input = self.prompt.ask("Choose an option (1-4):").await?;
        Ok(ResolutionPolicy::from_menu_input(&input))
    }

    fn queue_all(&self, groups: &[DuplicateGroup], report: &mut ResolutionReport) -> Vec<Uuid> {
        let mut queue = Vec::new();
        for group in groups {
            queue.extend(group.removal_ids());
            report.groups_queued += 1;
        }
        queue
    }

    fn queue_safe_subset(
        &self,
        groups: &[DuplicateGroup],
        report: &mut ResolutionReport,
    ) -> Vec<Uuid> {
        let mut queue = Vec::new();
        for group in groups {
            if group.has_uniform_answer() {
                queue.extend(group.removal_ids());
                report.groups_queued += 1;
            } else {
                report.unsafe_groups_skipped += 1;
                debug!(
                    members = group.members.len(),
                    "Skipped group with mixed answers"
                );
            }
        }
        if report.unsafe_groups_skipped > 0 {
            println!(
                "Skipped {} group(s) with mixed answers.",
                report.unsafe_groups_skipped
            );
        }
        queue
    }

    async fn review_groups(
        &mut self,
        groups: &[DuplicateGroup],
        report: &mut ResolutionReport,
    ) -> Result<Vec<Uuid>> {
        let mut queue = Vec::new();
        let mut take_remaining = false;

        for (index, group) in groups.iter().enumerate() {
            if take_remaining {
                queue.extend(group.removal_ids());
                report.groups_queued += 1;
                continue;
            }

            println!("\n{}", format_group(index, group));
            let input = self
                .prompt
                .ask("Remove the duplicates in this group? (yes/no/all/skip)")
                .await?;
            match ReviewDecision::from_input(&input) {
                ReviewDecision::Yes => {
                    queue.extend(group.removal_ids());
                    report.groups_queued += 1;
                }
                ReviewDecision::All => {
                    take_remaining = true;
                    queue.extend(group.removal_ids());
                    report.groups_queued += 1;
                }
                ReviewDecision::No | ReviewDecision::Skip => {}
            }
        }

        Ok(queue)
    }

    async fn delete_queue(&mut self, queue: &[Uuid], report: &mut ResolutionReport) {
        let batch_size = self.config.batch_size.max(1);
        let batch_count = (queue.len() + batch_size - 1) / batch_size;

        for (index, batch) in queue.chunks(batch_size).enumerate() {
            match self.store.delete_batch(batch).await {
                Ok(removed) => {
                    report.removed += removed;
                    debug!(batch = index + 1, of = batch_count, removed, "Deleted batch");
                }
                Err(e) => {
                    report.failed_batches += 1;
                    error!(
                        batch = index + 1,
                        of = batch_count,
                        error = %e,
                        "Batch delete failed, continuing with remaining batches"
                    );
                }
            }

            if index + 1 < batch_count {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        info!(
            removed = report.removed,
            queued = queue.len(),
            failed_batches = report.failed_batches,
            "Deletion pass complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_input_parses_known_options() {
        assert_eq!(
            ResolutionPolicy::from_menu_input("1"),
            ResolutionPolicy::RemoveAll
        );
        assert_eq!(
            ResolutionPolicy::from_menu_input(" 2 "),
            ResolutionPolicy::RemoveSafeSubset
        );
        assert_eq!(
            ResolutionPolicy::from_menu_input("3"),
            ResolutionPolicy::ReviewPerGroup
        );
        assert_eq!(
            ResolutionPolicy::from_menu_input("4"),
            ResolutionPolicy::Cancel
        );
    }

    #[test]
    fn test_unrecognized_menu_input_cancels() {
        assert_eq!(
            ResolutionPolicy::from_menu_input("delete everything"),
            ResolutionPolicy::Cancel
        );
        assert_eq!(ResolutionPolicy::from_menu_input(""), ResolutionPolicy::Cancel);
    }

    #[test]
    fn test_review_input_parses_known_answers() {
        assert_eq!(ReviewDecision::from_input("yes"), ReviewDecision::Yes);
        assert_eq!(ReviewDecision::from_input("Y"), ReviewDecision::Yes);
        assert_eq!(ReviewDecision::from_input("no"), ReviewDecision::No);
        assert_eq!(ReviewDecision::from_input("ALL"), ReviewDecision::All);
        assert_eq!(ReviewDecision::from_input("skip"), ReviewDecision::Skip);
    }

    #[test]
    fn test_garbage_review_input_declines_the_group() {
        assert_eq!(ReviewDecision::from_input("sure"), ReviewDecision::No);
        assert_eq!(ReviewDecision::from_input(""), ReviewDecision::No);
    }

    #[test]
    fn test_confirmation_requires_explicit_yes() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative(" Y "));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("yep"));
        assert!(!is_affirmative(""));
    }
}
