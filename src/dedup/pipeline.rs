//! One-shot detection run: fetch the corpus, extract features, group, and
//! assemble the report. Shared by the scan and clean commands.

use tracing::info;

use super::error::Result;
use super::features::FeatureExtractor;
use super::fetcher::{FetchConfig, PagedFetcher};
use super::grouping::{GroupingConfig, GroupingEngine};
use super::models::QuestionFeatures;
use super::report::DetectionReport;
use super::store::QuestionStore;

pub async fn run_detection(
    store: &dyn QuestionStore,
    fetch_config: FetchConfig,
    grouping_config: GroupingConfig,
) -> Result<DetectionReport> {
    let fetcher = PagedFetcher::new(store, fetch_config);
    let outcome = fetcher.fetch_all().await?;

    let extractor = FeatureExtractor::new();
    let features: Vec<QuestionFeatures> = outcome
        .questions
        .iter()
        .map(|question| extractor.extract(question))
        .collect();

    let engine = GroupingEngine::new(grouping_config);
    let groups = engine.group(&outcome.questions, &features);

    info!(
        scanned = outcome.questions.len(),
        groups = groups.len(),
        "Detection run complete"
    );
    Ok(DetectionReport::build(&outcome, &features, groups))
}
