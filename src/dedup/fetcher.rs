//! Paged corpus fetch. The whole question bank is pulled through the store
//! page by page with a pause between pages, so a large scan does not
//! monopolize the shared database.

use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::Result;
use super::models::Question;
use super::store::QuestionStore;

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Rows requested per page query.
    pub page_size: u64,
    /// Pause between consecutive page queries.
    pub page_delay: Duration,
    /// Optional cap on total rows fetched, for trial runs on a slice of
    /// the corpus.
    pub max_records: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            page_delay: Duration::from_millis(100),
            max_records: None,
        }
    }
}

/// Result of a full corpus fetch. `failed_pages` holds the offsets of
/// pages that errored and were skipped.
#[derive(Debug)]
pub struct FetchOutcome {
    pub questions: Vec<Question>,
    pub total_count: u64,
    pub failed_pages: Vec<u64>,
}

impl FetchOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failed_pages.is_empty()
    }
}

pub struct PagedFetcher<'a> {
    store: &'a dyn QuestionStore,
    config: FetchConfig,
}

impl<'a> PagedFetcher<'a> {
    pub fn new(store: &'a dyn QuestionStore, config: FetchConfig) -> Self {
        Self { store, config }
    }

    /// Fetch the corpus in stable order. A failed count is fatal because
    /// nothing downstream can be sized without it; a failed page is logged
    /// and skipped so the run continues on partial data.
    pub async fn fetch_all(&self) -> Result<FetchOutcome> {
        let total_count = self.store.count_questions().await?;
        let target = match self.config.max_records {
            Some(cap) => total_count.min(cap),
            None => total_count,
        };

        let page_size = self.config.page_size.max(1);
        let pages = (target + page_size - 1) / page_size;
        info!(total_count, target, pages, "Fetching question corpus");

        let mut questions = Vec::with_capacity(target as usize);
        let mut failed_pages = Vec::new();

        for page in 0..pages {
            let offset = page * page_size;
            let limit = page_size.min(target - offset);

            match self.store.fetch_page(offset, limit).await {
                Ok(batch) => {
                    debug!(offset, fetched = batch.len(), "Fetched page");
                    questions.extend(batch);
                }
                Err(e) => {
                    warn!(offset, error = %e, "Page fetch failed, skipping");
                    failed_pages.push(offset);
                }
            }

            if page + 1 < pages {
                tokio::time::sleep(self.config.page_delay).await;
            }
        }

        if failed_pages.is_empty() {
            info!(fetched = questions.len(), "Corpus fetch complete");
        } else {
            warn!(
                fetched = questions.len(),
                total_count,
                failed = failed_pages.len(),
                "Corpus fetched with gaps, results may under-report duplicates"
            );
        }

        Ok(FetchOutcome {
            questions,
            total_count,
            failed_pages,
        })
    }
}
