pub mod error;
pub mod features;
pub mod fetcher;
pub mod grouping;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod resolution;
pub mod selector;
pub mod similarity;
pub mod store;
pub mod vocabulary;

pub use error::{DedupError, Result};
pub use features::FeatureExtractor;
pub use fetcher::{FetchConfig, FetchOutcome, PagedFetcher};
pub use grouping::{GroupingConfig, GroupingEngine};
pub use models::{
    Difficulty, DuplicateGroup, Fingerprint, GroupKind, Intent, Question, QuestionFeatures,
};
pub use pipeline::run_detection;
pub use report::DetectionReport;
pub use resolution::{
    DeletionConfig, OperatorPrompt, ResolutionDriver, ResolutionPolicy, ResolutionReport,
    ReviewDecision, StdinPrompt,
};
pub use store::{create_pool, PgQuestionStore, QuestionStore};
