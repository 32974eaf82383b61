pub mod config;
pub mod dedup;

pub use config::{create_sample_env_file, Config};

// Re-export core dedup types for convenience
pub use dedup::{
    error::DedupError,
    models::{Difficulty, DuplicateGroup, GroupKind, Intent, Question, QuestionFeatures},
    store::{create_pool, PgQuestionStore, QuestionStore},
};

// Re-export the detection pipeline
pub use dedup::{
    fetcher::{FetchConfig, FetchOutcome, PagedFetcher},
    grouping::{GroupingConfig, GroupingEngine},
    pipeline::run_detection,
    report::DetectionReport,
};

// Re-export resolution types
pub use dedup::resolution::{
    DeletionConfig, OperatorPrompt, ResolutionDriver, ResolutionPolicy, ResolutionReport,
    ReviewDecision, StdinPrompt,
};
