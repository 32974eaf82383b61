//! Question store access. The `questions` table is owned by the content
//! pipeline; everything here is read-only except `delete_batch`.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{DedupError, Result};
use super::models::Question;

/// Storage contract used by the fetcher and the resolution driver. Kept as
/// a trait so runs can be driven against an in-memory store in tests.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Total number of rows in the question bank.
    async fn count_questions(&self) -> Result<u64>;

    /// One page of questions in stable `created_at, id` order.
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<Question>>;

    /// Delete the given ids. Returns the number of rows actually removed.
    async fn delete_batch(&self, ids: &[Uuid]) -> Result<u64>;
}

/// Create a PostgreSQL connection pool and verify it with a ping.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    info!(
        "Connected to PostgreSQL with {} max connections",
        max_connections
    );
    Ok(pool)
}

pub struct PgQuestionStore {
    pool: PgPool,
}

impl PgQuestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionStore for PgQuestionStore {
    async fn count_questions(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DedupError::CountQuery {
                message: e.to_string(),
            })?;
        Ok(count as u64)
    }

    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, question_text, answer_choices, correct_answer, topic,
                   subtopic, tags, difficulty, language, created_at
            FROM questions
            ORDER BY created_at ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        debug!(offset, limit, fetched = questions.len(), "Fetched question page");
        Ok(questions)
    }

    async fn delete_batch(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM questions WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        debug!(
            requested = ids.len(),
            deleted = result.rows_affected(),
            "Deleted question batch"
        );
        Ok(result.rows_affected())
    }
}
