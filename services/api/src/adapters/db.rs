//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the answer, badge catalog and category ports from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use crate::adapters::{check_category, decode_condition, validate_submission};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::domain::{AnswerRecord, Badge, BadgeGrade, BadgeId, Category, Quiz};
use quiz_core::ports::{
    AnswerBatch, AnswerService, AnswerSubmission, BadgeCatalogService, CategoryHierarchyService,
    PortError, PortResult, SubmittedAnswer,
};
use quiz_core::{grade_answer, AnswerHistory};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the core ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Narrows a count to the INTEGER columns of the `answers` table.
fn to_integer_column(value: u32, column: &str) -> PortResult<i32> {
    i32::try_from(value)
        .map_err(|_| PortError::InvalidInput(format!("{} {} is out of range", column, value)))
}

/// Takes the per-user submission lock for the rest of the transaction.
/// Submissions hold it exclusively; sync reads share it.
async fn lock_user(tx: &mut Transaction<'_, Postgres>, user_id: Uuid, shared: bool) -> PortResult<()> {
    let sql = if shared {
        "SELECT pg_advisory_xact_lock_shared(hashtext($1::text))"
    } else {
        "SELECT pg_advisory_xact_lock(hashtext($1::text))"
    };
    sqlx::query(sql)
        .bind(user_id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(unexpected)?;
    Ok(())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct AnswerRow {
    id: i64,
    user_id: Uuid,
    quiz_id: i64,
    category_id: i64,
    user_answer: String,
    is_correct: bool,
    point: i32,
    bonus_point: i32,
    time_taken: Option<i32>,
    created_at: DateTime<Utc>,
}
impl AnswerRow {
    fn to_domain(self) -> AnswerRecord {
        AnswerRecord {
            id: self.id,
            user_id: self.user_id,
            quiz_id: self.quiz_id,
            category_id: self.category_id,
            user_answer: self.user_answer,
            is_correct: self.is_correct,
            point: u32::try_from(self.point).unwrap_or(0),
            bonus_point: u32::try_from(self.bonus_point).unwrap_or(0),
            time_taken: self.time_taken.and_then(|t| u32::try_from(t).ok()),
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct QuizRow {
    id: i64,
    category_id: i64,
    question: String,
    correct: String,
    difficulty: String,
}
impl QuizRow {
    fn to_domain(self) -> Quiz {
        Quiz {
            id: self.id,
            category_id: self.category_id,
            question: self.question,
            correct_answer: self.correct,
            difficulty: self.difficulty,
        }
    }
}

#[derive(FromRow)]
struct BadgeRow {
    id: i64,
    name: String,
    description: String,
    image_url: String,
    grade: String,
    condition: Option<serde_json::Value>,
}
impl BadgeRow {
    /// Rows with an unknown grade cannot be represented and are dropped.
    fn to_domain(self) -> Option<Badge> {
        let Some(grade) = BadgeGrade::from_str(&self.grade) else {
            warn!("Badge {} has unknown grade '{}'; ignoring it", self.id, self.grade);
            return None;
        };
        Some(Badge {
            condition: decode_condition(self.id, self.condition),
            id: self.id,
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            grade,
        })
    }
}

#[derive(FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    parent_id: Option<i64>,
}
impl CategoryRow {
    fn to_domain(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
            parent_id: self.parent_id,
        }
    }
}

const ANSWER_COLUMNS: &str = "id, user_id, quiz_id, category_id, user_answer, is_correct, point, bonus_point, time_taken, created_at";

async fn answers_for_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> PortResult<Vec<AnswerRecord>> {
    let rows = sqlx::query_as::<_, AnswerRow>(&format!(
        "SELECT {} FROM answers WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
        ANSWER_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(unexpected)?;
    Ok(rows.into_iter().map(AnswerRow::to_domain).collect())
}

//=========================================================================================
// `AnswerService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnswerService for DbAdapter {
    async fn submit_answer(&self, submission: AnswerSubmission) -> PortResult<SubmittedAnswer> {
        validate_submission(&submission)?;
        let time_taken = to_integer_column(submission.time_taken, "timeTaken")?;

        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // Serialize submissions per user so the streak read stays current.
        lock_user(&mut tx, submission.user_id, false).await?;

        let quiz = sqlx::query_as::<_, QuizRow>(
            "SELECT id, category_id, question, correct, difficulty FROM quizzes WHERE id = $1",
        )
        .bind(submission.quiz_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?
        .map(QuizRow::to_domain)
        .ok_or_else(|| PortError::NotFound(format!("Quiz {} not found", submission.quiz_id)))?;
        check_category(&submission, &quiz)?;

        let history = AnswerHistory::from_records(answers_for_user(&mut tx, submission.user_id).await?);
        let prior_streak = history.streak_before(submission.quiz_id);
        let graded = grade_answer(&quiz, &submission.user_answer, submission.time_taken, prior_streak);

        // `clock_timestamp()` is read after the lock, so the row is stamped
        // later than any sync cursor handed out before it became visible.
        let row = sqlx::query_as::<_, AnswerRow>(&format!(
            "INSERT INTO answers (user_id, quiz_id, category_id, user_answer, is_correct, point, bonus_point, time_taken, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, clock_timestamp()) RETURNING {}",
            ANSWER_COLUMNS
        ))
        .bind(submission.user_id)
        .bind(submission.quiz_id)
        .bind(quiz.category_id)
        .bind(&submission.user_answer)
        .bind(graded.is_correct)
        .bind(to_integer_column(graded.base_points, "point")?)
        .bind(to_integer_column(graded.bonus_points, "bonusPoint")?)
        .bind(time_taken)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;

        Ok(SubmittedAnswer {
            answer: row.to_domain(),
            correct_answer: quiz.correct_answer,
        })
    }

    async fn get_answers_by_user(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> PortResult<AnswerBatch> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // Waits out in-flight submissions. Every committed row is then older
        // than the cursor and every later row is newer.
        lock_user(&mut tx, user_id, true).await?;
        let sync_timestamp: DateTime<Utc> = sqlx::query_scalar("SELECT clock_timestamp()")
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?;

        let rows = sqlx::query_as::<_, AnswerRow>(&format!(
            "SELECT {} FROM answers WHERE user_id = $1 AND ($2::timestamptz IS NULL OR created_at > $2) \
             ORDER BY created_at ASC, id ASC",
            ANSWER_COLUMNS
        ))
        .bind(user_id)
        .bind(since)
        .fetch_all(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;

        Ok(AnswerBatch {
            answers: rows.into_iter().map(AnswerRow::to_domain).collect(),
            sync_timestamp,
        })
    }
}

//=========================================================================================
// `BadgeCatalogService` Trait Implementation
//=========================================================================================

#[async_trait]
impl BadgeCatalogService for DbAdapter {
    async fn get_all_badges(&self) -> PortResult<Vec<Badge>> {
        let rows = sqlx::query_as::<_, BadgeRow>(
            "SELECT id, name, description, image_url, grade, condition FROM badges ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(rows.into_iter().filter_map(BadgeRow::to_domain).collect())
    }

    async fn get_owned_badges(&self, user_id: Uuid) -> PortResult<HashSet<BadgeId>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT badge_id FROM user_badges WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(ids.into_iter().collect())
    }

    async fn award_badge(&self, user_id: Uuid, badge_id: BadgeId) -> PortResult<()> {
        let result = sqlx::query(
            "INSERT INTO user_badges (user_id, badge_id) VALUES ($1, $2) ON CONFLICT (user_id, badge_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(badge_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_foreign_key_violation()) {
                PortError::NotFound(format!("Badge {} not found", badge_id))
            } else {
                unexpected(e)
            }
        })?;

        if result.rows_affected() == 0 {
            warn!("User {} already owns badge {}", user_id, badge_id);
        }
        Ok(())
    }
}

//=========================================================================================
// `CategoryHierarchyService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CategoryHierarchyService for DbAdapter {
    async fn get_all_categories(&self) -> PortResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, parent_id FROM categories ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(rows.into_iter().map(CategoryRow::to_domain).collect())
    }
}
