//! crates/quiz_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the external collaborators the
//! scoring core reads from and reports to. These traits form the boundary of
//! the hexagonal architecture; adapters live in the `api` service.

use crate::categories::CategoryTree;
use crate::domain::{AnswerRecord, Badge, BadgeId, Category, CategoryId, CategoryScope, QuizId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Port Payloads
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub user_id: Uuid,
    pub quiz_id: QuizId,
    pub category_id: CategoryId,
    pub user_answer: String,
    /// Whole seconds spent on the question.
    pub time_taken: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub answer: AnswerRecord,
    pub correct_answer: String,
}

impl SubmittedAnswer {
    pub fn points_awarded(&self) -> u32 {
        self.answer.point + self.answer.bonus_point
    }
}

/// Answers recorded since the requested point, plus the server time to use
/// as the next `since`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerBatch {
    pub answers: Vec<AnswerRecord>,
    pub sync_timestamp: DateTime<Utc>,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Grades and persists a submission.
    async fn submit_answer(&self, submission: AnswerSubmission) -> PortResult<SubmittedAnswer>;

    /// Returns the user's answers, only those created after `since` when given.
    async fn get_answers_by_user(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> PortResult<AnswerBatch>;
}

#[async_trait]
pub trait BadgeCatalogService: Send + Sync {
    async fn get_all_badges(&self) -> PortResult<Vec<Badge>>;

    async fn get_owned_badges(&self, user_id: Uuid) -> PortResult<HashSet<BadgeId>>;

    /// Records an award. Awarding an owned badge again is a no-op.
    async fn award_badge(&self, user_id: Uuid, badge_id: BadgeId) -> PortResult<()>;
}

#[async_trait]
pub trait CategoryHierarchyService: Send + Sync {
    async fn get_all_categories(&self) -> PortResult<Vec<Category>>;

    /// The category and everything below it; empty for an unknown id.
    async fn get_descendant_category_ids(&self, category_id: CategoryId) -> PortResult<CategoryScope> {
        let categories = self.get_all_categories().await?;
        Ok(CategoryTree::new(&categories).descendants_of(category_id))
    }
}
