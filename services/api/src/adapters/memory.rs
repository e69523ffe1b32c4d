//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of every core port. It backs local runs
//! without a database and the HTTP integration tests.

use crate::adapters::{check_category, decode_condition, validate_submission};
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::domain::{
    AnswerRecord, Badge, BadgeGrade, BadgeId, Category, Quiz, QuizId,
};
use quiz_core::ports::{
    AnswerBatch, AnswerService, AnswerSubmission, BadgeCatalogService, CategoryHierarchyService,
    PortError, PortResult, SubmittedAnswer,
};
use quiz_core::{grade_answer, AnswerHistory};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

//=========================================================================================
// Seed Data
//=========================================================================================

/// Catalog content loaded into the store at startup.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedData {
    pub categories: Vec<Category>,
    pub quizzes: Vec<Quiz>,
    pub badges: Vec<BadgeSeed>,
}

/// A badge as written in a seed file. The condition stays raw until load.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeSeed {
    pub id: BadgeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub grade: BadgeGrade,
    #[serde(default)]
    pub condition: Option<serde_json::Value>,
}

impl BadgeSeed {
    fn to_domain(self) -> Badge {
        Badge {
            condition: decode_condition(self.id, self.condition),
            id: self.id,
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            grade: self.grade,
        }
    }
}

//=========================================================================================
// The Store
//=========================================================================================

#[derive(Default)]
struct StoreState {
    categories: Vec<Category>,
    quizzes: HashMap<QuizId, Quiz>,
    badges: Vec<Badge>,
    answers: Vec<AnswerRecord>,
    owned: HashMap<Uuid, HashSet<BadgeId>>,
    next_answer_id: i64,
}

pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new(seed: SeedData) -> Self {
        let state = StoreState {
            categories: seed.categories,
            quizzes: seed.quizzes.into_iter().map(|quiz| (quiz.id, quiz)).collect(),
            badges: seed.badges.into_iter().map(BadgeSeed::to_domain).collect(),
            ..StoreState::default()
        };
        info!(
            "In-memory store ready: {} categories, {} quizzes, {} badges",
            state.categories.len(),
            state.quizzes.len(),
            state.badges.len()
        );
        Self {
            state: RwLock::new(state),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ApiError> {
        let seed: SeedData = serde_json::from_str(json)?;
        Ok(Self::new(seed))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ApiError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Adds an already recorded answer, bypassing grading. Used to import
    /// history.
    pub async fn insert_answer(&self, record: AnswerRecord) {
        let mut state = self.state.write().await;
        state.next_answer_id = state.next_answer_id.max(record.id);
        state.answers.push(record);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(SeedData::default())
    }
}

//=========================================================================================
// `AnswerService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnswerService for InMemoryStore {
    async fn submit_answer(&self, submission: AnswerSubmission) -> PortResult<SubmittedAnswer> {
        validate_submission(&submission)?;

        // One write lock covers reading the streak and appending the answer.
        let mut state = self.state.write().await;
        let quiz = state
            .quizzes
            .get(&submission.quiz_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Quiz {} not found", submission.quiz_id)))?;
        check_category(&submission, &quiz)?;

        let history = AnswerHistory::from_records(
            state
                .answers
                .iter()
                .filter(|answer| answer.user_id == submission.user_id)
                .cloned(),
        );
        let prior_streak = history.streak_before(submission.quiz_id);
        let graded = grade_answer(&quiz, &submission.user_answer, submission.time_taken, prior_streak);

        state.next_answer_id += 1;
        let record = AnswerRecord {
            id: state.next_answer_id,
            user_id: submission.user_id,
            quiz_id: submission.quiz_id,
            category_id: quiz.category_id,
            user_answer: submission.user_answer,
            is_correct: graded.is_correct,
            point: graded.base_points,
            bonus_point: graded.bonus_points,
            time_taken: Some(submission.time_taken),
            created_at: Utc::now(),
        };
        state.answers.push(record.clone());

        Ok(SubmittedAnswer {
            answer: record,
            correct_answer: quiz.correct_answer,
        })
    }

    async fn get_answers_by_user(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> PortResult<AnswerBatch> {
        let sync_timestamp = Utc::now();
        let state = self.state.read().await;
        let answers = state
            .answers
            .iter()
            .filter(|answer| answer.user_id == user_id)
            .filter(|answer| since.map_or(true, |since| answer.created_at > since))
            .cloned()
            .collect();
        Ok(AnswerBatch {
            answers,
            sync_timestamp,
        })
    }
}

//=========================================================================================
// `BadgeCatalogService` Trait Implementation
//=========================================================================================

#[async_trait]
impl BadgeCatalogService for InMemoryStore {
    async fn get_all_badges(&self) -> PortResult<Vec<Badge>> {
        Ok(self.state.read().await.badges.clone())
    }

    async fn get_owned_badges(&self, user_id: Uuid) -> PortResult<HashSet<BadgeId>> {
        let state = self.state.read().await;
        Ok(state.owned.get(&user_id).cloned().unwrap_or_default())
    }

    async fn award_badge(&self, user_id: Uuid, badge_id: BadgeId) -> PortResult<()> {
        let mut state = self.state.write().await;
        if !state.badges.iter().any(|badge| badge.id == badge_id) {
            return Err(PortError::NotFound(format!("Badge {} not found", badge_id)));
        }
        if !state.owned.entry(user_id).or_default().insert(badge_id) {
            warn!("User {} already owns badge {}", user_id, badge_id);
        }
        Ok(())
    }
}

//=========================================================================================
// `CategoryHierarchyService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CategoryHierarchyService for InMemoryStore {
    async fn get_all_categories(&self) -> PortResult<Vec<Category>> {
        Ok(self.state.read().await.categories.clone())
    }
}
