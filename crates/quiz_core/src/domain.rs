//! crates/quiz_core/src/domain.rs
//!
//! Defines the pure, core data structures for the scoring and badge engine.
//! Badge conditions are a typed tree; adapters build them once at load time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub type QuizId = i64;
pub type CategoryId = i64;
pub type BadgeId = i64;

/// A set of category ids that stats are restricted to.
pub type CategoryScope = HashSet<CategoryId>;

//=========================================================================================
// Answers and Stats
//=========================================================================================

/// One user's response to one quiz. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub id: i64,
    pub user_id: Uuid,
    pub quiz_id: QuizId,
    pub category_id: CategoryId,
    pub user_answer: String,
    pub is_correct: bool,
    pub point: u32,
    pub bonus_point: u32,
    pub time_taken: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Rollup computed on demand from a set of answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_solved: u32,
    pub total_correct: u32,
    /// Integer percent, rounded half up.
    pub correct_rate: u32,
    pub consecutive_correct: u32,
}

//=========================================================================================
// Quizzes and Categories
//=========================================================================================

/// Difficulty tier of a quiz. Labels outside `A`..`D` land in `Unrecognized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    A,
    B,
    C,
    D,
    Unrecognized,
}

impl Difficulty {
    pub fn from_label(label: &str) -> Self {
        match label {
            "A" => Self::A,
            "B" => Self::B,
            "C" => Self::C,
            "D" => Self::D,
            _ => Self::Unrecognized,
        }
    }
}

/// The parts of a quiz the grading path needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: QuizId,
    pub category_id: CategoryId,
    pub question: String,
    pub correct_answer: String,
    /// Raw difficulty label as stored in the catalog.
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

//=========================================================================================
// Badges
//=========================================================================================

/// Rarity grade, ordered from most common to rarest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeGrade {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Grandmaster,
}

impl BadgeGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "BRONZE",
            Self::Silver => "SILVER",
            Self::Gold => "GOLD",
            Self::Platinum => "PLATINUM",
            Self::Diamond => "DIAMOND",
            Self::Master => "MASTER",
            Self::Grandmaster => "GRANDMASTER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BRONZE" => Some(Self::Bronze),
            "SILVER" => Some(Self::Silver),
            "GOLD" => Some(Self::Gold),
            "PLATINUM" => Some(Self::Platinum),
            "DIAMOND" => Some(Self::Diamond),
            "MASTER" => Some(Self::Master),
            "GRANDMASTER" => Some(Self::Grandmaster),
            _ => None,
        }
    }
}

/// The user statistic a condition rule is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    ConsecutiveCorrectAnswers,
    TotalQuizzesSolved,
    TotalCorrectAnswers,
    CorrectAnswerRate,
    TotalScoreEarned,
    AccountAgeDays,
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComparisonOperator {
    Gte,
    Lte,
    Eq,
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
    #[serde(other)]
    Unrecognized,
}

/// A leaf predicate: `metric(scope) <operator> value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRule {
    #[serde(rename = "type")]
    pub metric: MetricType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub operator: ComparisonOperator,
    pub value: i64,
}

/// One level of AND / OR over leaf rules. Composites do not nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeCondition {
    pub logical_operator: LogicalOperator,
    pub conditions: Vec<ConditionRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BadgeCondition {
    Composite(CompositeCondition),
    Rule(ConditionRule),
}

/// A catalog entry. Read-only to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub grade: BadgeGrade,
    /// `None` when the stored condition was absent or could not be parsed.
    pub condition: Option<BadgeCondition>,
}
