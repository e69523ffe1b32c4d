pub mod badges;
pub mod categories;
pub mod domain;
pub mod history;
pub mod ports;
pub mod scoring;
pub mod stats;

pub use badges::{evaluate_newly_eligible, BadgeEvaluator, ConditionError, EligibilityReport, SkippedBadge};
pub use categories::CategoryTree;
pub use domain::{
    AnswerRecord, Badge, BadgeCondition, BadgeGrade, BadgeId, Category, CategoryId, CategoryScope,
    ComparisonOperator, CompositeCondition, ConditionRule, Difficulty, LogicalOperator, MetricType,
    Quiz, QuizId, UserStats,
};
pub use history::AnswerHistory;
pub use ports::{
    AnswerBatch, AnswerService, AnswerSubmission, BadgeCatalogService, CategoryHierarchyService,
    PortError, PortResult, SubmittedAnswer,
};
pub use scoring::{compute_base_points, compute_bonus_points, grade_answer, GradedAnswer};
pub use stats::compute_stats;
