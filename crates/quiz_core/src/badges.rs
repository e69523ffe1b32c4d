//! crates/quiz_core/src/badges.rs
//!
//! Badge eligibility evaluation. Decides which unowned catalog badges a user
//! now qualifies for. Nothing is awarded here; the caller issues awards.

use crate::categories::CategoryTree;
use crate::domain::{
    Badge, BadgeCondition, BadgeId, CategoryId, CategoryScope, ComparisonOperator, ConditionRule,
    LogicalOperator, MetricType, UserStats,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

//=========================================================================================
// Diagnostics
//=========================================================================================

/// Why a badge's condition could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    #[error("badge has no usable condition")]
    Missing,
    #[error("unrecognized metric type")]
    UnrecognizedMetric,
    #[error("unrecognized comparison operator")]
    UnrecognizedComparison,
    #[error("unrecognized logical operator")]
    UnrecognizedLogical,
    #[error("composite condition has no rules")]
    EmptyComposite,
}

/// A badge left out of evaluation because its condition is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBadge {
    pub badge_id: BadgeId,
    pub error: ConditionError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilityReport {
    /// Newly eligible badges, in catalog order.
    pub eligible: Vec<Badge>,
    pub skipped: Vec<SkippedBadge>,
}

//=========================================================================================
// Evaluator
//=========================================================================================

/// Evaluates catalog conditions against category-scoped stats.
///
/// Without a hierarchy a rule's category scope is just that category; with
/// one it is the category plus all of its descendants.
#[derive(Debug, Clone, Default)]
pub struct BadgeEvaluator {
    hierarchy: Option<CategoryTree>,
}

impl BadgeEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hierarchy(hierarchy: CategoryTree) -> Self {
        Self {
            hierarchy: Some(hierarchy),
        }
    }

    /// Evaluates every unowned badge and reports both the eligible ones and
    /// the ones skipped for malformed conditions.
    ///
    /// `stats_provider` is called at most once per distinct scope.
    pub fn evaluate<F>(
        &self,
        catalog: &[Badge],
        owned: &HashSet<BadgeId>,
        mut stats_provider: F,
    ) -> EligibilityReport
    where
        F: FnMut(Option<&CategoryScope>) -> UserStats,
    {
        let mut report = EligibilityReport::default();
        let mut stats_by_category: HashMap<Option<CategoryId>, UserStats> = HashMap::new();

        for badge in catalog.iter().filter(|badge| !owned.contains(&badge.id)) {
            let (logical_operator, rules) = match validate(badge.condition.as_ref()) {
                Ok(parts) => parts,
                Err(error) => {
                    warn!(
                        "Skipping badge {} ({}): {}. Condition was: {:?}",
                        badge.id, badge.name, error, badge.condition
                    );
                    report.skipped.push(SkippedBadge {
                        badge_id: badge.id,
                        error,
                    });
                    continue;
                }
            };

            let mut check = |rule: &ConditionRule| {
                let stats = *stats_by_category
                    .entry(rule.category_id)
                    .or_insert_with(|| {
                        let scope = self.scope_for(rule.category_id);
                        stats_provider(scope.as_ref())
                    });
                rule_holds(rule, &stats)
            };

            let satisfied = match logical_operator {
                LogicalOperator::Or => rules.iter().any(&mut check),
                _ => rules.iter().all(&mut check),
            };

            if satisfied {
                debug!("Badge {} ({}) is newly eligible", badge.id, badge.name);
                report.eligible.push(badge.clone());
            }
        }

        report
    }

    /// Returns only the newly eligible badges; skipped ones are logged.
    pub fn evaluate_newly_eligible<F>(
        &self,
        catalog: &[Badge],
        owned: &HashSet<BadgeId>,
        stats_provider: F,
    ) -> Vec<Badge>
    where
        F: FnMut(Option<&CategoryScope>) -> UserStats,
    {
        self.evaluate(catalog, owned, stats_provider).eligible
    }

    fn scope_for(&self, category_id: Option<CategoryId>) -> Option<CategoryScope> {
        let id = category_id?;
        Some(match &self.hierarchy {
            Some(tree) => tree.descendants_of(id),
            None => CategoryScope::from([id]),
        })
    }
}

/// Flat-category evaluation: a rule's scope is exactly its own category.
pub fn evaluate_newly_eligible<F>(
    catalog: &[Badge],
    owned: &HashSet<BadgeId>,
    stats_provider: F,
) -> Vec<Badge>
where
    F: FnMut(Option<&CategoryScope>) -> UserStats,
{
    BadgeEvaluator::new().evaluate_newly_eligible(catalog, owned, stats_provider)
}

/// Checks the whole tree up front so a bad leaf skips the badge no matter
/// how the other leaves would evaluate.
fn validate(
    condition: Option<&BadgeCondition>,
) -> Result<(LogicalOperator, &[ConditionRule]), ConditionError> {
    let (logical_operator, rules) = match condition.ok_or(ConditionError::Missing)? {
        BadgeCondition::Rule(rule) => (LogicalOperator::And, std::slice::from_ref(rule)),
        BadgeCondition::Composite(composite) => {
            if composite.logical_operator == LogicalOperator::Unrecognized {
                return Err(ConditionError::UnrecognizedLogical);
            }
            if composite.conditions.is_empty() {
                return Err(ConditionError::EmptyComposite);
            }
            (composite.logical_operator, composite.conditions.as_slice())
        }
    };

    for rule in rules {
        if rule.metric == MetricType::Unrecognized {
            return Err(ConditionError::UnrecognizedMetric);
        }
        if rule.operator == ComparisonOperator::Unrecognized {
            return Err(ConditionError::UnrecognizedComparison);
        }
    }

    Ok((logical_operator, rules))
}

fn metric_value(metric: MetricType, stats: &UserStats) -> Option<i64> {
    let value = match metric {
        MetricType::ConsecutiveCorrectAnswers => stats.consecutive_correct,
        MetricType::TotalQuizzesSolved => stats.total_solved,
        MetricType::TotalCorrectAnswers => stats.total_correct,
        MetricType::CorrectAnswerRate => stats.correct_rate,
        // No data source yet; such rules never hold.
        MetricType::TotalScoreEarned | MetricType::AccountAgeDays | MetricType::Unrecognized => {
            debug!("Metric {:?} has no data source", metric);
            return None;
        }
    };
    Some(i64::from(value))
}

fn rule_holds(rule: &ConditionRule, stats: &UserStats) -> bool {
    let Some(user_value) = metric_value(rule.metric, stats) else {
        return false;
    };
    match rule.operator {
        ComparisonOperator::Gte => user_value >= rule.value,
        ComparisonOperator::Lte => user_value <= rule.value,
        ComparisonOperator::Eq => user_value == rule.value,
        ComparisonOperator::Unrecognized => false,
    }
}
