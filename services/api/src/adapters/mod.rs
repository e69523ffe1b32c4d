pub mod db;
pub mod memory;

pub use db::DbAdapter;
pub use memory::{InMemoryStore, SeedData};

use quiz_core::domain::{BadgeCondition, BadgeId, Quiz};
use quiz_core::ports::{AnswerSubmission, PortError, PortResult};
use tracing::warn;

/// Checks shared by every store before a submission is graded.
pub(crate) fn validate_submission(submission: &AnswerSubmission) -> PortResult<()> {
    if submission.user_answer.trim().is_empty() {
        return Err(PortError::InvalidInput("Answer must not be empty".to_string()));
    }
    // Stored as a Postgres INTEGER.
    if i32::try_from(submission.time_taken).is_err() {
        return Err(PortError::InvalidInput(format!(
            "timeTaken {} is out of range",
            submission.time_taken
        )));
    }
    Ok(())
}

/// Answers are filed under their quiz's category.
pub(crate) fn check_category(submission: &AnswerSubmission, quiz: &Quiz) -> PortResult<()> {
    if submission.category_id != quiz.category_id {
        return Err(PortError::InvalidInput(format!(
            "Quiz {} belongs to category {}, not {}",
            quiz.id, quiz.category_id, submission.category_id
        )));
    }
    Ok(())
}

/// Turns a stored condition payload into the typed tree.
///
/// Payloads that do not parse are logged and treated as missing, which the
/// evaluator reports and skips.
pub(crate) fn decode_condition(
    badge_id: BadgeId,
    payload: Option<serde_json::Value>,
) -> Option<BadgeCondition> {
    let payload = payload?;
    match serde_json::from_value::<BadgeCondition>(payload.clone()) {
        Ok(condition) => Some(condition),
        Err(e) => {
            warn!(
                "Badge {} has an unparseable condition ({}): {}",
                badge_id, e, payload
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::domain::{ComparisonOperator, MetricType};
    use serde_json::json;

    fn submission(user_answer: &str, time_taken: u32) -> AnswerSubmission {
        AnswerSubmission {
            user_id: uuid::Uuid::nil(),
            quiz_id: 7,
            category_id: 2,
            user_answer: user_answer.to_string(),
            time_taken,
        }
    }

    #[test]
    fn submissions_are_range_checked() {
        assert!(validate_submission(&submission("Au", 0)).is_ok());
        assert!(validate_submission(&submission("Au", i32::MAX as u32)).is_ok());
        assert!(matches!(
            validate_submission(&submission("Au", 3_000_000_000)),
            Err(PortError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_submission(&submission(" \t", 1)),
            Err(PortError::InvalidInput(_))
        ));
    }

    #[test]
    fn category_must_match_quiz() {
        let quiz = Quiz {
            id: 7,
            category_id: 2,
            question: "Gold?".to_string(),
            correct_answer: "Au".to_string(),
            difficulty: "B".to_string(),
        };
        assert!(check_category(&submission("Au", 1), &quiz).is_ok());

        let mut elsewhere = submission("Au", 1);
        elsewhere.category_id = 5;
        assert!(matches!(check_category(&elsewhere, &quiz), Err(PortError::InvalidInput(_))));
    }

    #[test]
    fn valid_payload_decodes() {
        let condition = decode_condition(
            1,
            Some(json!({"type": "TOTAL_CORRECT_ANSWERS", "operator": "GTE", "value": 10})),
        );
        match condition {
            Some(BadgeCondition::Rule(rule)) => {
                assert_eq!(rule.metric, MetricType::TotalCorrectAnswers);
                assert_eq!(rule.operator, ComparisonOperator::Gte);
                assert_eq!(rule.value, 10);
            }
            other => panic!("expected a rule, got {:?}", other),
        }
    }

    #[test]
    fn broken_or_absent_payload_is_none() {
        assert!(decode_condition(1, None).is_none());
        assert!(decode_condition(1, Some(json!("// legacy comment {}"))).is_none());
        assert!(decode_condition(1, Some(json!({"logicalOperator": "AND"}))).is_none());
    }
}
