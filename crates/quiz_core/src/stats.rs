//! crates/quiz_core/src/stats.rs
//!
//! Answer statistics aggregation. A pure function over answers already in
//! memory; callers hand in the snapshot they want measured.

use crate::domain::{AnswerRecord, CategoryScope, UserStats};

/// Computes totals, accuracy and the trailing correct streak.
///
/// With a `scope`, only answers whose category is a member are counted. An
/// empty scope therefore yields zeroed stats, while `None` means every
/// category.
pub fn compute_stats(answers: &[AnswerRecord], scope: Option<&CategoryScope>) -> UserStats {
    let mut in_scope: Vec<&AnswerRecord> = answers
        .iter()
        .filter(|answer| scope.map_or(true, |ids| ids.contains(&answer.category_id)))
        .collect();

    // Stable: equal timestamps keep their input order.
    in_scope.sort_by_key(|answer| answer.created_at);

    let total_solved = in_scope.len() as u32;
    let total_correct = in_scope.iter().filter(|answer| answer.is_correct).count() as u32;
    let consecutive_correct = in_scope
        .iter()
        .rev()
        .take_while(|answer| answer.is_correct)
        .count() as u32;

    UserStats {
        total_solved,
        total_correct,
        correct_rate: percent_rounded(total_correct, total_solved),
        consecutive_correct,
    }
}

fn percent_rounded(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    ((200 * part + whole) / (2 * whole)) as u32
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    pub(crate) fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    pub(crate) fn answer(id: i64, category_id: i64, is_correct: bool, minute: i64) -> AnswerRecord {
        AnswerRecord {
            id,
            user_id: Uuid::nil(),
            quiz_id: id,
            category_id,
            user_answer: "answer".to_string(),
            is_correct,
            point: 0,
            bonus_point: 0,
            time_taken: Some(5),
            created_at: base_time() + Duration::minutes(minute),
        }
    }

    #[test]
    fn empty_history_is_all_zero() {
        assert_eq!(compute_stats(&[], None), UserStats::default());
    }

    #[test]
    fn incorrect_answer_resets_trailing_streak() {
        let answers = vec![
            answer(1, 1, true, 0),
            answer(2, 1, true, 1),
            answer(3, 1, false, 2),
            answer(4, 1, true, 3),
        ];
        let stats = compute_stats(&answers, None);
        assert_eq!(stats.total_solved, 4);
        assert_eq!(stats.total_correct, 3);
        assert_eq!(stats.correct_rate, 75);
        assert_eq!(stats.consecutive_correct, 1);
    }

    #[test]
    fn answers_are_ordered_by_time_not_input_position() {
        // The miss is the most recent answer even though it comes first.
        let answers = vec![
            answer(1, 1, false, 10),
            answer(2, 1, true, 0),
            answer(3, 1, true, 1),
        ];
        assert_eq!(compute_stats(&answers, None).consecutive_correct, 0);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let answers = vec![answer(1, 1, true, 0), answer(2, 1, false, 0)];
        assert_eq!(compute_stats(&answers, None).consecutive_correct, 0);

        let answers = vec![answer(1, 1, false, 0), answer(2, 1, true, 0)];
        assert_eq!(compute_stats(&answers, None).consecutive_correct, 1);
    }

    #[test]
    fn scope_filters_categories() {
        let answers = vec![
            answer(1, 1, true, 0),
            answer(2, 2, false, 1),
            answer(3, 3, true, 2),
        ];
        let scope: CategoryScope = [1, 3].into_iter().collect();
        let stats = compute_stats(&answers, Some(&scope));
        assert_eq!(stats.total_solved, 2);
        assert_eq!(stats.total_correct, 2);
        assert_eq!(stats.correct_rate, 100);
        assert_eq!(stats.consecutive_correct, 2);

        let empty = CategoryScope::new();
        assert_eq!(compute_stats(&answers, Some(&empty)), UserStats::default());
    }

    #[test]
    fn correct_rate_rounds_half_up() {
        // 1 of 8 is 12.5%.
        let mut answers: Vec<_> = (0..8).map(|i| answer(i, 1, false, i)).collect();
        answers[0].is_correct = true;
        assert_eq!(compute_stats(&answers, None).correct_rate, 13);

        // 2 of 3 is 66.67%.
        let answers = vec![answer(1, 1, true, 0), answer(2, 1, true, 1), answer(3, 1, false, 2)];
        assert_eq!(compute_stats(&answers, None).correct_rate, 67);
    }

    #[test]
    fn invariants_hold_and_repeat_calls_agree() {
        let mixed: Vec<_> = (0..25)
            .map(|i| answer(i, i % 3, i % 4 != 0, (i * 7) % 11))
            .collect();
        let all_wrong: Vec<_> = (0..6).map(|i| answer(i, 1, false, i)).collect();
        let all_right: Vec<_> = (0..6).map(|i| answer(i, 2, true, 10 - i)).collect();
        let tied: Vec<_> = (0..5).map(|i| answer(i, 0, i % 2 == 0, 0)).collect();
        let shapes = vec![
            Vec::new(),
            vec![answer(1, 0, true, 0)],
            vec![answer(1, 0, false, 0)],
            mixed,
            all_wrong,
            all_right,
            tied,
        ];
        let scopes = [
            None,
            Some(CategoryScope::from([0])),
            Some(CategoryScope::from([1, 2])),
            Some(CategoryScope::from([42])),
            Some(CategoryScope::new()),
        ];

        for answers in &shapes {
            for scope in &scopes {
                let first = compute_stats(answers, scope.as_ref());
                assert_eq!(first, compute_stats(answers, scope.as_ref()));
                assert!(first.total_correct <= first.total_solved);
                assert!(first.consecutive_correct <= first.total_correct);
                assert!(first.correct_rate <= 100);
                if first.total_solved == 0 {
                    assert_eq!(first, UserStats::default());
                }
            }
        }
    }

    #[test]
    fn edge_shapes() {
        let all_wrong: Vec<_> = (0..6).map(|i| answer(i, 1, false, i)).collect();
        let stats = compute_stats(&all_wrong, None);
        assert_eq!((stats.total_solved, stats.total_correct), (6, 0));
        assert_eq!((stats.correct_rate, stats.consecutive_correct), (0, 0));

        let single = compute_stats(&[answer(1, 4, true, 0)], None);
        assert_eq!(
            single,
            UserStats {
                total_solved: 1,
                total_correct: 1,
                correct_rate: 100,
                consecutive_correct: 1,
            }
        );

        let no_match = CategoryScope::from([99]);
        assert_eq!(compute_stats(&all_wrong, Some(&no_match)), UserStats::default());
    }
}
