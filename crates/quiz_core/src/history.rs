//! crates/quiz_core/src/history.rs
//!
//! A user's answer history as the client keeps it: the latest answer per
//! quiz, refreshed incrementally from the answer service.

use crate::domain::{AnswerRecord, QuizId};
use crate::stats::compute_stats;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerHistory {
    by_quiz: BTreeMap<QuizId, AnswerRecord>,
    last_sync: Option<DateTime<Utc>>,
}

impl AnswerHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from a full answer list. Later entries for the same
    /// quiz replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = AnswerRecord>) -> Self {
        let mut history = Self::new();
        history.extend(records);
        history
    }

    /// Folds an incremental batch in and remembers when it was taken.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = AnswerRecord>, sync_timestamp: DateTime<Utc>) {
        self.extend(batch);
        self.last_sync = Some(sync_timestamp);
    }

    /// The timestamp to pass as `since` on the next sync.
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    pub fn get(&self, quiz_id: QuizId) -> Option<&AnswerRecord> {
        self.by_quiz.get(&quiz_id)
    }

    pub fn len(&self) -> usize {
        self.by_quiz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_quiz.is_empty()
    }

    /// Answers in ascending quiz id order.
    pub fn records(&self) -> Vec<AnswerRecord> {
        self.by_quiz.values().cloned().collect()
    }

    /// The streak a new answer to `quiz_id` extends.
    ///
    /// The new answer replaces the quiz's previous one, so that answer is
    /// left out. Stats taken after the new answer lands agree with the
    /// streak used to score it.
    pub fn streak_before(&self, quiz_id: QuizId) -> u32 {
        let others: Vec<AnswerRecord> = self
            .by_quiz
            .values()
            .filter(|record| record.quiz_id != quiz_id)
            .cloned()
            .collect();
        compute_stats(&others, None).consecutive_correct
    }

    fn extend(&mut self, records: impl IntoIterator<Item = AnswerRecord>) {
        for record in records {
            self.by_quiz.insert(record.quiz_id, record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::{answer, base_time};
    use chrono::Duration;

    #[test]
    fn latest_answer_per_quiz_wins() {
        let mut retry = answer(1, 1, true, 5);
        retry.id = 99;
        let history = AnswerHistory::from_records(vec![answer(1, 1, false, 0), answer(2, 1, true, 1), retry]);

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(1).map(|a| a.id), Some(99));
        assert!(history.last_sync().is_none());

        let stats = compute_stats(&history.records(), None);
        assert_eq!(stats.total_solved, 2);
        assert_eq!(stats.total_correct, 2);
    }

    #[test]
    fn merge_overlays_batch_and_tracks_sync() {
        let mut history = AnswerHistory::new();
        assert!(history.is_empty());

        let first_sync = base_time() + Duration::hours(1);
        history.merge(vec![answer(3, 1, true, 0), answer(1, 1, true, 1)], first_sync);
        assert_eq!(history.last_sync(), Some(first_sync));

        let second_sync = base_time() + Duration::hours(2);
        history.merge(vec![answer(1, 1, false, 70)], second_sync);
        assert_eq!(history.last_sync(), Some(second_sync));
        assert_eq!(history.len(), 2);

        let records = history.records();
        assert_eq!(records.iter().map(|a| a.quiz_id).collect::<Vec<_>>(), vec![1, 3]);
        assert!(!records[0].is_correct);
    }

    #[test]
    fn streak_before_ignores_the_quiz_being_replaced() {
        // Quiz 1 answered correctly twice, quiz 2 once in between.
        let history = AnswerHistory::from_records(vec![
            answer(1, 1, true, 0),
            answer(2, 1, true, 1),
            answer(1, 1, true, 2),
        ]);
        assert_eq!(compute_stats(&history.records(), None).consecutive_correct, 2);

        // Re-answering quiz 1 only extends the streak from quiz 2.
        assert_eq!(history.streak_before(1), 1);
        // A fresh quiz extends everything kept.
        assert_eq!(history.streak_before(3), 2);

        let broken = AnswerHistory::from_records(vec![answer(1, 1, true, 0), answer(2, 1, false, 1)]);
        assert_eq!(broken.streak_before(2), 1);
        assert_eq!(broken.streak_before(1), 0);
        assert_eq!(AnswerHistory::new().streak_before(1), 0);
    }
}
