//! crates/quiz_core/src/scoring.rs
//!
//! Point rules for a single answer. The engine keeps no streak state; callers
//! pass the streak count that already includes the answer being scored.

use crate::domain::{Difficulty, Quiz};

/// Answers at or under this many seconds earn the time bonus.
pub const FAST_ANSWER_SECONDS: u32 = 10;

impl Difficulty {
    pub fn base_points(self) -> u32 {
        match self {
            Self::A => 20,
            Self::B => 15,
            Self::C => 12,
            // Unknown tiers score as the lowest tier.
            Self::D | Self::Unrecognized => 10,
        }
    }
}

/// Base points for a difficulty label. Never fails.
pub fn compute_base_points(difficulty: &str) -> u32 {
    Difficulty::from_label(difficulty).base_points()
}

/// Bonus for a correct answer: +1 for a fast answer, +1 at a streak of
/// exactly two, +2 at three or more.
pub fn compute_bonus_points(is_correct: bool, time_taken_seconds: u32, consecutive_correct: u32) -> u32 {
    if !is_correct {
        return 0;
    }

    let time_bonus = if time_taken_seconds <= FAST_ANSWER_SECONDS { 1 } else { 0 };
    let streak_bonus = match consecutive_correct {
        0 | 1 => 0,
        2 => 1,
        _ => 2,
    };

    time_bonus + streak_bonus
}

/// Outcome of grading one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradedAnswer {
    pub is_correct: bool,
    pub base_points: u32,
    pub bonus_points: u32,
    /// Streak after this answer; zero on a miss.
    pub consecutive_correct: u32,
}

impl GradedAnswer {
    pub fn total_points(&self) -> u32 {
        self.base_points + self.bonus_points
    }
}

/// Compares answers ignoring surrounding whitespace and letter case.
pub fn answers_match(expected: &str, submitted: &str) -> bool {
    normalize_answer(expected) == normalize_answer(submitted)
}

fn normalize_answer(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Grades a submission against its quiz, given the streak before it.
///
/// Base points are only awarded for correct answers.
pub fn grade_answer(quiz: &Quiz, user_answer: &str, time_taken_seconds: u32, prior_streak: u32) -> GradedAnswer {
    let is_correct = answers_match(&quiz.correct_answer, user_answer);
    let consecutive_correct = if is_correct { prior_streak.saturating_add(1) } else { 0 };
    let base_points = if is_correct { compute_base_points(&quiz.difficulty) } else { 0 };

    GradedAnswer {
        is_correct,
        base_points,
        bonus_points: compute_bonus_points(is_correct, time_taken_seconds, consecutive_correct),
        consecutive_correct,
    }
}
