//! services/api/src/progress.rs
//!
//! Workflows that combine the ports with the pure scoring core: building a
//! user's stats and turning badge eligibility into awards.

use crate::web::state::AppState;
use quiz_core::domain::{Badge, CategoryId, UserStats};
use quiz_core::ports::PortResult;
use quiz_core::{compute_stats, AnswerHistory, BadgeEvaluator, CategoryTree, SkippedBadge};
use tracing::{info, warn};
use uuid::Uuid;

/// Result of one award pass.
#[derive(Debug, Clone, Default)]
pub struct AwardOutcome {
    pub awarded: Vec<Badge>,
    pub skipped: Vec<SkippedBadge>,
}

/// Loads the user's answer history, keeping the latest answer per quiz.
pub async fn load_history(app_state: &AppState, user_id: Uuid) -> PortResult<AnswerHistory> {
    let batch = app_state.answers.get_answers_by_user(user_id, None).await?;
    let mut history = AnswerHistory::new();
    history.merge(batch.answers, batch.sync_timestamp);
    Ok(history)
}

/// Stats for a user, optionally limited to a category and its subcategories.
pub async fn user_stats(
    app_state: &AppState,
    user_id: Uuid,
    category_id: Option<CategoryId>,
) -> PortResult<UserStats> {
    let history = load_history(app_state, user_id).await?;
    let scope = match category_id {
        Some(id) => Some(app_state.categories.get_descendant_category_ids(id).await?),
        None => None,
    };
    Ok(compute_stats(&history.records(), scope.as_ref()))
}

/// Evaluates the catalog for `user_id` and awards every newly eligible badge.
///
/// Passes are serialized so one eligibility event awards each badge once.
pub async fn award_new_badges(app_state: &AppState, user_id: Uuid) -> PortResult<AwardOutcome> {
    let _guard = app_state.award_lock.lock().await;

    let history = load_history(app_state, user_id).await?;
    let categories = app_state.categories.get_all_categories().await?;
    let catalog = app_state.badges.get_all_badges().await?;
    let owned = app_state.badges.get_owned_badges(user_id).await?;

    let records = history.records();
    let report = BadgeEvaluator::with_hierarchy(CategoryTree::new(&categories))
        .evaluate(&catalog, &owned, |scope| compute_stats(&records, scope));

    if !report.skipped.is_empty() {
        warn!(
            "Skipped {} badge(s) with malformed conditions for user {}",
            report.skipped.len(),
            user_id
        );
    }

    for badge in &report.eligible {
        app_state.badges.award_badge(user_id, badge.id).await?;
        info!("Awarded badge {} ({}) to user {}", badge.id, badge.name, user_id);
    }

    Ok(AwardOutcome {
        awarded: report.eligible,
        skipped: report.skipped,
    })
}
