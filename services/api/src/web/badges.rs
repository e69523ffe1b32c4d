//! services/api/src/web/badges.rs
//!
//! Badge catalog and award endpoints.

use crate::progress;
use crate::web::{port_error_response, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use quiz_core::domain::{Badge, BadgeId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BadgeCatalogResponse {
    #[schema(value_type = Vec<Object>)]
    pub badges: Vec<Badge>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnedBadgesResponse {
    pub user_id: Uuid,
    /// Sorted ascending.
    pub badge_ids: Vec<BadgeId>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkippedBadgeResponse {
    pub badge_id: BadgeId,
    pub reason: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateBadgesResponse {
    #[schema(value_type = Vec<Object>)]
    pub awarded: Vec<Badge>,
    pub skipped: Vec<SkippedBadgeResponse>,
}

/// List the badge catalog.
#[utoipa::path(
    get,
    path = "/badges",
    responses(
        (status = 200, description = "All badges", body = BadgeCatalogResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_badges_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<BadgeCatalogResponse>, (StatusCode, String)> {
    let badges = app_state
        .badges
        .get_all_badges()
        .await
        .map_err(|e| port_error_response("Failed to load badges", e))?;
    Ok(Json(BadgeCatalogResponse { badges }))
}

/// List the badges a user owns.
#[utoipa::path(
    get,
    path = "/users/{user_id}/badges",
    params(
        ("user_id" = Uuid, Path, description = "The unique ID of the user.")
    ),
    responses(
        (status = 200, description = "Owned badge ids", body = OwnedBadgesResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn owned_badges_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<OwnedBadgesResponse>, (StatusCode, String)> {
    let owned = app_state
        .badges
        .get_owned_badges(user_id)
        .await
        .map_err(|e| port_error_response("Failed to load owned badges", e))?;

    let mut badge_ids: Vec<BadgeId> = owned.into_iter().collect();
    badge_ids.sort_unstable();
    Ok(Json(OwnedBadgesResponse { user_id, badge_ids }))
}

/// Evaluate the catalog for a user and award every newly earned badge.
#[utoipa::path(
    post,
    path = "/users/{user_id}/badges/evaluate",
    params(
        ("user_id" = Uuid, Path, description = "The unique ID of the user.")
    ),
    responses(
        (status = 200, description = "Badges awarded in this pass", body = EvaluateBadgesResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn evaluate_badges_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<EvaluateBadgesResponse>, (StatusCode, String)> {
    let outcome = progress::award_new_badges(&app_state, user_id)
        .await
        .map_err(|e| port_error_response("Failed to evaluate badges", e))?;

    let skipped = outcome
        .skipped
        .into_iter()
        .map(|skipped| SkippedBadgeResponse {
            badge_id: skipped.badge_id,
            reason: skipped.error.to_string(),
        })
        .collect();

    Ok(Json(EvaluateBadgesResponse {
        awarded: outcome.awarded,
        skipped,
    }))
}
