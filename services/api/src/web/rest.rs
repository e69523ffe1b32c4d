//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for answer, stats and scoring endpoints, and the
//! master definition for the OpenAPI specification.

use crate::progress;
use crate::web::{badges, port_error_response, state::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use quiz_core::domain::{AnswerRecord, CategoryId, QuizId, UserStats};
use quiz_core::ports::AnswerSubmission;
use quiz_core::{compute_base_points, compute_bonus_points};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        submit_answer_handler,
        answers_by_user_handler,
        user_stats_handler,
        score_preview_handler,
        badges::list_badges_handler,
        badges::owned_badges_handler,
        badges::evaluate_badges_handler,
    ),
    components(
        schemas(
            SubmitAnswerRequest,
            SubmitAnswerResponse,
            AnswerBatchResponse,
            UserStatsResponse,
            ScorePreviewResponse,
            badges::BadgeCatalogResponse,
            badges::OwnedBadgesResponse,
            badges::EvaluateBadgesResponse,
            badges::SkippedBadgeResponse,
        )
    ),
    tags(
        (name = "Quiz Scoring API", description = "Answer grading, user stats and badge eligibility.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub user_id: Uuid,
    pub quiz_id: QuizId,
    pub category_id: CategoryId,
    pub user_answer: String,
    /// Whole seconds spent on the question.
    pub time_taken: u32,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    #[schema(value_type = Object)]
    pub answer: AnswerRecord,
    pub correct_answer: String,
    pub points_awarded: u32,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SinceQuery {
    /// Only answers recorded after this instant.
    pub since: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerBatchResponse {
    #[schema(value_type = Vec<Object>)]
    pub answers: Vec<AnswerRecord>,
    pub sync_timestamp: DateTime<Utc>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct StatsQuery {
    /// Restrict to this category and its subcategories.
    pub category_id: Option<CategoryId>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub user_id: Uuid,
    pub category_id: Option<CategoryId>,
    #[schema(value_type = Object)]
    pub stats: UserStats,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ScorePreviewQuery {
    /// Difficulty label; anything outside `A`..`D` scores as `D`.
    pub difficulty: Option<String>,
    #[serde(default = "default_correct")]
    pub correct: bool,
    #[serde(default)]
    pub time_taken: u32,
    /// Consecutive correct answers including this one.
    #[serde(default)]
    pub streak: u32,
}

fn default_correct() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScorePreviewResponse {
    pub base_points: u32,
    pub bonus_points: u32,
    pub total_points: u32,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Grade and record an answer.
#[utoipa::path(
    post,
    path = "/answers/submit",
    request_body = SubmitAnswerRequest,
    responses(
        (status = 201, description = "Answer graded and stored", body = SubmitAnswerResponse),
        (status = 400, description = "Empty answer"),
        (status = 404, description = "Unknown quiz"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn submit_answer_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let submission = AnswerSubmission {
        user_id: request.user_id,
        quiz_id: request.quiz_id,
        category_id: request.category_id,
        user_answer: request.user_answer,
        time_taken: request.time_taken,
    };

    let submitted = app_state
        .answers
        .submit_answer(submission)
        .await
        .map_err(|e| port_error_response("Failed to submit answer", e))?;

    info!(
        "Answer {} for quiz {}: correct={}, base={}, bonus={}",
        submitted.answer.id,
        submitted.answer.quiz_id,
        submitted.answer.is_correct,
        submitted.answer.point,
        submitted.answer.bonus_point
    );

    let response = SubmitAnswerResponse {
        points_awarded: submitted.points_awarded(),
        answer: submitted.answer,
        correct_answer: submitted.correct_answer,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Fetch a user's answers, optionally only those since the last sync.
#[utoipa::path(
    get,
    path = "/answers/user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "The unique ID of the user."),
        SinceQuery
    ),
    responses(
        (status = 200, description = "Answer batch", body = AnswerBatchResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn answers_by_user_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<SinceQuery>,
) -> Result<Json<AnswerBatchResponse>, (StatusCode, String)> {
    let batch = app_state
        .answers
        .get_answers_by_user(user_id, query.since)
        .await
        .map_err(|e| port_error_response("Failed to load answers", e))?;

    Ok(Json(AnswerBatchResponse {
        answers: batch.answers,
        sync_timestamp: batch.sync_timestamp,
    }))
}

/// Stats over the user's latest answer per quiz.
#[utoipa::path(
    get,
    path = "/users/{user_id}/stats",
    params(
        ("user_id" = Uuid, Path, description = "The unique ID of the user."),
        StatsQuery
    ),
    responses(
        (status = 200, description = "Computed stats", body = UserStatsResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn user_stats_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<UserStatsResponse>, (StatusCode, String)> {
    let stats = progress::user_stats(&app_state, user_id, query.category_id)
        .await
        .map_err(|e| port_error_response("Failed to compute stats", e))?;

    Ok(Json(UserStatsResponse {
        user_id,
        category_id: query.category_id,
        stats,
    }))
}

/// Preview the points an answer would earn.
#[utoipa::path(
    get,
    path = "/scoring/points",
    params(ScorePreviewQuery),
    responses(
        (status = 200, description = "Point breakdown", body = ScorePreviewResponse)
    )
)]
pub async fn score_preview_handler(Query(query): Query<ScorePreviewQuery>) -> Json<ScorePreviewResponse> {
    let base_points = if query.correct {
        compute_base_points(query.difficulty.as_deref().unwrap_or_default())
    } else {
        0
    };
    let bonus_points = compute_bonus_points(query.correct, query.time_taken, query.streak);

    Json(ScorePreviewResponse {
        base_points,
        bonus_points,
        total_points: base_points + bonus_points,
    })
}
