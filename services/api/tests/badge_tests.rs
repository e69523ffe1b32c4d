mod common;

use api_lib::web::rest::ApiDoc;
use axum::http::StatusCode;
use serde_json::json;
use utoipa::OpenApi;
use uuid::Uuid;

async fn answer(app: &axum::Router, user_id: Uuid, quiz_id: i64, category_id: i64, text: &str) -> serde_json::Value {
    let (status, body) = common::post_json(
        app,
        "/answers/submit",
        json!({
            "userId": user_id,
            "quizId": quiz_id,
            "categoryId": category_id,
            "userAnswer": text,
            "timeTaken": 12
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

fn awarded_ids(body: &serde_json::Value) -> Vec<i64> {
    body["awarded"]
        .as_array()
        .unwrap()
        .iter()
        .map(|badge| badge["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_badges_awarded_once() {
    let app = common::create_test_app();
    let user_id = Uuid::new_v4();

    let (status, body) = common::post_json(&app, &format!("/users/{}/badges/evaluate", user_id), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(awarded_ids(&body).is_empty());

    answer(&app, user_id, 101, 2, "Au").await;
    answer(&app, user_id, 102, 2, "water").await;
    answer(&app, user_id, 103, 3, "Mitochondria").await;

    let uri = format!("/users/{}/badges/evaluate", user_id);
    let (status, body) = common::post_json(&app, &uri, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(awarded_ids(&body), vec![1, 2, 3]);
    assert!(body["skipped"].as_array().unwrap().is_empty());

    let (_, body) = common::post_json(&app, &uri, json!({})).await;
    assert!(awarded_ids(&body).is_empty());

    let (status, body) = common::get(&app, &format!("/users/{}/badges", user_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["badgeIds"], json!([1, 2, 3]));
}

#[tokio::test]
async fn test_streak_bonus_and_streak_badge_agree_on_retries() {
    let app = common::create_test_app();
    let user_id = Uuid::new_v4();
    let evaluate = format!("/users/{}/badges/evaluate", user_id);
    let stats = format!("/users/{}/stats", user_id);

    // Retrying quiz 101 replaces the first answer, so the streak stays at 2.
    let mut bonuses = Vec::new();
    for (quiz_id, text) in [(101, "Au"), (102, "Water"), (101, "au")] {
        bonuses.push(answer(&app, user_id, quiz_id, 2, text).await["answer"]["bonusPoint"].clone());
    }
    assert_eq!(bonuses, vec![json!(0), json!(1), json!(1)]);

    let (_, body) = common::get(&app, &stats).await;
    assert_eq!(body["stats"]["consecutiveCorrect"], 2);
    let (_, body) = common::post_json(&app, &evaluate, json!({})).await;
    assert_eq!(awarded_ids(&body), vec![1, 3]);

    // A third distinct quiz pays the top streak bonus and earns the badge.
    let third = answer(&app, user_id, 103, 3, "Mitochondria").await;
    assert_eq!(third["answer"]["bonusPoint"], 2);

    let (_, body) = common::get(&app, &stats).await;
    assert_eq!(body["stats"]["consecutiveCorrect"], 3);
    let (_, body) = common::post_json(&app, &evaluate, json!({})).await;
    assert_eq!(awarded_ids(&body), vec![2]);
}

#[tokio::test]
async fn test_category_badge_needs_accuracy_across_subcategories() {
    let app = common::create_test_app();
    let user_id = Uuid::new_v4();

    answer(&app, user_id, 101, 2, "Au").await;
    answer(&app, user_id, 103, 3, "Mitochondria").await;
    answer(&app, user_id, 102, 2, "ice").await;

    let (_, body) = common::post_json(&app, &format!("/users/{}/badges/evaluate", user_id), json!({})).await;
    assert_eq!(awarded_ids(&body), vec![1]);
}

#[tokio::test]
async fn test_malformed_badge_is_skipped_and_reported() {
    let seed = r#"{
        "quizzes": [
            {"id": 1, "categoryId": 1, "question": "2+2?", "correctAnswer": "4", "difficulty": "D"}
        ],
        "badges": [
            {"id": 1, "name": "Mystery", "grade": "GOLD",
             "condition": {"type": "DAILY_LOGINS", "operator": "GTE", "value": 1}},
            {"id": 2, "name": "Either Way", "grade": "BRONZE",
             "condition": {"logicalOperator": "OR", "conditions": [
                {"type": "TOTAL_QUIZZES_SOLVED", "operator": "GTE", "value": 1},
                {"type": "TOTAL_SCORE_EARNED", "operator": "GTE", "value": 1000}
             ]}},
            {"id": 3, "name": "Blank", "grade": "SILVER"}
        ]
    }"#;
    let app = common::create_test_app_with_seed(seed);
    let user_id = Uuid::new_v4();
    answer(&app, user_id, 1, 1, "4").await;

    let (status, body) = common::post_json(&app, &format!("/users/{}/badges/evaluate", user_id), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(awarded_ids(&body), vec![2]);

    let skipped: Vec<i64> = body["skipped"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["badgeId"].as_i64().unwrap())
        .collect();
    assert_eq!(skipped, vec![1, 3]);
}

#[tokio::test]
async fn test_badge_catalog_lists_seeded_badges() {
    let app = common::create_test_app();
    let (status, body) = common::get(&app, "/badges").await;
    assert_eq!(status, StatusCode::OK);
    let badges = body["badges"].as_array().unwrap();
    assert_eq!(badges.len(), 4);
    assert_eq!(badges[2]["condition"]["logicalOperator"], "AND");
    assert_eq!(badges[3]["grade"], "PLATINUM");
}

#[test]
fn test_openapi_lists_every_route() {
    let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
    for path in [
        "/answers/submit",
        "/answers/user/{user_id}",
        "/users/{user_id}/stats",
        "/users/{user_id}/badges",
        "/users/{user_id}/badges/evaluate",
        "/badges",
        "/scoring/points",
    ] {
        assert!(doc["paths"].get(path).is_some(), "missing {}", path);
    }
}
