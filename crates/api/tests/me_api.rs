//! HTTP tests for `/me` and the capability-driven sidebar.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth};
use sqlx::PgPool;

fn section_labels(json: &serde_json::Value) -> Vec<String> {
    json["data"]["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["label"].as_str().unwrap().to_string())
        .collect()
}

fn item_titles(json: &serde_json::Value) -> Vec<String> {
    json["data"]["sections"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|s| s["items"].as_array().unwrap().iter())
        .map(|i| i["title"].as_str().unwrap().to_string())
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_requires_a_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_returns_roles_and_permissions(pool: PgPool) {
    let (id, token) = common::create_user_with_roles(&pool, "Ann", &["Admin"]).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["user"]["id"], id);
    assert_eq!(json["data"]["user"]["roles"], serde_json::json!(["Admin"]));
    assert_eq!(
        json["data"]["capabilities"]["permissions"],
        serde_json::json!(["access-settings", "view-users"])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn plain_user_sees_platform_only(pool: PgPool) {
    let (_, token) = common::create_user_with_roles(&pool, "Free", &["Free"]).await;
    let app = common::build_test_app(pool);

    let json = body_json(get_auth(app, "/api/v1/me/navigation", &token).await).await;
    assert_eq!(section_labels(&json), vec!["Platform"]);
    assert_eq!(item_titles(&json), vec!["Dashboard"]);
    assert_eq!(json["data"]["footer"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_sees_users_but_not_access_control(pool: PgPool) {
    let (_, token) = common::create_user_with_roles(&pool, "Adam", &["Admin"]).await;
    let app = common::build_test_app(pool);

    let json = body_json(get_auth(app, "/api/v1/me/navigation", &token).await).await;
    assert_eq!(section_labels(&json), vec!["Platform", "Administrator"]);
    let titles = item_titles(&json);
    assert!(titles.contains(&"Users".to_string()));
    assert!(titles.contains(&"Settings".to_string()));
    assert!(!titles.contains(&"Access Control".to_string()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn super_admin_sees_access_control(pool: PgPool) {
    let (_, token) = common::create_user_with_roles(&pool, "Sue", &["Super Admin"]).await;
    let app = common::build_test_app(pool);

    let json = body_json(get_auth(app, "/api/v1/me/navigation", &token).await).await;
    assert!(item_titles(&json).contains(&"Access Control".to_string()));
}
