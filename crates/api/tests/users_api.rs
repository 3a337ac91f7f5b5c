//! HTTP-level integration tests for the `/admin/users` data table, user CRUD
//! and bulk actions.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;
use warden_api::auth::password::verify_password;
use warden_db::repositories::UserRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A Super Admin (all permissions) plus five plain users: six in total.
async fn seed(pool: &PgPool) -> (i64, String, Vec<i64>) {
    let (admin_id, token) = common::create_user_with_roles(pool, "Alice", &["Super Admin"]).await;
    let mut others = Vec::new();
    for name in ["Bob", "Carol", "Dave", "Eve", "Mallory"] {
        others.push(common::create_plain_user(pool, name).await);
    }
    (admin_id, token, others)
}

fn names(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Data table
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_page_of_six_with_five_per_page(pool: PgPool) {
    let (_, token, _) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/users?per_page=5&page=2", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(names(&json), vec!["Mallory"]);
    assert_eq!(json["meta"]["total"], 6);
    assert_eq!(json["meta"]["from"], 6);
    assert_eq!(json["meta"]["to"], 6);
    assert_eq!(json["meta"]["last_page"], 2);
    assert_eq!(json["meta"]["current_page"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_echoes_filters_and_links_keep_them(pool: PgPool) {
    let (_, token, _) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let uri = "/api/v1/admin/users?search=example&sort_field=name&sort_direction=desc&per_page=2";
    let json = body_json(get_auth(app, uri, &token).await).await;

    assert_eq!(json["filters"]["search"], "example");
    assert_eq!(json["filters"]["sort_field"], "name");
    assert_eq!(json["filters"]["sort_direction"], "desc");
    assert_eq!(names(&json), vec!["Mallory", "Eve"]);
    assert_eq!(json["meta"]["total"], 6);

    let links = json["links"].as_array().unwrap();
    let next = links.last().unwrap()["url"].as_str().unwrap();
    assert!(next.starts_with("/api/v1/admin/users?"));
    assert!(next.contains("search=example"));
    assert!(next.contains("sort_field=name"));
    assert!(next.contains("sort_direction=desc"));
    assert!(next.contains("page=2"));
    assert!(links.first().unwrap()["url"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_sort_field_falls_back_silently(pool: PgPool) {
    let (_, token, _) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let uri = "/api/v1/admin/users?sort_field=password_hash&sort_direction=desc&per_page=1";
    let response = get_auth(app, uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(names(&body_json(response).await), vec!["Alice"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bad_range_bound_is_a_field_error(pool: PgPool) {
    let (_, token, _) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let uri = "/api/v1/admin/users?filters%5Bcreated_at%5D%5Bstart%5D=yesterday\
               &filters%5Bcreated_at%5D%5Bend%5D=2030-01-01";
    let response = get_auth(app, uri, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["field"], "filters.created_at");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_requires_view_users(pool: PgPool) {
    let (_, token) = common::create_user_with_roles(&pool, "Pat", &["Pro"]).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rows_carry_role_names(pool: PgPool) {
    let (_, token, _) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let json = body_json(get_auth(app, "/api/v1/admin/users?search=alice", &token).await).await;
    assert_eq!(json["data"][0]["roles"], json!(["Super Admin"]));
    assert!(json["data"][0].get("password_hash").is_none());
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_lowercases_email_and_rejects_duplicates(pool: PgPool) {
    let (_, token, _) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let body = json!({ "name": "Zed", "email": "Zed@Example.com", "password": "long-enough" });
    let response = post_json_auth(app.clone(), "/api/v1/admin/users", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "zed@example.com");
    assert_eq!(json["data"]["is_active"], true);

    let response = post_json_auth(app, "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["field"], "email");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_validates_fields(pool: PgPool) {
    let (_, token, _) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let body = json!({ "name": "Zed", "email": "not-an-email", "password": "long-enough" });
    let response = post_json_auth(app.clone(), "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "email");

    let body = json!({ "name": "Zed", "email": "zed@example.com", "password": "short" });
    let response = post_json_auth(app, "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "password");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_changes_password_only_when_given(pool: PgPool) {
    let (_, token, others) = seed(&pool).await;
    let bob = others[0];
    let before = UserRepo::find_by_id(&pool, bob).await.unwrap().unwrap();
    let app = common::build_test_app(pool.clone());

    let uri = format!("/api/v1/admin/users/{bob}");
    let body = json!({ "name": "Robert", "email": "bob@example.com", "password": "" });
    let response = put_json_auth(app.clone(), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Robert");
    let after = UserRepo::find_by_id(&pool, bob).await.unwrap().unwrap();
    assert_eq!(after.password_hash, before.password_hash);

    let body = json!({ "name": "Robert", "email": "bob@example.com", "password": "new-password" });
    let response = put_json_auth(app, &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let after = UserRepo::find_by_id(&pool, bob).await.unwrap().unwrap();
    assert!(verify_password("new-password", &after.password_hash).unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_sets_keeps_and_clears_email_verification(pool: PgPool) {
    let (_, token, others) = seed(&pool).await;
    let bob = others[0];
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/admin/users/{bob}");

    let body = json!({
        "name": "Bob",
        "email": "bob@example.com",
        "email_verified_at": "2024-03-01T10:00:00Z",
    });
    let response = put_json_auth(app.clone(), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["email_verified_at"],
        "2024-03-01T10:00:00Z"
    );

    // Key absent: verification survives.
    let body = json!({ "name": "Bobby", "email": "bob@example.com" });
    let response = put_json_auth(app.clone(), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let after = UserRepo::find_by_id(&pool, bob).await.unwrap().unwrap();
    assert!(after.email_verified_at.is_some());

    let body = json!({ "name": "Bobby", "email": "bob@example.com", "email_verified_at": null });
    let response = put_json_auth(app, &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["email_verified_at"].is_null());
    let after = UserRepo::find_by_id(&pool, bob).await.unwrap().unwrap();
    assert_eq!(after.email_verified_at, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_missing_user_is_404(pool: PgPool) {
    let (_, token, _) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/users/999999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cannot_delete_self(pool: PgPool) {
    let (admin_id, token, others) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let response = delete_auth(app.clone(), &format!("/api/v1/admin/users/{admin_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_auth(app, &format!("/api/v1/admin/users/{}", others[0]), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Bulk actions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_delete_never_removes_acting_user(pool: PgPool) {
    let (admin_id, token, others) = seed(&pool).await;
    let app = common::build_test_app(pool.clone());

    let ids = vec![admin_id, others[0], others[1]];
    let response = post_json_auth(app, "/api/v1/admin/users/bulk-delete", json!({ "ids": ids }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["affected"], 2);
    assert_eq!(json["data"]["skipped_self"], true);
    assert_eq!(json["data"]["message"], "Users deleted successfully.");
    assert!(UserRepo::find_by_id(&pool, admin_id).await.unwrap().is_some());
    assert!(UserRepo::find_by_id(&pool, others[0]).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_delete_of_only_self_is_rejected(pool: PgPool) {
    let (admin_id, token, _) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/v1/admin/users/bulk-delete", json!({ "ids": [admin_id] }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "You cannot delete your own account");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_with_unknown_id_is_rejected(pool: PgPool) {
    let (_, token, others) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let body = json!({ "ids": [others[0], 999999] });
    let response = post_json_auth(app, "/api/v1/admin/users/bulk-delete", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "ids");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_action_deactivate_then_activate(pool: PgPool) {
    let (admin_id, token, others) = seed(&pool).await;
    let app = common::build_test_app(pool.clone());

    let body = json!({ "action": "deactivate", "ids": [admin_id, others[0], others[1]] });
    let response = post_json_auth(app.clone(), "/api/v1/admin/users/bulk-action", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["affected"], 2);
    assert!(UserRepo::find_by_id(&pool, admin_id).await.unwrap().unwrap().is_active);
    assert!(!UserRepo::find_by_id(&pool, others[0]).await.unwrap().unwrap().is_active);

    let body = json!({ "action": "activate", "ids": [others[0]] });
    let response = post_json_auth(app, "/api/v1/admin/users/bulk-action", body, &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["affected"], 1);
    assert_eq!(json["data"]["message"], "Users activated successfully.");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_action_rejects_unknown_action(pool: PgPool) {
    let (_, token, others) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let body = json!({ "action": "purge", "ids": [others[0]] });
    let response = post_json_auth(app, "/api/v1/admin/users/bulk-action", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid action.");
    assert_eq!(json["field"], "action");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_delete_requires_delete_users(pool: PgPool) {
    let (_, token) = common::create_user_with_roles(&pool, "Adam", &["Admin"]).await;
    let victim = common::create_plain_user(&pool, "Vic").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/v1/admin/users/bulk-delete", json!({ "ids": [victim] }), &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_user_token_is_refused(pool: PgPool) {
    let (_, token, others) = seed(&pool).await;
    let bob_token = common::token_for(others[0]);
    let app = common::build_test_app(pool);

    let body = json!({ "action": "deactivate", "ids": [others[0]] });
    post_json_auth(app.clone(), "/api/v1/admin/users/bulk-action", body, &token).await;

    let response = get_auth(app, "/api/v1/me", &bob_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
