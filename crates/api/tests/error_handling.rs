//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use validator::Validate;
use warden_api::error::AppError;
use warden_core::error::CoreError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound { entity: "User", id: 42 });
    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "User with id 42 not found");
}

#[tokio::test]
async fn field_validation_reports_the_field() {
    let err = AppError::Core(CoreError::field("filters.created_at", "bad bound"));
    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["field"], "filters.created_at");
    assert_eq!(json["error"], "bad bound");
}

#[tokio::test]
async fn plain_validation_has_no_field() {
    let err = AppError::Core(CoreError::Validation("nope".into()));
    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("field").is_none());
}

#[tokio::test]
async fn forbidden_and_unauthorized_statuses() {
    let (status, json) = error_to_response(CoreError::Forbidden("no".into()).into()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");

    let (status, json) = error_to_response(CoreError::Unauthorized("who".into()).into()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());
    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[derive(Validate)]
struct Sample {
    #[validate(email(message = "The email must be a valid email address."))]
    email: String,
}

#[tokio::test]
async fn validator_errors_become_field_errors() {
    let errors = Sample {
        email: "not-an-email".into(),
    }
    .validate()
    .unwrap_err();
    let (status, json) = error_to_response(errors.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["field"], "email");
    assert_eq!(json["error"], "The email must be a valid email address.");
}
