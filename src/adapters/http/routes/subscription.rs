//! Read-only query surface: status for UI display and the two guard checks.
//! Guard outcomes are plain 200 responses - a denial is a decision, not an
//! error.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    application::app_error::{AppError, AppResult},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{tenant_id}/status", get(get_status))
        .route("/{tenant_id}/entitlements/{feature}", get(check_feature))
        .route("/{tenant_id}/quota-check", post(check_quota))
        .route("/me/status", get(get_my_status))
}

async fn get_status(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let view = app_state
        .subscription_use_cases
        .get_status(tenant_id)
        .await?;
    Ok(Json(view))
}

async fn check_feature(
    State(app_state): State<AppState>,
    Path((tenant_id, feature)): Path<(Uuid, String)>,
) -> AppResult<impl IntoResponse> {
    let decision = app_state
        .entitlement_use_cases
        .check_feature(tenant_id, &feature)
        .await?;
    Ok(Json(decision))
}

#[derive(Deserialize)]
struct QuotaCheckRequest {
    quota_key: String,
    #[serde(default)]
    requested_delta: u64,
}

async fn check_quota(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(req): Json<QuotaCheckRequest>,
) -> AppResult<impl IntoResponse> {
    let decision = app_state
        .entitlement_use_cases
        .check_quota(tenant_id, &req.quota_key, req.requested_delta)
        .await?;
    Ok(Json(decision))
}

/// Status for the calling user, resolved through the tenant directory.
async fn get_my_status(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&headers)?;
    let tenant_id = app_state
        .tenant_directory
        .resolve_tenant(user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let view = app_state
        .subscription_use_cases
        .get_status(tenant_id)
        .await?;
    Ok(Json(view))
}

fn current_user(headers: &HeaderMap) -> AppResult<Uuid> {
    let raw = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::InvalidInput("missing x-user-id header".into()))?;
    raw.parse()
        .map_err(|_| AppError::InvalidInput("x-user-id must be a UUID".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::json;

    use crate::test_utils::TestAppStateBuilder;
    use crate::test_utils::factories::create_test_subscription;

    fn build_test_router(app_state: AppState) -> Router<()> {
        router().with_state(app_state)
    }

    #[tokio::test]
    async fn status_reports_derived_grace_state() {
        let tenant = Uuid::new_v4();
        // Period lapsed yesterday; stored status still says active.
        let sub = create_test_subscription(tenant, |s| {
            s.period_start = Utc::now() - Duration::days(31);
            s.period_end = Utc::now() - Duration::days(1);
        });
        let app_state = TestAppStateBuilder::new().with_subscription(sub).build();
        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server.get(&format!("/{tenant}/status")).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "grace");
        assert_eq!(body["plan_id"], "clinic-basic");
    }

    #[tokio::test]
    async fn status_for_unknown_tenant_is_404() {
        let app_state = TestAppStateBuilder::new().build();
        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server.get(&format!("/{}/status", Uuid::new_v4())).await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn feature_check_denies_without_subscription() {
        let app_state = TestAppStateBuilder::new().build();
        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .get(&format!("/{}/entitlements/patients", Uuid::new_v4()))
            .await;
        // A missing record is a denial, not an error.
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["allowed"], false);
        assert_eq!(body["deny_reason"], "no_subscription");
    }

    #[tokio::test]
    async fn quota_check_compares_against_usage() {
        let tenant = Uuid::new_v4();
        let sub = create_test_subscription(tenant, |s| {
            s.period_start = Utc::now() - Duration::days(1);
            s.period_end = Utc::now() + Duration::days(29);
        });
        let app_state = TestAppStateBuilder::new()
            .with_subscription(sub)
            .with_usage(tenant, "max_active_users", 5)
            .build();
        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .post(&format!("/{tenant}/quota-check"))
            .json(&json!({ "quota_key": "max_active_users", "requested_delta": 1 }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["allowed"], false);
        assert_eq!(body["deny_reason"], "quota_exceeded");
    }

    #[tokio::test]
    async fn me_status_resolves_tenant_through_directory() {
        let tenant = Uuid::new_v4();
        let user = Uuid::new_v4();
        let sub = create_test_subscription(tenant, |s| {
            s.period_start = Utc::now() - Duration::days(1);
            s.period_end = Utc::now() + Duration::days(29);
        });
        let app_state = TestAppStateBuilder::new()
            .with_subscription(sub)
            .with_user(user, tenant)
            .build();
        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .get("/me/status")
            .add_header("x-user-id", user.to_string())
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "active");

        let missing = server.get("/me/status").await;
        missing.assert_status_bad_request();
    }
}
