//! Administrative surface. Each endpoint maps to exactly one lifecycle
//! event; an event that is not valid for the current state comes back as
//! 409 INVALID_TRANSITION, never silently coerced.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post, put},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{adapters::http::app_state::AppState, application::app_error::AppResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{tenant_id}", post(create_subscription))
        .route("/{tenant_id}/renew", post(renew))
        .route("/{tenant_id}/cancel", post(cancel))
        .route("/{tenant_id}/payment-confirmed", post(payment_confirmed))
        .route("/{tenant_id}/override", put(set_override))
        .route("/{tenant_id}/override", delete(clear_override))
}

#[derive(Deserialize)]
struct PlanRequest {
    plan_id: String,
}

#[derive(Deserialize)]
struct RenewRequest {
    plan_id: String,
    /// Override for the plan's billing period length, in days.
    #[serde(default)]
    period_days: Option<i64>,
}

async fn create_subscription(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(req): Json<PlanRequest>,
) -> AppResult<impl IntoResponse> {
    let sub = app_state
        .subscription_use_cases
        .create_for_tenant(tenant_id, &req.plan_id)
        .await?;
    Ok((StatusCode::CREATED, Json(sub)))
}

async fn renew(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(req): Json<RenewRequest>,
) -> AppResult<impl IntoResponse> {
    let sub = app_state
        .subscription_use_cases
        .renew(tenant_id, &req.plan_id, req.period_days)
        .await?;
    Ok(Json(sub))
}

async fn cancel(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let sub = app_state.subscription_use_cases.cancel(tenant_id).await?;
    Ok(Json(sub))
}

async fn payment_confirmed(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let sub = app_state
        .subscription_use_cases
        .confirm_payment(tenant_id)
        .await?;
    Ok(Json(sub))
}

async fn set_override(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let sub = app_state
        .subscription_use_cases
        .set_override(tenant_id)
        .await?;
    Ok(Json(sub))
}

async fn clear_override(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let sub = app_state
        .subscription_use_cases
        .clear_override(tenant_id)
        .await?;
    Ok(Json(sub))
}
