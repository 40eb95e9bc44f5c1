use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::adapters::http::app_state::AppState;

pub mod admin;
pub mod subscription;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .nest("/subscription", subscription::router())
        .nest("/admin/subscription", admin::router())
}

async fn list_plans(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.catalog.list_plans().to_vec())
}
