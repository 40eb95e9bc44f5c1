use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    application::app_error::{AppError, AppResult},
    application::ports::usage_reader::UsageReader,
};

#[async_trait]
impl UsageReader for PostgresPersistence {
    async fn current_usage(&self, tenant_id: Uuid, quota_key: &str) -> AppResult<u64> {
        let row = sqlx::query(
            "SELECT used FROM tenant_usage WHERE tenant_id = $1 AND quota_key = $2",
        )
        .bind(tenant_id)
        .bind(quota_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(row
            .map(|r| r.get::<i64, _>("used").max(0) as u64)
            .unwrap_or(0))
    }
}
