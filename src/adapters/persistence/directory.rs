use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    application::app_error::{AppError, AppResult},
    application::ports::tenant_directory::TenantDirectory,
};

#[async_trait]
impl TenantDirectory for PostgresPersistence {
    async fn resolve_tenant(&self, user_id: Uuid) -> AppResult<Option<Uuid>> {
        let row = sqlx::query("SELECT tenant_id FROM tenant_members WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(|r| r.get("tenant_id")))
    }
}
