use async_trait::async_trait;
use uuid::Uuid;

use crate::application::app_error::AppResult;

/// Who belongs to which clinic. The core trusts this mapping and does not
/// implement authentication itself.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn resolve_tenant(&self, user_id: Uuid) -> AppResult<Option<Uuid>>;
}
