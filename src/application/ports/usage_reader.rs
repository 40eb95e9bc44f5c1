use async_trait::async_trait;
use uuid::Uuid;

use crate::application::app_error::AppResult;

/// Current consumption against a quota (seats in use, records stored, ...).
/// The usage itself lives with the rest of the clinic data; the guard only
/// reads it to compare against the plan limit.
#[async_trait]
pub trait UsageReader: Send + Sync {
    async fn current_usage(&self, tenant_id: Uuid, quota_key: &str) -> AppResult<u64>;
}
