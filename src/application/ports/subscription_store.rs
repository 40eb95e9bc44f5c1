use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::app_error::AppResult;
use crate::domain::entities::subscription::Subscription;

/// Durable per-tenant subscription state.
///
/// Writes are serialized per tenant through optimistic versioning: every
/// mutation goes through [`compare_and_swap`](SubscriptionStore::compare_and_swap)
/// and fails with `VersionConflict` when another writer got there first.
/// Unrelated tenants never contend and no implementation may take a
/// process-wide lock.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn get(&self, tenant_id: Uuid) -> AppResult<Option<Subscription>>;

    /// Create the one record a tenant gets at onboarding.
    /// Fails with `AlreadyExists` when the tenant already has one.
    async fn insert(&self, record: &Subscription) -> AppResult<Subscription>;

    /// Persist `record` only if the stored version still equals
    /// `expected_version`; otherwise fail with `VersionConflict` and leave
    /// the stored record untouched. `record.version` must already be the
    /// incremented successor version.
    async fn compare_and_swap(
        &self,
        expected_version: i64,
        record: &Subscription,
    ) -> AppResult<Subscription>;

    /// One page of records whose next time boundary (period end, or grace
    /// end once committed) falls before `cutoff`. Keyset-paginated on tenant
    /// id so the scanner bounds its memory and can restart anywhere.
    /// Expired, cancelled and overridden records are not candidates.
    async fn list_expiring_before(
        &self,
        cutoff: DateTime<Utc>,
        after_tenant: Option<Uuid>,
        page_size: i64,
    ) -> AppResult<Vec<Subscription>>;
}
