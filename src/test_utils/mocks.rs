//! In-memory mock implementations of the core's ports.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::app_error::{AppError, AppResult};
use crate::application::ports::notification_sink::NotificationSink;
use crate::application::ports::subscription_store::SubscriptionStore;
use crate::application::ports::tenant_directory::TenantDirectory;
use crate::application::ports::usage_reader::UsageReader;
use crate::domain::entities::notification::NotificationEvent;
use crate::domain::entities::subscription::{Subscription, SubscriptionStatus};

/// In-memory implementation of `SubscriptionStore` with real
/// compare-and-swap semantics.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    records: Mutex<HashMap<Uuid, Subscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with initial records for testing.
    pub fn with_records(records: Vec<Subscription>) -> Self {
        let map = records.into_iter().map(|r| (r.tenant_id, r)).collect();
        Self {
            records: Mutex::new(map),
        }
    }

    /// Direct read for test assertions.
    pub fn get_record(&self, tenant_id: Uuid) -> Option<Subscription> {
        self.records.lock().unwrap().get(&tenant_id).cloned()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn get(&self, tenant_id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self.records.lock().unwrap().get(&tenant_id).cloned())
    }

    async fn insert(&self, record: &Subscription) -> AppResult<Subscription> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.tenant_id) {
            return Err(AppError::AlreadyExists);
        }
        records.insert(record.tenant_id, record.clone());
        Ok(record.clone())
    }

    async fn compare_and_swap(
        &self,
        expected_version: i64,
        record: &Subscription,
    ) -> AppResult<Subscription> {
        let mut records = self.records.lock().unwrap();
        let stored = records
            .get_mut(&record.tenant_id)
            .ok_or(AppError::NotFound)?;
        if stored.version != expected_version {
            return Err(AppError::VersionConflict);
        }
        *stored = record.clone();
        Ok(record.clone())
    }

    async fn list_expiring_before(
        &self,
        cutoff: DateTime<Utc>,
        after_tenant: Option<Uuid>,
        page_size: i64,
    ) -> AppResult<Vec<Subscription>> {
        let records = self.records.lock().unwrap();
        let mut page: Vec<Subscription> = records
            .values()
            .filter(|r| {
                matches!(
                    r.status,
                    SubscriptionStatus::Trialing
                        | SubscriptionStatus::Active
                        | SubscriptionStatus::Grace
                )
            })
            .filter(|r| r.grace_end.unwrap_or(r.period_end) < cutoff)
            .filter(|r| after_tenant.is_none_or(|after| r.tenant_id > after))
            .cloned()
            .collect();
        page.sort_by_key(|r| r.tenant_id);
        page.truncate(page_size as usize);
        Ok(page)
    }
}

/// Store whose first compare-and-swap loses as if another writer had just
/// committed, then behaves like [`InMemorySubscriptionStore`]. Exercises the
/// conflict-then-retry recovery path.
pub struct ConflictOnceStore {
    inner: InMemorySubscriptionStore,
    conflicts_remaining: AtomicUsize,
    conflicts_served: AtomicUsize,
}

impl ConflictOnceStore {
    pub fn new(records: Vec<Subscription>) -> Self {
        Self {
            inner: InMemorySubscriptionStore::with_records(records),
            conflicts_remaining: AtomicUsize::new(1),
            conflicts_served: AtomicUsize::new(0),
        }
    }

    pub fn conflicts_served(&self) -> usize {
        self.conflicts_served.load(Ordering::SeqCst)
    }

    pub fn get_record(&self, tenant_id: Uuid) -> Option<Subscription> {
        self.inner.get_record(tenant_id)
    }
}

#[async_trait]
impl SubscriptionStore for ConflictOnceStore {
    async fn get(&self, tenant_id: Uuid) -> AppResult<Option<Subscription>> {
        self.inner.get(tenant_id).await
    }

    async fn insert(&self, record: &Subscription) -> AppResult<Subscription> {
        self.inner.insert(record).await
    }

    async fn compare_and_swap(
        &self,
        expected_version: i64,
        record: &Subscription,
    ) -> AppResult<Subscription> {
        if self
            .conflicts_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            self.conflicts_served.fetch_add(1, Ordering::SeqCst);
            return Err(AppError::VersionConflict);
        }
        self.inner.compare_and_swap(expected_version, record).await
    }

    async fn list_expiring_before(
        &self,
        cutoff: DateTime<Utc>,
        after_tenant: Option<Uuid>,
        page_size: i64,
    ) -> AppResult<Vec<Subscription>> {
        self.inner
            .list_expiring_before(cutoff, after_tenant, page_size)
            .await
    }
}

/// Store whose compare-and-swap always loses, for retry-exhaustion tests.
pub struct AlwaysConflictingStore {
    record: Subscription,
    cas_attempts: AtomicU32,
}

impl AlwaysConflictingStore {
    pub fn new(record: Subscription) -> Self {
        Self {
            record,
            cas_attempts: AtomicU32::new(0),
        }
    }

    pub fn cas_attempts(&self) -> u32 {
        self.cas_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionStore for AlwaysConflictingStore {
    async fn get(&self, tenant_id: Uuid) -> AppResult<Option<Subscription>> {
        if tenant_id == self.record.tenant_id {
            Ok(Some(self.record.clone()))
        } else {
            Ok(None)
        }
    }

    async fn insert(&self, _record: &Subscription) -> AppResult<Subscription> {
        Err(AppError::AlreadyExists)
    }

    async fn compare_and_swap(
        &self,
        _expected_version: i64,
        _record: &Subscription,
    ) -> AppResult<Subscription> {
        self.cas_attempts.fetch_add(1, Ordering::SeqCst);
        Err(AppError::VersionConflict)
    }

    async fn list_expiring_before(
        &self,
        _cutoff: DateTime<Utc>,
        _after_tenant: Option<Uuid>,
        _page_size: i64,
    ) -> AppResult<Vec<Subscription>> {
        Ok(vec![self.record.clone()])
    }
}

/// Notification sink that records everything it is handed. Can be told to
/// fail deliveries to exercise the log-and-continue path.
#[derive(Default)]
pub struct RecordingNotificationSink {
    events: Mutex<Vec<NotificationEvent>>,
    failures_remaining: AtomicUsize,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn deliver(&self, event: &NotificationEvent) -> AppResult<()> {
        if self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(AppError::NotificationDeliveryFailed(
                "sink unreachable".into(),
            ));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Usage reader backed by a map, settable from tests.
#[derive(Default)]
pub struct InMemoryUsageReader {
    usage: Mutex<HashMap<(Uuid, String), u64>>,
}

impl InMemoryUsageReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, tenant_id: Uuid, quota_key: &str, value: u64) {
        self.usage
            .lock()
            .unwrap()
            .insert((tenant_id, quota_key.to_string()), value);
    }
}

#[async_trait]
impl UsageReader for InMemoryUsageReader {
    async fn current_usage(&self, tenant_id: Uuid, quota_key: &str) -> AppResult<u64> {
        Ok(self
            .usage
            .lock()
            .unwrap()
            .get(&(tenant_id, quota_key.to_string()))
            .copied()
            .unwrap_or(0))
    }
}

/// Static user -> tenant mapping.
#[derive(Default)]
pub struct StaticTenantDirectory {
    mapping: HashMap<Uuid, Uuid>,
}

impl StaticTenantDirectory {
    pub fn new(mapping: HashMap<Uuid, Uuid>) -> Self {
        Self { mapping }
    }
}

#[async_trait]
impl TenantDirectory for StaticTenantDirectory {
    async fn resolve_tenant(&self, user_id: Uuid) -> AppResult<Option<Uuid>> {
        Ok(self.mapping.get(&user_id).copied())
    }
}
