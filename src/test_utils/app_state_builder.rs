//! Builds a minimal `AppState` over the in-memory mocks for HTTP-level
//! testing with `axum_test::TestServer`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::{
        catalog::PlanCatalog,
        entitlement::EntitlementUseCases,
        subscription::{LifecyclePolicy, SubscriptionUseCases},
    },
    domain::entities::subscription::Subscription,
    infra::config::AppConfig,
    test_utils::mocks::{InMemorySubscriptionStore, InMemoryUsageReader, StaticTenantDirectory},
};

pub struct TestAppStateBuilder {
    records: Vec<Subscription>,
    users: HashMap<Uuid, Uuid>,
    usage: Vec<(Uuid, String, u64)>,
    grace_days: i64,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            users: HashMap::new(),
            usage: Vec::new(),
            grace_days: 5,
        }
    }

    pub fn with_subscription(mut self, record: Subscription) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_user(mut self, user_id: Uuid, tenant_id: Uuid) -> Self {
        self.users.insert(user_id, tenant_id);
        self
    }

    pub fn with_usage(mut self, tenant_id: Uuid, quota_key: &str, used: u64) -> Self {
        self.usage.push((tenant_id, quota_key.to_string(), used));
        self
    }

    pub fn build(self) -> AppState {
        let store = Arc::new(InMemorySubscriptionStore::with_records(self.records));
        let usage = Arc::new(InMemoryUsageReader::new());
        for (tenant, key, used) in &self.usage {
            usage.set(*tenant, key, *used);
        }
        let catalog = Arc::new(PlanCatalog::builtin());
        let grace = Duration::days(self.grace_days);

        let config = AppConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            cors_origin: "http://localhost:3000".parse().unwrap(),
            database_url: "postgres://unused".to_string(),
            plan_catalog_path: None,
            grace_period_days: self.grace_days,
            scan_interval_secs: 3_600,
            scan_lookahead_days: 7,
            expiry_warning_days: vec![3, 7],
            scan_page_size: 200,
            cas_max_retries: 3,
            notify_webhook_url: None,
        };

        AppState {
            config: Arc::new(config),
            catalog: catalog.clone(),
            subscription_use_cases: Arc::new(SubscriptionUseCases::new(
                store.clone(),
                catalog.clone(),
                LifecyclePolicy {
                    grace_window: grace,
                    cas_max_retries: 3,
                },
            )),
            entitlement_use_cases: Arc::new(EntitlementUseCases::new(
                store,
                catalog,
                usage,
                grace,
            )),
            tenant_directory: Arc::new(StaticTenantDirectory::new(self.users)),
        }
    }
}
