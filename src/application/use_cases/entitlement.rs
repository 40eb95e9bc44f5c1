use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::application::app_error::AppResult;
use crate::application::ports::subscription_store::SubscriptionStore;
use crate::application::ports::usage_reader::UsageReader;
use crate::application::use_cases::catalog::PlanCatalog;
use crate::domain::entities::entitlement::{
    DenyReason, EntitlementDecision, EntitlementSubject,
};
use crate::domain::entities::subscription::{Subscription, SubscriptionStatus};
use crate::domain::lifecycle;

/// Synchronous access check invoked by every protected operation.
///
/// The read path never writes and never takes a cross-tenant lock: it reads
/// the record, re-derives the status (cheap pure computation, done on every
/// call), and decides. All mutation stays with the scanner and the admin
/// workflows. A missing record is a denial, never an error - deny-by-default
/// is the safe posture for access control.
#[derive(Clone)]
pub struct EntitlementUseCases {
    store: Arc<dyn SubscriptionStore>,
    catalog: Arc<PlanCatalog>,
    usage: Arc<dyn UsageReader>,
    grace_window: Duration,
}

impl EntitlementUseCases {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        catalog: Arc<PlanCatalog>,
        usage: Arc<dyn UsageReader>,
        grace_window: Duration,
    ) -> Self {
        Self {
            store,
            catalog,
            usage,
            grace_window,
        }
    }

    #[instrument(skip(self))]
    pub async fn check_feature(
        &self,
        tenant_id: Uuid,
        feature_flag: &str,
    ) -> AppResult<EntitlementDecision> {
        self.check_feature_at(tenant_id, feature_flag, Utc::now())
            .await
    }

    pub async fn check_feature_at(
        &self,
        tenant_id: Uuid,
        feature_flag: &str,
        now: DateTime<Utc>,
    ) -> AppResult<EntitlementDecision> {
        let subject = EntitlementSubject::Feature {
            flag: feature_flag.to_string(),
        };

        let Some(record) = self.store.get(tenant_id).await? else {
            return Ok(deny(tenant_id, subject, DenyReason::NoSubscription));
        };
        let status = lifecycle::derive_status(&record, now, self.grace_window);
        if let Some(reason) = status_denial(status) {
            return Ok(deny(tenant_id, subject, reason));
        }

        let Some(feature) = self.plan_feature(&record, feature_flag)? else {
            return Ok(deny(tenant_id, subject, DenyReason::NotInPlan));
        };
        if feature.full_service_only && status.is_degraded() {
            return Ok(deny(tenant_id, subject, DenyReason::FullServiceOnly));
        }

        Ok(EntitlementDecision::allow(tenant_id, subject))
    }

    #[instrument(skip(self))]
    pub async fn check_quota(
        &self,
        tenant_id: Uuid,
        quota_key: &str,
        requested_delta: u64,
    ) -> AppResult<EntitlementDecision> {
        self.check_quota_at(tenant_id, quota_key, requested_delta, Utc::now())
            .await
    }

    pub async fn check_quota_at(
        &self,
        tenant_id: Uuid,
        quota_key: &str,
        requested_delta: u64,
        now: DateTime<Utc>,
    ) -> AppResult<EntitlementDecision> {
        let subject = EntitlementSubject::Quota {
            key: quota_key.to_string(),
            requested_delta,
        };

        let Some(record) = self.store.get(tenant_id).await? else {
            return Ok(deny(tenant_id, subject, DenyReason::NoSubscription));
        };
        let status = lifecycle::derive_status(&record, now, self.grace_window);
        if let Some(reason) = status_denial(status) {
            return Ok(deny(tenant_id, subject, reason));
        }

        let plan = self.catalog.get_plan(&record.plan_id)?;
        let Some(limit) = plan.quota(quota_key) else {
            return Ok(deny(tenant_id, subject, DenyReason::NotInPlan));
        };
        let used = self.usage.current_usage(tenant_id, quota_key).await?;
        if used.saturating_add(requested_delta) > limit {
            return Ok(deny(tenant_id, subject, DenyReason::QuotaExceeded));
        }

        Ok(EntitlementDecision::allow(tenant_id, subject))
    }

    fn plan_feature(
        &self,
        record: &Subscription,
        flag: &str,
    ) -> AppResult<Option<crate::domain::entities::plan::PlanFeature>> {
        let plan = self.catalog.get_plan(&record.plan_id)?;
        Ok(plan.feature(flag).cloned())
    }
}

fn status_denial(status: SubscriptionStatus) -> Option<DenyReason> {
    match status {
        SubscriptionStatus::Expired => Some(DenyReason::SubscriptionExpired),
        SubscriptionStatus::Cancelled => Some(DenyReason::SubscriptionCancelled),
        _ => None,
    }
}

fn deny(tenant_id: Uuid, subject: EntitlementSubject, reason: DenyReason) -> EntitlementDecision {
    let decision = EntitlementDecision::deny(tenant_id, subject, reason);
    tracing::debug!(%tenant_id, reason = %reason, "entitlement denied");
    decision
}
