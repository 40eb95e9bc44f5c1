use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::application::app_error::{AppError, AppResult};
use crate::application::ports::subscription_store::SubscriptionStore;
use crate::application::use_cases::catalog::PlanCatalog;
use crate::domain::entities::subscription::{Subscription, SubscriptionStatus};
use crate::domain::lifecycle::{self, SubscriptionEvent};

/// Tunables for the lifecycle paths. Grace, trial and retry bounds are
/// configuration, never hardcoded in the domain.
#[derive(Debug, Clone, Copy)]
pub struct LifecyclePolicy {
    pub grace_window: Duration,
    pub cas_max_retries: u32,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            grace_window: Duration::days(5),
            cas_max_retries: 3,
        }
    }
}

/// Read-only status view for UI display.
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub tenant_id: Uuid,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub period_end: DateTime<Utc>,
    pub grace_end: Option<DateTime<Utc>>,
}

/// Admin/operator-facing lifecycle operations. Each maps to exactly one
/// state-machine event, applied through compare-and-swap with bounded retry.
#[derive(Clone)]
pub struct SubscriptionUseCases {
    store: Arc<dyn SubscriptionStore>,
    catalog: Arc<PlanCatalog>,
    policy: LifecyclePolicy,
}

impl SubscriptionUseCases {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        catalog: Arc<PlanCatalog>,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            store,
            catalog,
            policy,
        }
    }

    /// Onboard a tenant onto a plan. `trialing` when the plan has a trial
    /// window, else `active`.
    #[instrument(skip(self))]
    pub async fn create_for_tenant(
        &self,
        tenant_id: Uuid,
        plan_id: &str,
    ) -> AppResult<Subscription> {
        self.create_for_tenant_at(tenant_id, plan_id, Utc::now())
            .await
    }

    pub async fn create_for_tenant_at(
        &self,
        tenant_id: Uuid,
        plan_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Subscription> {
        let plan = self.catalog.get_plan(plan_id)?;
        let record = Subscription::onboard(tenant_id, plan, now);
        self.store.insert(&record).await
    }

    /// Renewal workflow: extend or change the subscription, starting a fresh
    /// paid period from `max(now, old period_end)`. `period_days` overrides
    /// the plan's billing period length when given.
    #[instrument(skip(self))]
    pub async fn renew(
        &self,
        tenant_id: Uuid,
        plan_id: &str,
        period_days: Option<i64>,
    ) -> AppResult<Subscription> {
        self.renew_at(tenant_id, plan_id, period_days, Utc::now())
            .await
    }

    pub async fn renew_at(
        &self,
        tenant_id: Uuid,
        plan_id: &str,
        period_days: Option<i64>,
        now: DateTime<Utc>,
    ) -> AppResult<Subscription> {
        let plan = self.catalog.get_plan(plan_id)?;
        let period = match period_days {
            Some(days) if days <= 0 => {
                return Err(AppError::InvalidInput(
                    "period_days must be positive".into(),
                ));
            }
            Some(days) => Duration::days(days),
            None => plan.period(),
        };
        let event = SubscriptionEvent::Renew {
            plan_id: plan.id.clone(),
            period,
        };
        self.apply_with_retry(tenant_id, &event, now).await
    }

    /// Billing confirmed a payment: trial or grace recovers into a fresh
    /// paid period on the current plan.
    #[instrument(skip(self))]
    pub async fn confirm_payment(&self, tenant_id: Uuid) -> AppResult<Subscription> {
        self.confirm_payment_at(tenant_id, Utc::now()).await
    }

    pub async fn confirm_payment_at(
        &self,
        tenant_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Subscription> {
        let record = self
            .store
            .get(tenant_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let plan = self.catalog.get_plan(&record.plan_id)?;
        let event = SubscriptionEvent::PaymentConfirmed {
            period: plan.period(),
        };
        self.apply_with_retry(tenant_id, &event, now).await
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, tenant_id: Uuid) -> AppResult<Subscription> {
        self.apply_with_retry(tenant_id, &SubscriptionEvent::Cancel, Utc::now())
            .await
    }

    #[instrument(skip(self))]
    pub async fn set_override(&self, tenant_id: Uuid) -> AppResult<Subscription> {
        self.apply_with_retry(tenant_id, &SubscriptionEvent::SetOverride, Utc::now())
            .await
    }

    #[instrument(skip(self))]
    pub async fn clear_override(&self, tenant_id: Uuid) -> AppResult<Subscription> {
        self.apply_with_retry(tenant_id, &SubscriptionEvent::ClearOverride, Utc::now())
            .await
    }

    pub async fn cancel_at(&self, tenant_id: Uuid, now: DateTime<Utc>) -> AppResult<Subscription> {
        self.apply_with_retry(tenant_id, &SubscriptionEvent::Cancel, now)
            .await
    }

    /// Status for UI display, derived fresh from the period fields.
    pub async fn get_status(&self, tenant_id: Uuid) -> AppResult<StatusView> {
        self.get_status_at(tenant_id, Utc::now()).await
    }

    pub async fn get_status_at(
        &self,
        tenant_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<StatusView> {
        let record = self
            .store
            .get(tenant_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let status = lifecycle::derive_status(&record, now, self.policy.grace_window);
        Ok(StatusView {
            tenant_id,
            plan_id: record.plan_id,
            status,
            period_end: record.period_end,
            grace_end: record.grace_end,
        })
    }

    /// Read, apply, compare-and-swap; on a version conflict re-read and
    /// retry up to the configured bound, then surface `Contention`. No lock
    /// is held across the store round trips.
    async fn apply_with_retry(
        &self,
        tenant_id: Uuid,
        event: &SubscriptionEvent,
        now: DateTime<Utc>,
    ) -> AppResult<Subscription> {
        let mut attempts = 0;
        loop {
            let record = self
                .store
                .get(tenant_id)
                .await?
                .ok_or(AppError::NotFound)?;
            let next = lifecycle::apply(&record, event, now, self.policy.grace_window)?;
            if next.version == record.version {
                // Nothing to write (idempotent time event).
                return Ok(record);
            }
            match self.store.compare_and_swap(record.version, &next).await {
                Ok(saved) => return Ok(saved),
                Err(AppError::VersionConflict) => {
                    attempts += 1;
                    if attempts >= self.policy.cas_max_retries {
                        return Err(AppError::Contention);
                    }
                    tracing::debug!(
                        %tenant_id,
                        event = event.name(),
                        attempt = attempts,
                        "version conflict, re-reading"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
