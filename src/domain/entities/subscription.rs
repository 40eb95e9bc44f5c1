use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Lifecycle status of a tenant subscription.
///
/// The value stored on a [`Subscription`] is a cache: the source of truth is
/// always a fresh derivation from the period fields and the current time
/// (see `domain::lifecycle::derive_status`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    AsRefStr,
    Display,
    EnumString,
)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SubscriptionStatus {
    /// Inside the plan's trial window; expires straight to `Expired`.
    Trialing,
    /// Paid period running.
    Active,
    /// Past `period_end`, inside the grace window; degraded access.
    Grace,
    /// Past the grace window (or past a trial). Locked out until renewal.
    Expired,
    /// Explicitly cancelled by an operator. Re-enterable only via renewal.
    Cancelled,
    /// Admin override: unlocked regardless of time, until cleared.
    Overridden,
}

impl SubscriptionStatus {
    /// Whether the tenant currently has any access at all.
    pub fn grants_access(&self) -> bool {
        !matches!(
            self,
            SubscriptionStatus::Expired | SubscriptionStatus::Cancelled
        )
    }

    /// Whether access is degraded (full-service features locked).
    pub fn is_degraded(&self) -> bool {
        matches!(self, SubscriptionStatus::Grace)
    }
}

/// The one current subscription record for a tenant.
///
/// Mutated only through `domain::lifecycle::apply`; every committed change
/// strictly increments `version` (optimistic concurrency). Records are never
/// hard-deleted - cancellation is a terminal status, not row removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub tenant_id: Uuid,
    pub plan_id: String,
    /// Cached status; re-derived before any entitlement decision is trusted.
    pub status: SubscriptionStatus,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    /// Set when the grace window commits; always `> period_end`.
    pub grace_end: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Trial periods skip grace and expire directly.
    pub trial: bool,
    /// Manual admin unlock ignoring time, until explicitly cleared.
    pub override_active: bool,
    pub last_evaluated_at: DateTime<Utc>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Initial record for a tenant at onboarding: `trialing` when the plan has
    /// a trial window, else `active` with a full billing period.
    pub fn onboard(
        tenant_id: Uuid,
        plan: &crate::domain::entities::plan::Plan,
        now: DateTime<Utc>,
    ) -> Self {
        let (status, trial, period) = if plan.has_trial() {
            (SubscriptionStatus::Trialing, true, plan.trial())
        } else {
            (SubscriptionStatus::Active, false, plan.period())
        };
        Self {
            tenant_id,
            plan_id: plan.id.clone(),
            status,
            period_start: now,
            period_end: now + period,
            grace_end: None,
            cancelled_at: None,
            trial,
            override_active: false,
            last_evaluated_at: now,
            version: 1,
            created_at: now,
        }
    }
}
