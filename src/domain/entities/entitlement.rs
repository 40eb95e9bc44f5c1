use serde::Serialize;
use strum::{AsRefStr, Display};
use uuid::Uuid;

/// What a guard check was asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EntitlementSubject {
    Feature { flag: String },
    Quota { key: String, requested_delta: u64 },
}

/// Why a guard check denied access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DenyReason {
    /// No subscription record exists for the tenant at all.
    NoSubscription,
    /// Derived status is `expired`.
    SubscriptionExpired,
    /// Derived status is `cancelled`.
    SubscriptionCancelled,
    /// Feature is full-service only and the tenant is in its grace period.
    FullServiceOnly,
    /// The plan does not include the feature or quota at all.
    NotInPlan,
    /// Granting the requested delta would exceed the plan's limit.
    QuotaExceeded,
}

/// Outcome of a single guard check. Ephemeral - never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitlementDecision {
    pub tenant_id: Uuid,
    pub subject: EntitlementSubject,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny_reason: Option<DenyReason>,
}

impl EntitlementDecision {
    pub fn allow(tenant_id: Uuid, subject: EntitlementSubject) -> Self {
        Self {
            tenant_id,
            subject,
            allowed: true,
            deny_reason: None,
        }
    }

    pub fn deny(tenant_id: Uuid, subject: EntitlementSubject, reason: DenyReason) -> Self {
        Self {
            tenant_id,
            subject,
            allowed: false,
            deny_reason: Some(reason),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }
}
