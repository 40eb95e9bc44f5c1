use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A feature unlocked by a plan. Features marked `full_service_only` stay
/// locked while the subscription is in its grace period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFeature {
    pub flag: String,
    #[serde(default)]
    pub full_service_only: bool,
}

impl PlanFeature {
    pub fn new(flag: &str) -> Self {
        Self {
            flag: flag.to_string(),
            full_service_only: false,
        }
    }

    pub fn full_service(flag: &str) -> Self {
        Self {
            flag: flag.to_string(),
            full_service_only: true,
        }
    }
}

/// A subscription plan. Immutable once referenced by a subscription - a plan
/// change ships as a new plan id, never an in-place edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Ordered list of entitled features.
    pub features: Vec<PlanFeature>,
    /// Numeric limits keyed by quota name, e.g. "max_active_users".
    #[serde(default)]
    pub quotas: HashMap<String, u64>,
    /// Billing period length in days.
    pub period_days: i64,
    /// Trial length in days; zero means subscriptions start `active`.
    #[serde(default)]
    pub trial_days: i64,
}

impl Plan {
    pub fn has_trial(&self) -> bool {
        self.trial_days > 0
    }

    pub fn feature(&self, flag: &str) -> Option<&PlanFeature> {
        self.features.iter().find(|f| f.flag == flag)
    }

    pub fn quota(&self, key: &str) -> Option<u64> {
        self.quotas.get(key).copied()
    }

    pub fn period(&self) -> chrono::Duration {
        chrono::Duration::days(self.period_days)
    }

    pub fn trial(&self) -> chrono::Duration {
        chrono::Duration::days(self.trial_days)
    }
}
