//! Test data factories. Each factory builds a complete, valid object with
//! sensible defaults; use the closure parameter to override fields.

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::entities::subscription::{Subscription, SubscriptionStatus};

/// A fixed, readable timestamp so test arithmetic stays predictable.
pub fn test_datetime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// An active clinic-basic subscription: period started at `test_datetime()`
/// and runs 30 days.
pub fn create_test_subscription(
    tenant_id: Uuid,
    overrides: impl FnOnce(&mut Subscription),
) -> Subscription {
    let t0 = test_datetime();
    let mut sub = Subscription {
        tenant_id,
        plan_id: "clinic-basic".to_string(),
        status: SubscriptionStatus::Active,
        period_start: t0,
        period_end: t0 + Duration::days(30),
        grace_end: None,
        cancelled_at: None,
        trial: false,
        override_active: false,
        last_evaluated_at: t0,
        version: 1,
        created_at: t0,
    };
    overrides(&mut sub);
    sub
}
