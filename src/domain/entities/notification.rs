use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// What prompted an outbound alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "trigger")]
pub enum NotificationTrigger {
    /// Still active/trialing but `period_end` is inside a warning window.
    ExpiringSoon { days_left: i64 },
    /// The subscription just moved `active` -> `grace`.
    GracePeriodStarted,
    /// The subscription just moved to `expired` (hard lock-out).
    Expired,
}

/// Outbound expiry alert. Ephemeral - delivery is fire-and-forget and a
/// failed delivery never rolls back the transition that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationEvent {
    pub tenant_id: Uuid,
    #[serde(flatten)]
    pub trigger: NotificationTrigger,
    pub at: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(tenant_id: Uuid, trigger: NotificationTrigger, at: DateTime<Utc>) -> Self {
        Self {
            tenant_id,
            trigger,
            at,
        }
    }
}
