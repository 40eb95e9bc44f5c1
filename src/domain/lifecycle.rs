//! Pure transition logic over a [`Subscription`] record.
//!
//! Nothing here touches storage or the clock: callers pass `now` in, and
//! `apply` returns a new record for the caller to persist with a
//! compare-and-swap. The stored status is only a cache; [`derive_status`]
//! recomputes the real one from the period fields on every use.

use chrono::{DateTime, Duration, Utc};

use crate::application::app_error::{AppError, AppResult};
use crate::domain::entities::subscription::{Subscription, SubscriptionStatus};

/// External and time-driven events that may move a subscription between
/// states. Each admin surface call maps to exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    /// Scanner-driven: advance through whatever time-based transition is due.
    TimePassed,
    /// Billing confirmed a payment; starts a fresh paid period.
    PaymentConfirmed { period: Duration },
    /// Operator renewal, possibly onto a different plan.
    Renew { plan_id: String, period: Duration },
    /// Operator cancellation. Terminal until an explicit renewal.
    Cancel,
    /// Admin unlock ignoring time.
    SetOverride,
    /// Drop the admin unlock and fall back to the time-derived status.
    ClearOverride,
}

impl SubscriptionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SubscriptionEvent::TimePassed => "time_passed",
            SubscriptionEvent::PaymentConfirmed { .. } => "payment_confirmed",
            SubscriptionEvent::Renew { .. } => "renew",
            SubscriptionEvent::Cancel => "cancel",
            SubscriptionEvent::SetOverride => "set_override",
            SubscriptionEvent::ClearOverride => "clear_override",
        }
    }
}

/// Recompute the status a record should have at `now`.
///
/// Pure and idempotent: never mutates, never writes. Boundaries are
/// inclusive - at the exact instant of `period_end` or `grace_end` the
/// window counts as already elapsed, so no record dangles at the boundary.
/// When the grace window has not been committed yet (`grace_end` is None),
/// the configured `grace_window` stands in for it.
pub fn derive_status(
    record: &Subscription,
    now: DateTime<Utc>,
    grace_window: Duration,
) -> SubscriptionStatus {
    if record.override_active {
        return SubscriptionStatus::Overridden;
    }
    if record.cancelled_at.is_some() {
        return SubscriptionStatus::Cancelled;
    }
    if now < record.period_end {
        return if record.trial {
            SubscriptionStatus::Trialing
        } else {
            SubscriptionStatus::Active
        };
    }
    // Past period_end. Trials have no grace window.
    if record.trial {
        return SubscriptionStatus::Expired;
    }
    let grace_end = record
        .grace_end
        .unwrap_or(record.period_end + grace_window);
    if now < grace_end {
        SubscriptionStatus::Grace
    } else {
        SubscriptionStatus::Expired
    }
}

/// Apply one event to a record, returning the successor record.
///
/// The input is never mutated. Every real transition increments `version`
/// and stamps `last_evaluated_at`; a `TimePassed` that changes nothing
/// returns the record unchanged (same version) so the scanner stays
/// idempotent. An event that is not valid for the current derived state is
/// rejected as `InvalidTransition` with the record untouched.
pub fn apply(
    record: &Subscription,
    event: &SubscriptionEvent,
    now: DateTime<Utc>,
    grace_window: Duration,
) -> AppResult<Subscription> {
    let current = derive_status(record, now, grace_window);

    let mut next = record.clone();
    match event {
        SubscriptionEvent::SetOverride => {
            next.override_active = true;
            next.status = SubscriptionStatus::Overridden;
        }
        SubscriptionEvent::ClearOverride => {
            if current != SubscriptionStatus::Overridden {
                return Err(invalid(current, event));
            }
            next.override_active = false;
            // Recompute as if the override never happened.
            next.status = derive_status(&next, now, grace_window);
            if next.status == SubscriptionStatus::Grace && next.grace_end.is_none() {
                next.grace_end = Some(next.period_end + grace_window);
            }
        }
        SubscriptionEvent::TimePassed => {
            if current == record.status {
                return Ok(next);
            }
            next.status = current;
            if current == SubscriptionStatus::Grace && next.grace_end.is_none() {
                next.grace_end = Some(next.period_end + grace_window);
            }
        }
        SubscriptionEvent::PaymentConfirmed { period } => {
            if !matches!(
                current,
                SubscriptionStatus::Trialing | SubscriptionStatus::Grace
            ) {
                return Err(invalid(current, event));
            }
            next.status = SubscriptionStatus::Active;
            next.trial = false;
            next.period_start = now;
            next.period_end = now + *period;
            next.grace_end = None;
        }
        SubscriptionEvent::Renew { plan_id, period } => {
            if current == SubscriptionStatus::Overridden {
                return Err(invalid(current, event));
            }
            // Extend from whichever is later so paid time is never lost when
            // renewing early, and lapsed time is never billed when renewing
            // out of grace/expired/cancelled.
            let base = now.max(record.period_end);
            next.plan_id = plan_id.clone();
            next.status = SubscriptionStatus::Active;
            next.trial = false;
            if !matches!(
                current,
                SubscriptionStatus::Active | SubscriptionStatus::Trialing
            ) {
                next.period_start = now;
            }
            next.period_end = base + *period;
            next.grace_end = None;
            next.cancelled_at = None;
        }
        SubscriptionEvent::Cancel => {
            if matches!(
                current,
                SubscriptionStatus::Cancelled | SubscriptionStatus::Overridden
            ) {
                return Err(invalid(current, event));
            }
            next.status = SubscriptionStatus::Cancelled;
            next.cancelled_at = Some(now);
        }
    }

    next.version = record.version + 1;
    next.last_evaluated_at = now;
    Ok(next)
}

fn invalid(from: SubscriptionStatus, event: &SubscriptionEvent) -> AppError {
    AppError::InvalidTransition {
        from,
        event: event.name(),
    }
}
