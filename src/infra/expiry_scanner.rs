//! Periodic sweep that advances subscriptions through time-based transitions
//! and emits expiry alerts.
//!
//! Safe to overlap with itself and with renewal/guard traffic: every write is
//! version-guarded, so a losing sweep just skips that record for the pass and
//! revisits it next cycle. Each per-tenant transition is a single
//! compare-and-swap; stopping a sweep mid-batch leaves committed transitions
//! intact.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::app_error::{AppError, AppResult};
use crate::application::ports::notification_sink::NotificationSink;
use crate::application::ports::subscription_store::SubscriptionStore;
use crate::domain::entities::notification::{NotificationEvent, NotificationTrigger};
use crate::domain::entities::subscription::{Subscription, SubscriptionStatus};
use crate::domain::lifecycle::{self, SubscriptionEvent};

#[derive(Debug, Clone)]
pub struct ScanPolicy {
    pub grace_window: Duration,
    /// How far past `now` to look for upcoming boundaries.
    pub lookahead: Duration,
    /// "Expiring soon" thresholds, in days before `period_end`, ascending.
    pub warning_days: Vec<i64>,
    pub page_size: i64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned: usize,
    pub transitioned: usize,
    pub warned: usize,
    pub conflicts: usize,
}

pub struct ExpiryScanner {
    store: Arc<dyn SubscriptionStore>,
    sink: Arc<dyn NotificationSink>,
    policy: ScanPolicy,
}

pub async fn run_expiry_scan_loop(scanner: Arc<ExpiryScanner>, interval_secs: u64) {
    let mut ticker = interval(StdDuration::from_secs(interval_secs));

    info!("Expiry scanner started (sweeping every {}s)", interval_secs);

    loop {
        ticker.tick().await;
        match scanner.scan_once(Utc::now()).await {
            Ok(summary) => {
                debug!(
                    scanned = summary.scanned,
                    transitioned = summary.transitioned,
                    warned = summary.warned,
                    conflicts = summary.conflicts,
                    "expiry sweep finished"
                );
            }
            Err(e) => {
                error!(error = %e, "expiry sweep failed, will retry next cycle");
            }
        }
    }
}

impl ExpiryScanner {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        sink: Arc<dyn NotificationSink>,
        policy: ScanPolicy,
    ) -> Self {
        Self {
            store,
            sink,
            policy,
        }
    }

    /// One full sweep at `now`. Pages through candidates with a keyset
    /// cursor so memory stays bounded regardless of tenant count.
    pub async fn scan_once(&self, now: DateTime<Utc>) -> AppResult<ScanSummary> {
        let cutoff = now + self.policy.lookahead;
        let mut after: Option<Uuid> = None;
        let mut summary = ScanSummary::default();

        loop {
            let page = self
                .store
                .list_expiring_before(cutoff, after, self.policy.page_size)
                .await?;
            let Some(last) = page.last() else { break };
            after = Some(last.tenant_id);
            let full_page = page.len() as i64 >= self.policy.page_size;

            for record in page {
                self.process_record(&record, now, &mut summary).await;
            }
            if !full_page {
                break;
            }
        }

        Ok(summary)
    }

    async fn process_record(
        &self,
        record: &Subscription,
        now: DateTime<Utc>,
        summary: &mut ScanSummary,
    ) {
        summary.scanned += 1;

        let derived = lifecycle::derive_status(record, now, self.policy.grace_window);
        if derived != record.status {
            self.commit_transition(record, derived, now, summary).await;
            return;
        }

        // Not yet past due: warn when period_end is inside a warning window.
        if matches!(
            derived,
            SubscriptionStatus::Trialing | SubscriptionStatus::Active
        ) {
            let days_left = (record.period_end - now).num_days();
            if days_left >= 0 && self.policy.warning_days.iter().any(|d| days_left < *d) {
                summary.warned += 1;
                self.emit(
                    record.tenant_id,
                    NotificationTrigger::ExpiringSoon { days_left },
                    now,
                )
                .await;
            }
        }
    }

    async fn commit_transition(
        &self,
        record: &Subscription,
        derived: SubscriptionStatus,
        now: DateTime<Utc>,
        summary: &mut ScanSummary,
    ) {
        let next = match lifecycle::apply(record, &SubscriptionEvent::TimePassed, now, self.policy.grace_window)
        {
            Ok(next) => next,
            Err(e) => {
                warn!(tenant_id = %record.tenant_id, error = %e, "time transition rejected");
                return;
            }
        };
        if next.version == record.version {
            return;
        }

        match self.store.compare_and_swap(record.version, &next).await {
            Ok(_) => {
                summary.transitioned += 1;
                let trigger = match derived {
                    SubscriptionStatus::Grace => Some(NotificationTrigger::GracePeriodStarted),
                    SubscriptionStatus::Expired => Some(NotificationTrigger::Expired),
                    _ => None,
                };
                if let Some(trigger) = trigger {
                    self.emit(record.tenant_id, trigger, now).await;
                }
            }
            Err(AppError::VersionConflict) => {
                // Another writer got there first; the record is revisited
                // next cycle.
                summary.conflicts += 1;
                debug!(tenant_id = %record.tenant_id, "lost the write race, skipping");
            }
            Err(e) => {
                warn!(tenant_id = %record.tenant_id, error = %e, "failed to persist transition");
            }
        }
    }

    async fn emit(&self, tenant_id: Uuid, trigger: NotificationTrigger, now: DateTime<Utc>) {
        let event = NotificationEvent::new(tenant_id, trigger, now);
        if let Err(e) = self.sink.deliver(&event).await {
            warn!(
                %tenant_id,
                trigger = ?event.trigger,
                error = %e,
                "notification delivery failed; transition stands"
            );
        }
    }
}
