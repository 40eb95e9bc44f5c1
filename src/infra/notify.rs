//! Notification sink adapters. Delivery is fire-and-forget: callers log a
//! failure and keep going, the state transition that produced the event is
//! never rolled back.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::application::app_error::{AppError, AppResult};
use crate::application::ports::notification_sink::NotificationSink;
use crate::domain::entities::notification::NotificationEvent;

const HTTP_TIMEOUT_SECS: u64 = 10;

/// Posts each event as JSON to a configured webhook.
pub struct WebhookNotificationSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotificationSink {
    pub fn new(url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("failed to build reqwest client");
        Self { client, url }
    }
}

#[async_trait]
impl NotificationSink for WebhookNotificationSink {
    async fn deliver(&self, event: &NotificationEvent) -> AppResult<()> {
        let resp = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|e| AppError::NotificationDeliveryFailed(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(AppError::NotificationDeliveryFailed(format!(
                "webhook answered {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

/// Fallback sink used when no webhook is configured: alerts land in the log.
#[derive(Default)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn deliver(&self, event: &NotificationEvent) -> AppResult<()> {
        info!(
            tenant_id = %event.tenant_id,
            trigger = ?event.trigger,
            at = %event.at,
            "subscription alert"
        );
        Ok(())
    }
}
