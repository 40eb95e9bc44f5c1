use async_trait::async_trait;

use crate::application::app_error::AppResult;
use crate::domain::entities::notification::NotificationEvent;

/// Outbound alert channel. Delivery is fire-and-forget from the core's
/// perspective: callers log a failed delivery and move on, they never roll
/// back the state transition that produced the event.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, event: &NotificationEvent) -> AppResult<()>;
}
