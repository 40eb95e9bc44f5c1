use thiserror::Error;

use crate::domain::entities::subscription::SubscriptionStatus;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Subscription not found")]
    NotFound,

    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    #[error("Tenant already has a subscription")]
    AlreadyExists,

    #[error("Event {event} is not valid in state {from}")]
    InvalidTransition {
        from: SubscriptionStatus,
        event: &'static str,
    },

    #[error("Record version is stale")]
    VersionConflict,

    #[error("Gave up after repeated concurrent writes")]
    Contention,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Notification delivery failed: {0}")]
    NotificationDeliveryFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    NotFound,
    PlanNotFound,
    AlreadyExists,
    InvalidTransition,
    VersionConflict,
    Contention,
    InvalidInput,
    NotificationDeliveryFailed,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::PlanNotFound => "PLAN_NOT_FOUND",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::InvalidTransition => "INVALID_TRANSITION",
            ErrorCode::VersionConflict => "VERSION_CONFLICT",
            ErrorCode::Contention => "CONTENTION",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotificationDeliveryFailed => "NOTIFICATION_DELIVERY_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
