//! In-memory mocks and fixtures shared by the unit and HTTP tests.

pub mod app_state_builder;
pub mod factories;
pub mod mocks;

pub use app_state_builder::TestAppStateBuilder;

pub use mocks::{
    AlwaysConflictingStore, ConflictOnceStore, InMemorySubscriptionStore, InMemoryUsageReader,
    RecordingNotificationSink, StaticTenantDirectory,
};
