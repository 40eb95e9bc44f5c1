pub mod notification_sink;
pub mod subscription_store;
pub mod tenant_directory;
pub mod usage_reader;
